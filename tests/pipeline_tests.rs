use assert_approx_eq::assert_approx_eq;
use placemap::data::places::parse_places;
use placemap::map::coordinates::{ScreenPosition, ViewMapping};
use placemap::map::filter::FilterState;
use placemap::map::markers::{MARKER_HOVER_RADIUS, group_places};
use placemap::map::projection::AlbersUsa;
use placemap::map::selection::{POPUP_GAP, POPUP_WIDTH, SelectionState, popup_position};
use placemap::map::viewport::ViewTransform;

const CSV: &str = "\
ID,Project Name,Latitude,Longitude,City,State,Start Year,End Year,Focus Areas,Status,Approved,Description,Highlight,Preview Description
1,Harbor Works,40.71280001,-74.00600002,New York,NY,2019,,\"Housing, Music\",Active,TRUE,Waterfront housing.,,Harbor preview.
2,Pier Stages,40.712801,-74.006002,New York,NY,2020,,Music,Active,TRUE,Music on the pier.,,Pier preview.
3,Eastside Commons,34.0522,-118.2437,Los Angeles,CA,2018,,Public Space,Active,TRUE,A shared yard.,,Commons preview.
4,Closed Kitchen,34.0522,-118.2437,Los Angeles,CA,2015,2019,Retail,Completed,TRUE,,,
5,Unapproved Plan,41.0,-74.0,Newark,NJ,2021,,Housing,Active,FALSE,,,
6,Floating Idea,0,0,,,,,Retail,Active,TRUE,,,
7,Overseas Office,51.5074,-0.1278,London,,2022,,Retail,Active,TRUE,,,
";

fn reference_view() -> ViewMapping {
  ViewMapping::new(
    egui::Rect::from_min_size(egui::pos2(0., 0.), egui::vec2(975., 610.)),
    ViewTransform::default(),
  )
}

#[test]
fn csv_to_marker_pipeline() {
  let places = parse_places(CSV.as_bytes()).expect("parse");
  // The loader gate already dropped the unapproved record.
  assert_eq!(places.len(), 6);

  let filter = FilterState::default();
  let groups = group_places(
    places
      .iter()
      .enumerate()
      .filter(|(_, place)| filter.matches(place)),
    &AlbersUsa::default(),
  );

  // NYC collapses to one group of two, LA keeps its active project, the
  // sentinel and the unprojectable record never become markers.
  assert_eq!(groups.len(), 2);
  assert_eq!(groups[0].members.len(), 2);
  assert_eq!(groups[1].members.len(), 1);
  assert_eq!(places[groups[1].members[0]].name, "Eastside Commons");
}

#[test]
fn focus_area_filter_narrows_the_markers() {
  let places = parse_places(CSV.as_bytes()).expect("parse");
  let mut filter = FilterState::default();
  filter.toggle_area("Public Space");

  let groups = group_places(
    places
      .iter()
      .enumerate()
      .filter(|(_, place)| filter.matches(place)),
    &AlbersUsa::default(),
  );
  assert_eq!(groups.len(), 1);
  assert_eq!(places[groups[0].members[0]].name, "Eastside Commons");
}

#[test]
fn include_inactive_brings_back_completed_projects() {
  let places = parse_places(CSV.as_bytes()).expect("parse");
  let filter = FilterState {
    include_inactive: true,
    ..FilterState::default()
  };

  let groups = group_places(
    places
      .iter()
      .enumerate()
      .filter(|(_, place)| filter.matches(place)),
    &AlbersUsa::default(),
  );
  // The completed LA project shares the active project's marker.
  assert_eq!(groups.len(), 2);
  assert_eq!(groups[1].members.len(), 2);
}

#[test]
fn popup_flips_sides_depending_on_the_marker_position() {
  let places = parse_places(CSV.as_bytes()).expect("parse");
  let filter = FilterState::default();
  let groups = group_places(
    places
      .iter()
      .enumerate()
      .filter(|(_, place)| filter.matches(place)),
    &AlbersUsa::default(),
  );
  let view = reference_view();

  // New York projects near the east coast, so the popup flips to the left.
  let nyc = view.to_screen(groups[0].anchor);
  let nyc_popup = popup_position(nyc, 975.);
  assert_approx_eq!(
    nyc_popup.x,
    nyc.x - POPUP_WIDTH - MARKER_HOVER_RADIUS - POPUP_GAP
  );

  // Los Angeles sits far west and keeps the preferred right side.
  let la = view.to_screen(groups[1].anchor);
  let la_popup = popup_position(la, 975.);
  assert_approx_eq!(la_popup.x, la.x + MARKER_HOVER_RADIUS + POPUP_GAP);
}

#[test]
fn selection_flow_from_marker_to_overlay() {
  let places = parse_places(CSV.as_bytes()).expect("parse");
  let filter = FilterState::default();
  let groups = group_places(
    places
      .iter()
      .enumerate()
      .filter(|(_, place)| filter.matches(place)),
    &AlbersUsa::default(),
  );
  let view = reference_view();

  let mut selection = SelectionState::default();
  let anchor = view.to_screen(groups[0].anchor);
  selection.open_details(groups[0].key.clone(), popup_position(anchor, 975.));
  let (key, _) = selection.open_popup().expect("popup open");
  assert_eq!(key, groups[0].key);

  // "View project details" on the first member replaces the popup with the
  // overlay.
  let place = &places[groups[0].members[0]];
  selection.view_details(place.id);
  assert!(selection.open_popup().is_none());
  assert_eq!(selection.open_overlay(), Some(place.id));

  selection.close_overlay();
  assert_eq!(selection, SelectionState::Closed);
}
