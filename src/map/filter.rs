use crate::data::{PlaceRecord, Status};

/// The page-level filter, passed into the composition root as explicit state
/// instead of being broadcast through the page.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FilterState {
  /// Empty means no focus-area restriction.
  pub selected_areas: Vec<String>,
  pub include_inactive: bool,
}

/// Called with the new state whenever the dropdown changes the filter.
pub type FilterChanged = Box<dyn Fn(&FilterState)>;

impl FilterState {
  #[must_use]
  pub fn matches(&self, place: &PlaceRecord) -> bool {
    if place.status != Status::Active && !self.include_inactive {
      return false;
    }
    self.selected_areas.is_empty()
      || place
        .focus_areas
        .iter()
        .any(|area| self.selected_areas.contains(area))
  }

  pub fn toggle_area(&mut self, area: &str) {
    if let Some(pos) = self.selected_areas.iter().position(|a| a == area) {
      self.selected_areas.remove(pos);
    } else {
      self.selected_areas.push(area.to_string());
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn place(status: Status, areas: &[&str]) -> PlaceRecord {
    PlaceRecord {
      id: 1,
      name: "P".to_string(),
      lat: 40.,
      lon: -74.,
      city: String::new(),
      state: String::new(),
      start_year: None,
      end_year: None,
      focus_areas: areas.iter().map(ToString::to_string).collect(),
      status,
      approved: true,
      description: String::new(),
      highlight: String::new(),
      preview_description: String::new(),
    }
  }

  #[test]
  fn empty_filter_keeps_active_places() {
    let filter = FilterState::default();
    assert!(filter.matches(&place(Status::Active, &["Housing"])));
    assert!(!filter.matches(&place(Status::Completed, &["Housing"])));
  }

  #[test]
  fn include_inactive_widens_the_status_gate() {
    let filter = FilterState {
      include_inactive: true,
      ..FilterState::default()
    };
    assert!(filter.matches(&place(Status::Completed, &["Housing"])));
  }

  #[test]
  fn selected_areas_require_an_overlap() {
    let mut filter = FilterState::default();
    filter.toggle_area("Music");
    assert!(filter.matches(&place(Status::Active, &["Music", "Housing"])));
    assert!(!filter.matches(&place(Status::Active, &["Housing"])));
    filter.toggle_area("Music");
    assert!(filter.matches(&place(Status::Active, &["Housing"])));
  }
}
