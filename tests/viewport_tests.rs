use assert_approx_eq::assert_approx_eq;
use placemap::map::coordinates::{MapPoint, ScreenPosition, ViewMapping};
use placemap::map::viewport::{GestureState, MAX_ZOOM, MIN_ZOOM, Viewport};

fn viewport() -> Viewport {
  let mut v = Viewport::default();
  v.set_container(reference_rect());
  v
}

fn reference_rect() -> egui::Rect {
  egui::Rect::from_min_size(egui::pos2(0., 0.), egui::vec2(975., 610.))
}

#[test]
fn point_under_cursor_is_stable_across_wheel_zoom() {
  let mut v = viewport();
  let cursor = ScreenPosition::new(100., 50.);

  let before = ViewMapping::new(reference_rect(), v.transform());
  let anchored = before.to_map(cursor);

  v.wheel(-100., cursor);
  assert_approx_eq!(v.zoom(), 1.5);

  let after = ViewMapping::new(reference_rect(), v.transform());
  let back = after.to_screen(anchored);
  assert_approx_eq!(back.x, cursor.x, 1e-3);
  assert_approx_eq!(back.y, cursor.y, 1e-3);
}

#[test]
fn zoom_buttons_keep_the_container_center_fixed() {
  let mut v = viewport();
  v.pointer_pressed(ScreenPosition::new(0., 0.));
  v.pointer_moved(ScreenPosition::new(60., -40.));
  v.pointer_released();

  let before = ViewMapping::new(reference_rect(), v.transform());
  let center_point = before.to_map(ScreenPosition::new(487.5, 305.));

  v.zoom_in();
  let after = ViewMapping::new(reference_rect(), v.transform());
  let back = after.to_screen(center_point);
  assert_approx_eq!(back.x, 487.5, 1e-3);
  assert_approx_eq!(back.y, 305., 1e-3);
}

#[test]
fn marker_hit_radius_shrinks_in_map_space_as_zoom_grows() {
  let mut v = viewport();
  v.wheel(-400., ScreenPosition::new(487.5, 305.));
  assert_approx_eq!(v.zoom(), 3.);

  // A glyph drawn with the counter-scale keeps a constant screen radius, so
  // its extent in reference units is the base radius over the zoom.
  let view = ViewMapping::new(reference_rect(), v.transform());
  let anchor = view.to_screen(MapPoint::new(400., 300.));
  let rim = view.to_map(anchor + ScreenPosition::new(33., 0.));
  assert_approx_eq!(rim.dist(&MapPoint::new(400., 300.)), 33. / 3., 1e-3);
}

#[test]
fn wheel_in_then_buttons_out_returns_to_rest() {
  let mut v = viewport();
  v.wheel(-120., ScreenPosition::new(200., 100.));
  v.pointer_pressed(ScreenPosition::new(400., 300.));
  v.pointer_moved(ScreenPosition::new(450., 350.));
  v.pointer_released();
  assert!(v.pan() != ScreenPosition::default());

  for _ in 0..10 {
    v.zoom_out();
  }
  assert_approx_eq!(v.zoom(), MIN_ZOOM);
  assert_eq!(v.pan(), ScreenPosition::default());
}

#[test]
fn pinch_clamps_at_the_zoom_limits() {
  let mut v = viewport();
  v.touch_started(&[
    ScreenPosition::new(480., 300.),
    ScreenPosition::new(500., 300.),
  ]);
  // A huge spread would shoot past the ceiling without clamping.
  v.touch_moved(&[
    ScreenPosition::new(0., 300.),
    ScreenPosition::new(975., 300.),
  ]);
  assert_approx_eq!(v.zoom(), MAX_ZOOM);

  // Pinching all the way back in lands on the rest state.
  v.touch_moved(&[
    ScreenPosition::new(489., 300.),
    ScreenPosition::new(491., 300.),
  ]);
  assert_approx_eq!(v.zoom(), MIN_ZOOM);
  assert_eq!(v.pan(), ScreenPosition::default());
}

#[test]
fn lifting_one_finger_turns_the_pinch_into_a_drag() {
  let mut v = viewport();
  v.touch_started(&[
    ScreenPosition::new(300., 300.),
    ScreenPosition::new(500., 300.),
  ]);
  v.touch_moved(&[
    ScreenPosition::new(250., 300.),
    ScreenPosition::new(550., 300.),
  ]);
  let zoom_after_pinch = v.zoom();
  assert!(zoom_after_pinch > MIN_ZOOM);

  v.touch_ended(&[ScreenPosition::new(550., 300.)]);
  assert!(matches!(v.gesture(), GestureState::Dragging { .. }));

  let pan_before = v.pan();
  v.touch_moved(&[ScreenPosition::new(570., 310.)]);
  assert_approx_eq!(v.pan().x, pan_before.x + 20.);
  assert_approx_eq!(v.pan().y, pan_before.y + 10.);
  // The drag must not disturb the zoom reached by the pinch.
  assert_approx_eq!(v.zoom(), zoom_after_pinch);

  v.touch_ended(&[]);
  assert!(!v.is_gesturing());
}
