use super::coordinates::ScreenPosition;
use super::markers::MARKER_HOVER_RADIUS;

pub const POPUP_WIDTH: f32 = 448.;
pub const POPUP_HEIGHT: f32 = 318.;
/// Horizontal clearance between the marker's hover radius and the popup.
pub const POPUP_GAP: f32 = 9.;

/// Which detail surface is open. The popup and the overlay are mutually
/// exclusive; opening the overlay closes the popup.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum SelectionState {
  #[default]
  Closed,
  DetailOpen {
    group_key: String,
    /// Popup top-left, relative to the map container.
    pos: ScreenPosition,
  },
  OverlayOpen {
    place_id: u64,
  },
}

impl SelectionState {
  /// Opens the detail popup for a marker group. There is no path from the
  /// open overlay back to the popup; the overlay covers the map.
  pub fn open_details(&mut self, group_key: String, pos: ScreenPosition) {
    if matches!(self, SelectionState::OverlayOpen { .. }) {
      return;
    }
    *self = SelectionState::DetailOpen { group_key, pos };
  }

  /// "View project details": opens the overlay and closes the popup.
  pub fn view_details(&mut self, place_id: u64) {
    log::debug!("Viewing details for place {place_id}");
    *self = SelectionState::OverlayOpen { place_id };
  }

  pub fn close_overlay(&mut self) {
    *self = SelectionState::Closed;
  }

  /// Closes the popup only; an open overlay is left untouched. Wired to
  /// clicks on empty map space.
  pub fn close_details(&mut self) {
    if matches!(self, SelectionState::DetailOpen { .. }) {
      *self = SelectionState::Closed;
    }
  }

  #[must_use]
  pub fn open_popup(&self) -> Option<(&str, ScreenPosition)> {
    match self {
      SelectionState::DetailOpen { group_key, pos } => Some((group_key, *pos)),
      _ => None,
    }
  }

  #[must_use]
  pub fn open_overlay(&self) -> Option<u64> {
    match self {
      SelectionState::OverlayOpen { place_id } => Some(*place_id),
      _ => None,
    }
  }
}

/// Places the popup beside a marker: to the right of the hover radius, or
/// flipped to the left when the right side would overflow the container.
/// Top/bottom overflow is accepted.
#[must_use]
pub fn popup_position(marker_center: ScreenPosition, container_width: f32) -> ScreenPosition {
  let right = marker_center.x + MARKER_HOVER_RADIUS + POPUP_GAP;
  let x = if right + POPUP_WIDTH > container_width {
    marker_center.x - POPUP_WIDTH - MARKER_HOVER_RADIUS - POPUP_GAP
  } else {
    right
  };
  ScreenPosition {
    x,
    y: marker_center.y - POPUP_HEIGHT / 2.,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use assert_approx_eq::assert_approx_eq;

  #[test]
  fn popup_prefers_the_right_side() {
    let pos = popup_position(ScreenPosition::new(100., 200.), 800.);
    assert_approx_eq!(pos.x, 100. + 33. + 9.);
    assert_approx_eq!(pos.y, 200. - 318. / 2.);
  }

  #[test]
  fn popup_flips_left_when_it_would_overflow() {
    let pos = popup_position(ScreenPosition::new(400., 200.), 500.);
    assert_approx_eq!(pos.x, 400. - 448. - 33. - 9.);
  }

  #[test]
  fn overlay_closes_the_popup() {
    let mut selection = SelectionState::default();
    selection.open_details("k".to_string(), ScreenPosition::default());
    assert!(selection.open_popup().is_some());

    selection.view_details(7);
    assert!(selection.open_popup().is_none());
    assert_eq!(selection.open_overlay(), Some(7));

    selection.close_overlay();
    assert_eq!(selection, SelectionState::Closed);
  }

  #[test]
  fn close_details_leaves_the_overlay_alone() {
    let mut selection = SelectionState::default();
    selection.view_details(3);
    selection.close_details();
    assert_eq!(selection.open_overlay(), Some(3));
  }

  #[test]
  fn no_popup_over_an_open_overlay() {
    let mut selection = SelectionState::default();
    selection.view_details(3);
    selection.open_details("k".to_string(), ScreenPosition::default());
    assert_eq!(selection.open_overlay(), Some(3));
    assert!(selection.open_popup().is_none());
  }
}
