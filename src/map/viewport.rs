use egui::Rect;

use super::coordinates::ScreenPosition;

pub const ZOOM_STEP: f32 = 0.3;
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 5.0;

/// Normalizes wheel deltas before they become zoom changes.
const WHEEL_NORMALIZE: f32 = 0.01;
const WHEEL_STEP: f32 = 0.5;
/// Halves the perceived pinch sensitivity.
const PINCH_DAMPENING: f32 = 0.5;

/// The user-controlled map transform. At the resting zoom the pan is always
/// the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewTransform {
  pub zoom: f32,
  pub pan: ScreenPosition,
}

impl Default for ViewTransform {
  fn default() -> Self {
    Self {
      zoom: MIN_ZOOM,
      pan: ScreenPosition::default(),
    }
  }
}

/// Transient gesture state. A drag and a pinch cannot coexist.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub enum GestureState {
  #[default]
  Idle,
  Dragging {
    /// Pointer position minus the pan at press time.
    start: ScreenPosition,
  },
  Pinching {
    initial_distance: f32,
    initial_zoom: f32,
    /// Midpoint of the two touches at pinch start; fixed for the whole
    /// gesture so the focal point does not drift.
    center: ScreenPosition,
  },
}

/// Owns the zoom level and pan offset and turns gestures into transform
/// updates. Operations that need the container's bounding box silently no-op
/// until it has been measured.
#[derive(Debug, Default)]
pub struct Viewport {
  transform: ViewTransform,
  gesture: GestureState,
  container: Option<Rect>,
}

impl Viewport {
  pub fn set_container(&mut self, rect: Rect) {
    self.container = Some(rect);
  }

  #[must_use]
  pub fn transform(&self) -> ViewTransform {
    self.transform
  }

  #[must_use]
  pub fn zoom(&self) -> f32 {
    self.transform.zoom
  }

  #[must_use]
  pub fn pan(&self) -> ScreenPosition {
    self.transform.pan
  }

  /// Counter-scale for marker glyphs so they keep a constant screen size.
  #[must_use]
  pub fn inverse_scale(&self) -> f32 {
    1. / self.transform.zoom
  }

  #[must_use]
  pub fn gesture(&self) -> GestureState {
    self.gesture
  }

  #[must_use]
  pub fn is_gesturing(&self) -> bool {
    !matches!(self.gesture, GestureState::Idle)
  }

  /// Re-centers the pan so the map point under `pointer` stays under it
  /// across the zoom change.
  pub fn zoom_to_point(&mut self, new_zoom: f32, pointer: ScreenPosition) {
    let Some(rect) = self.container else {
      return;
    };

    // Pointer position relative to the container center.
    let mouse = ScreenPosition {
      x: pointer.x - rect.left() - rect.width() / 2.,
      y: pointer.y - rect.top() - rect.height() / 2.,
    };

    // The map-space point currently under the pointer.
    let point = (mouse - self.transform.pan) / self.transform.zoom;

    self.transform.pan = mouse - point * new_zoom;
    self.transform.zoom = new_zoom;
  }

  /// Scales the pan with the zoom ratio so the container center stays fixed.
  /// Used by the discrete +/- controls.
  pub fn zoom_to_center(&mut self, new_zoom: f32) {
    let ratio = new_zoom / self.transform.zoom;
    self.transform.pan = self.transform.pan * ratio;
    self.transform.zoom = new_zoom;
  }

  pub fn zoom_in(&mut self) {
    let new_zoom = (self.transform.zoom + ZOOM_STEP).min(MAX_ZOOM);
    self.zoom_to_center(new_zoom);
  }

  pub fn zoom_out(&mut self) {
    let new_zoom = (self.transform.zoom - ZOOM_STEP).max(MIN_ZOOM);
    if new_zoom == MIN_ZOOM {
      // Snap back to the rest state.
      self.transform = ViewTransform::default();
    } else {
      self.zoom_to_center(new_zoom);
    }
  }

  /// Wheel zoom with DOM-style sign: a positive delta scrolls down and zooms
  /// out.
  pub fn wheel(&mut self, delta_y: f32, pointer: ScreenPosition) {
    let delta = -delta_y * WHEEL_NORMALIZE;
    let zoom_change = delta * WHEEL_STEP;
    let new_zoom = (self.transform.zoom + zoom_change).clamp(MIN_ZOOM, MAX_ZOOM);

    if new_zoom == MIN_ZOOM {
      self.transform = ViewTransform::default();
    } else {
      self.zoom_to_point(new_zoom, pointer);
    }
  }

  pub fn pointer_pressed(&mut self, pointer: ScreenPosition) {
    self.gesture = GestureState::Dragging {
      start: pointer - self.transform.pan,
    };
  }

  pub fn pointer_moved(&mut self, pointer: ScreenPosition) {
    if let GestureState::Dragging { start } = self.gesture {
      self.transform.pan = pointer - start;
    }
  }

  /// Pointer up anywhere ends the drag; the widget wires leaving the
  /// container to this as well.
  pub fn pointer_released(&mut self) {
    self.gesture = GestureState::Idle;
  }

  pub fn touch_started(&mut self, touches: &[ScreenPosition]) {
    match touches {
      [single] => {
        self.gesture = GestureState::Dragging {
          start: *single - self.transform.pan,
        };
      }
      [first, second, ..] => {
        // A pinch needs two distinct touch points, so the distance is
        // non-zero and safe to divide by later.
        self.gesture = GestureState::Pinching {
          initial_distance: first.dist(second),
          initial_zoom: self.transform.zoom,
          center: first.midpoint(second),
        };
      }
      [] => {}
    }
  }

  pub fn touch_moved(&mut self, touches: &[ScreenPosition]) {
    match (touches, self.gesture) {
      ([single], GestureState::Dragging { start }) => {
        self.transform.pan = *single - start;
      }
      (
        [first, second, ..],
        GestureState::Pinching {
          initial_distance,
          initial_zoom,
          center,
        },
      ) => {
        let raw_zoom_factor = first.dist(second) / initial_distance;
        let zoom_factor = 1. + (raw_zoom_factor - 1.) * PINCH_DAMPENING;
        let new_zoom = (initial_zoom * zoom_factor).clamp(MIN_ZOOM, MAX_ZOOM);

        self.zoom_to_point(new_zoom, center);

        if new_zoom == MIN_ZOOM {
          self.transform = ViewTransform::default();
        }
      }
      _ => {}
    }
  }

  pub fn touch_ended(&mut self, remaining: &[ScreenPosition]) {
    match remaining {
      [] => self.gesture = GestureState::Idle,
      [single] => {
        // Two fingers down to one: the pinch becomes a drag anchored to the
        // remaining touch.
        if matches!(self.gesture, GestureState::Pinching { .. }) {
          self.gesture = GestureState::Dragging {
            start: *single - self.transform.pan,
          };
        }
      }
      _ => {}
    }
  }
}
