use std::ops::{Add, AddAssign, Div, Mul, Sub};

use egui::Rect;
use serde::{Deserialize, Serialize};

use super::viewport::ViewTransform;

/// The fixed reference space the boundary data is pre-projected into.
pub const MAP_WIDTH: f32 = 975.;
pub const MAP_HEIGHT: f32 = 610.;

/// A point in the 975x610 pre-projected reference space.
#[derive(Debug, Default, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct MapPoint {
  pub x: f32,
  pub y: f32,
}

impl MapPoint {
  #[must_use]
  pub fn new(x: f32, y: f32) -> Self {
    Self { x, y }
  }

  #[must_use]
  pub fn dist(&self, other: &Self) -> f32 {
    let dx = other.x - self.x;
    let dy = other.y - self.y;
    dx.hypot(dy)
  }
}

/// An actual pixel in the UI. Handled equivalently to an ``egui::Pos2``.
#[derive(Debug, Default, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct ScreenPosition {
  pub x: f32,
  pub y: f32,
}

impl ScreenPosition {
  #[must_use]
  pub fn new(x: f32, y: f32) -> Self {
    Self { x, y }
  }

  #[must_use]
  pub fn dist(&self, other: &Self) -> f32 {
    let dx = other.x - self.x;
    let dy = other.y - self.y;
    dx.hypot(dy)
  }

  #[must_use]
  pub fn midpoint(&self, other: &Self) -> Self {
    Self {
      x: (self.x + other.x) / 2.,
      y: (self.y + other.y) / 2.,
    }
  }
}

impl From<egui::Pos2> for ScreenPosition {
  fn from(pos: egui::Pos2) -> Self {
    Self { x: pos.x, y: pos.y }
  }
}

impl From<ScreenPosition> for egui::Pos2 {
  fn from(sp: ScreenPosition) -> Self {
    egui::Pos2::new(sp.x, sp.y)
  }
}

macro_rules! impl_point_ops {
  ($t:ty) => {
    impl Add for $t {
      type Output = Self;
      fn add(self, rhs: Self) -> Self {
        Self {
          x: self.x + rhs.x,
          y: self.y + rhs.y,
        }
      }
    }

    impl Sub for $t {
      type Output = Self;
      fn sub(self, rhs: Self) -> Self {
        Self {
          x: self.x - rhs.x,
          y: self.y - rhs.y,
        }
      }
    }

    impl AddAssign for $t {
      fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
      }
    }

    impl Mul<f32> for $t {
      type Output = Self;
      fn mul(self, rhs: f32) -> Self {
        Self {
          x: self.x * rhs,
          y: self.y * rhs,
        }
      }
    }

    impl Div<f32> for $t {
      type Output = Self;
      fn div(self, rhs: f32) -> Self {
        Self {
          x: self.x / rhs,
          y: self.y / rhs,
        }
      }
    }
  };
}

impl_point_ops!(MapPoint);
impl_point_ops!(ScreenPosition);

/// Maps between the reference space and UI pixels for one frame.
///
/// Composes the object-contain fit of the 975x610 reference box into the
/// container with the user transform `translate(pan) scale(zoom)` whose origin
/// is the container center.
#[derive(Debug, Copy, Clone)]
pub struct ViewMapping {
  origin: ScreenPosition,
  fit_scale: f32,
  center: ScreenPosition,
  zoom: f32,
  pan: ScreenPosition,
}

impl ViewMapping {
  #[must_use]
  pub fn new(container: Rect, transform: ViewTransform) -> Self {
    let fit_scale = (container.width() / MAP_WIDTH).min(container.height() / MAP_HEIGHT);
    let content_w = MAP_WIDTH * fit_scale;
    let content_h = MAP_HEIGHT * fit_scale;
    let origin = ScreenPosition {
      x: container.left() + (container.width() - content_w) / 2.,
      y: container.top() + (container.height() - content_h) / 2.,
    };
    Self {
      origin,
      fit_scale,
      center: container.center().into(),
      zoom: transform.zoom,
      pan: transform.pan,
    }
  }

  /// The scale from reference units to screen pixels before the user zoom.
  #[must_use]
  pub fn fit_scale(&self) -> f32 {
    self.fit_scale
  }

  #[must_use]
  pub fn to_screen(&self, point: MapPoint) -> ScreenPosition {
    let base = self.origin + ScreenPosition::new(point.x, point.y) * self.fit_scale;
    self.center + self.pan + (base - self.center) * self.zoom
  }

  #[must_use]
  pub fn to_map(&self, pos: ScreenPosition) -> MapPoint {
    let base = self.center + (pos - self.center - self.pan) / self.zoom;
    let rel = (base - self.origin) / self.fit_scale;
    MapPoint::new(rel.x, rel.y)
  }
}
