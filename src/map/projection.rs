use super::coordinates::MapPoint;

const EPSILON: f64 = 1e-6;

/// One Lambert conic equal-area projection with a longitude rotation, a
/// center and a screen translate, plus the rectangular inset it is clipped to.
#[derive(Debug, Clone)]
struct ConicEqualArea {
  n: f64,
  c: f64,
  rho0: f64,
  rotate_lon: f64,
  scale: f64,
  dx: f64,
  dy: f64,
  clip_min: (f64, f64),
  clip_max: (f64, f64),
}

impl ConicEqualArea {
  #[allow(clippy::too_many_arguments)]
  fn new(
    parallels: (f64, f64),
    rotate_lon: f64,
    center: (f64, f64),
    scale: f64,
    translate: (f64, f64),
    clip_min: (f64, f64),
    clip_max: (f64, f64),
  ) -> Self {
    let sy0 = parallels.0.to_radians().sin();
    let sy1 = parallels.1.to_radians().sin();
    let n = (sy0 + sy1) / 2.;
    let c = 1. + sy0 * (2. * n - sy0);
    let rho0 = c.sqrt() / n;

    // The center is given in rotated coordinates; shift the translate so that
    // its raw projection lands exactly on the requested screen point.
    let (cx, cy) = Self::raw(n, c, rho0, center.0.to_radians(), center.1.to_radians());
    let dx = translate.0 - scale * cx;
    let dy = translate.1 + scale * cy;

    Self {
      n,
      c,
      rho0,
      rotate_lon,
      scale,
      dx,
      dy,
      clip_min,
      clip_max,
    }
  }

  fn raw(n: f64, c: f64, rho0: f64, lambda: f64, phi: f64) -> (f64, f64) {
    let rho = (c - 2. * n * phi.sin()).max(0.).sqrt() / n;
    (rho * (n * lambda).sin(), rho0 - rho * (n * lambda).cos())
  }

  /// Projects a geographic coordinate, returning `None` when the result falls
  /// outside this projection's inset.
  fn project(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
    let mut lambda = lon + self.rotate_lon;
    if lambda > 180. {
      lambda -= 360.;
    } else if lambda < -180. {
      lambda += 360.;
    }
    let (x, y) = Self::raw(
      self.n,
      self.c,
      self.rho0,
      lambda.to_radians(),
      lat.to_radians(),
    );
    let sx = self.scale * x + self.dx;
    let sy = self.dy - self.scale * y;
    (sx >= self.clip_min.0 && sx <= self.clip_max.0 && sy >= self.clip_min.1 && sy <= self.clip_max.1)
      .then_some((sx, sy))
  }
}

/// The composite Albers-USA projection the place coordinates are projected
/// with: the lower 48 states plus Alaska and Hawaii insets.
///
/// The boundary polygons are supplied already projected into the same pixel
/// space; only point data goes through this projection.
#[derive(Debug, Clone)]
pub struct AlbersUsa {
  lower48: ConicEqualArea,
  alaska: ConicEqualArea,
  hawaii: ConicEqualArea,
}

impl Default for AlbersUsa {
  fn default() -> Self {
    Self::new(1300., (487.5, 305.))
  }
}

impl AlbersUsa {
  #[must_use]
  pub fn new(scale: f64, translate: (f64, f64)) -> Self {
    let k = scale;
    let (tx, ty) = translate;

    let lower48 = ConicEqualArea::new(
      (29.5, 45.5),
      96.,
      (-0.6, 38.7),
      k,
      (tx, ty),
      (tx - 0.455 * k, ty - 0.238 * k),
      (tx + 0.455 * k, ty + 0.238 * k),
    );
    let alaska = ConicEqualArea::new(
      (55., 65.),
      154.,
      (-2., 58.5),
      k * 0.35,
      (tx - 0.307 * k, ty + 0.201 * k),
      (tx - 0.425 * k + EPSILON, ty + 0.120 * k + EPSILON),
      (tx - 0.214 * k - EPSILON, ty + 0.234 * k - EPSILON),
    );
    let hawaii = ConicEqualArea::new(
      (8., 18.),
      157.,
      (-3., 19.9),
      k,
      (tx - 0.205 * k, ty + 0.212 * k),
      (tx - 0.214 * k + EPSILON, ty + 0.166 * k + EPSILON),
      (tx - 0.115 * k - EPSILON, ty + 0.234 * k - EPSILON),
    );

    Self {
      lower48,
      alaska,
      hawaii,
    }
  }

  /// Projects a point to reference-space pixels. Returns `None` for points
  /// outside every inset; callers skip those, they are not errors.
  #[must_use]
  #[allow(clippy::cast_possible_truncation)]
  pub fn project(&self, lat: f64, lon: f64) -> Option<MapPoint> {
    self
      .lower48
      .project(lat, lon)
      .or_else(|| self.alaska.project(lat, lon))
      .or_else(|| self.hawaii.project(lat, lon))
      .map(|(x, y)| MapPoint::new(x as f32, y as f32))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use assert_approx_eq::assert_approx_eq;
  use rstest::rstest;

  #[test]
  fn projection_center_is_translate() {
    // The post-rotation center of the lower 48 maps onto the translate point.
    let proj = AlbersUsa::default();
    let p = proj.project(38.7, -96.6).expect("center projects");
    assert_approx_eq!(p.x, 487.5, 1e-3);
    assert_approx_eq!(p.y, 305., 1e-3);
  }

  #[rstest]
  #[case(40.7128, -74.006)] // New York
  #[case(34.0522, -118.2437)] // Los Angeles
  #[case(61.2181, -149.9003)] // Anchorage
  #[case(21.3069, -157.8583)] // Honolulu
  fn projects_us_points(#[case] lat: f64, #[case] lon: f64) {
    assert!(AlbersUsa::default().project(lat, lon).is_some());
  }

  #[rstest]
  #[case(51.5074, -0.1278)] // London
  #[case(0., 0.)] // null island
  #[case(-33.8688, 151.2093)] // Sydney
  fn rejects_out_of_domain_points(#[case] lat: f64, #[case] lon: f64) {
    assert!(AlbersUsa::default().project(lat, lon).is_none());
  }

  #[test]
  fn east_coast_is_right_of_west_coast() {
    let proj = AlbersUsa::default();
    let nyc = proj.project(40.7128, -74.006).expect("nyc");
    let la = proj.project(34.0522, -118.2437).expect("la");
    assert!(nyc.x > la.x);
  }

  #[test]
  fn insets_land_in_the_lower_left() {
    let proj = AlbersUsa::default();
    let anchorage = proj.project(61.2181, -149.9003).expect("anchorage");
    let honolulu = proj.project(21.3069, -157.8583).expect("honolulu");
    assert!(anchorage.y > 305.);
    assert!(anchorage.x < 487.5);
    assert!(honolulu.y > 305.);
    assert!(honolulu.x < 487.5);
  }
}
