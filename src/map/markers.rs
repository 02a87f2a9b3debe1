use std::collections::HashMap;

use crate::data::PlaceRecord;

use super::coordinates::MapPoint;
use super::projection::AlbersUsa;

/// Screen radius of the resting marker glyph.
pub const MARKER_DEFAULT_RADIUS: f32 = 12.;
/// Screen radius of the expanded hover glyph; also the popup clearance.
pub const MARKER_HOVER_RADIUS: f32 = 33.;
/// Screen radius of the white dot inside the hover glyph.
pub const MARKER_HOVER_DOT_RADIUS: f32 = 7.;

/// Places whose coordinates round to the same 4-decimal key, sharing one
/// screen anchor. Rebuilt from the filtered place list on every render; the
/// key doubles as the stable UI id across rebuilds.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerGroup {
  pub key: String,
  pub anchor: MapPoint,
  /// Indices into the full place list.
  pub members: Vec<usize>,
}

/// The rounded-coordinate bucket key.
///
/// This is a fixed-precision spatial hash, not distance clustering: nearby but
/// distinct points can still overlap on screen at low zoom.
#[must_use]
pub fn coordinate_key(lat: f64, lon: f64) -> String {
  format!("{lat:.4}_{lon:.4}")
}

/// Buckets the given places by rounded coordinate, preserving first-seen
/// order. Sentinel `(0, 0)` records never arrive here (the caller filters
/// them); buckets whose anchor does not project are dropped entirely.
pub fn group_places<'a>(
  places: impl IntoIterator<Item = (usize, &'a PlaceRecord)>,
  projection: &AlbersUsa,
) -> Vec<MarkerGroup> {
  let mut order: Vec<(String, (f64, f64), Vec<usize>)> = Vec::new();
  let mut buckets: HashMap<String, usize> = HashMap::new();

  for (index, place) in places {
    if !place.has_location() {
      continue;
    }
    let key = coordinate_key(place.lat, place.lon);
    match buckets.get(&key) {
      Some(&slot) => order[slot].2.push(index),
      None => {
        buckets.insert(key.clone(), order.len());
        order.push((key, (place.lat, place.lon), vec![index]));
      }
    }
  }

  order
    .into_iter()
    .filter_map(|(key, (lat, lon), members)| {
      // All members share the rounded coordinate, so the first member's
      // projection stands in for the whole group.
      projection.project(lat, lon).map(|anchor| MarkerGroup {
        key,
        anchor,
        members,
      })
    })
    .collect()
}
