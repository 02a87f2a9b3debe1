use serde::Deserialize;

use crate::data::{DataError, states::state_code};

use super::coordinates::MapPoint;

/// One state boundary, already in reference-space pixels.
#[derive(Debug, Clone)]
pub struct StateShape {
  pub name: String,
  pub code: Option<&'static str>,
  pub rings: Vec<Vec<MapPoint>>,
}

#[derive(Deserialize)]
struct Topology {
  transform: Option<TransformSpec>,
  arcs: Vec<Vec<Vec<f64>>>,
  objects: Objects,
}

#[derive(Deserialize)]
struct TransformSpec {
  scale: [f64; 2],
  translate: [f64; 2],
}

#[derive(Deserialize)]
struct Objects {
  states: GeometryCollection,
}

#[derive(Deserialize)]
struct GeometryCollection {
  geometries: Vec<TopoGeometry>,
}

#[derive(Deserialize)]
struct TopoGeometry {
  #[serde(rename = "type")]
  kind: String,
  #[serde(default)]
  arcs: serde_json::Value,
  #[serde(default)]
  properties: Properties,
}

#[derive(Deserialize, Default)]
struct Properties {
  #[serde(default)]
  name: String,
}

/// Decodes the `states` collection of a topology into per-state rings.
///
/// The topology is pre-projected; the decoded coordinates are used as-is and
/// are never passed through the point projection again.
pub fn decode_states(json: &str) -> Result<Vec<StateShape>, DataError> {
  let topology: Topology = serde_json::from_str(json)?;
  let arcs = decode_arcs(&topology);

  let mut shapes = Vec::with_capacity(topology.objects.states.geometries.len());
  for geometry in &topology.objects.states.geometries {
    let rings = match geometry.kind.as_str() {
      "Polygon" => {
        let polygon: Vec<Vec<i64>> = serde_json::from_value(geometry.arcs.clone())?;
        polygon
          .iter()
          .map(|ring| stitch_ring(ring, &arcs))
          .collect::<Result<Vec<_>, _>>()?
      }
      "MultiPolygon" => {
        let polygons: Vec<Vec<Vec<i64>>> = serde_json::from_value(geometry.arcs.clone())?;
        polygons
          .iter()
          .flatten()
          .map(|ring| stitch_ring(ring, &arcs))
          .collect::<Result<Vec<_>, _>>()?
      }
      other => {
        log::warn!(
          "Skipping unsupported geometry type {other} for {}",
          geometry.properties.name
        );
        continue;
      }
    };
    shapes.push(StateShape {
      code: state_code(&geometry.properties.name),
      name: geometry.properties.name.clone(),
      rings,
    });
  }
  Ok(shapes)
}

/// Resolves the quantized delta encoding into absolute positions per arc.
#[allow(clippy::cast_possible_truncation)]
fn decode_arcs(topology: &Topology) -> Vec<Vec<MapPoint>> {
  topology
    .arcs
    .iter()
    .map(|arc| {
      let mut x = 0.;
      let mut y = 0.;
      arc
        .iter()
        .filter(|position| position.len() >= 2)
        .map(|position| {
          if let Some(t) = &topology.transform {
            x += position[0];
            y += position[1];
            MapPoint::new(
              (x * t.scale[0] + t.translate[0]) as f32,
              (y * t.scale[1] + t.translate[1]) as f32,
            )
          } else {
            MapPoint::new(position[0] as f32, position[1] as f32)
          }
        })
        .collect()
    })
    .collect()
}

/// Concatenates the referenced arcs into one ring. A negative index is the
/// ones' complement of an arc to be walked backwards. Consecutive arcs share
/// their join point, which is dropped before appending the next arc.
fn stitch_ring(indexes: &[i64], arcs: &[Vec<MapPoint>]) -> Result<Vec<MapPoint>, DataError> {
  let mut ring: Vec<MapPoint> = Vec::new();
  for &index in indexes {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (arc_index, reverse) = if index < 0 {
      ((!index) as usize, true)
    } else {
      (index as usize, false)
    };
    let arc = arcs
      .get(arc_index)
      .ok_or_else(|| DataError::Topology(format!("arc index {index} out of range")))?;
    if !ring.is_empty() {
      ring.pop();
    }
    if reverse {
      ring.extend(arc.iter().rev());
    } else {
      ring.extend(arc.iter());
    }
  }
  Ok(ring)
}

#[cfg(test)]
mod tests {
  use super::*;

  const FIXTURE: &str = r#"{
    "type": "Topology",
    "transform": { "scale": [1, 1], "translate": [0, 0] },
    "arcs": [
      [[0, 0], [10, 0], [0, 10]],
      [[10, 10], [-10, 0], [0, -10]]
    ],
    "objects": {
      "states": {
        "type": "GeometryCollection",
        "geometries": [
          {
            "type": "Polygon",
            "arcs": [[0, 1]],
            "properties": { "name": "Kansas" }
          },
          {
            "type": "MultiPolygon",
            "arcs": [[[-1]]],
            "properties": { "name": "Atlantis" }
          }
        ]
      }
    }
  }"#;

  #[test]
  fn decodes_delta_encoded_ring() {
    let shapes = decode_states(FIXTURE).expect("decode");
    assert_eq!(shapes.len(), 2);
    assert_eq!(shapes[0].name, "Kansas");
    assert_eq!(shapes[0].code, Some("KS"));
    assert_eq!(
      shapes[0].rings[0],
      vec![
        MapPoint::new(0., 0.),
        MapPoint::new(10., 0.),
        MapPoint::new(10., 10.),
        MapPoint::new(0., 10.),
        MapPoint::new(0., 0.),
      ]
    );
  }

  #[test]
  fn reversed_arc_walks_backwards() {
    let shapes = decode_states(FIXTURE).expect("decode");
    assert_eq!(shapes[1].code, None);
    assert_eq!(
      shapes[1].rings[0],
      vec![
        MapPoint::new(10., 10.),
        MapPoint::new(10., 0.),
        MapPoint::new(0., 0.),
      ]
    );
  }

  #[test]
  fn rejects_dangling_arc_reference() {
    let broken = FIXTURE.replace("[[0, 1]]", "[[7]]");
    assert!(matches!(
      decode_states(&broken),
      Err(DataError::Topology(_))
    ));
  }
}
