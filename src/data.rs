use std::path::Path;

use crate::config::Config;
use crate::map::boundaries::{self, StateShape};

/// The fixed focus-area taxonomy.
pub mod focus_areas;
/// Partner records shown in the project overlay.
pub mod partners;
/// Place records and their CSV loader.
pub mod places;
/// State name to two-letter code mapping.
pub mod states;

pub use partners::Partner;
pub use places::{PlaceRecord, Status};

#[derive(Debug, thiserror::Error)]
pub enum DataError {
  #[error("failed to read data file: {0}")]
  Io(#[from] std::io::Error),
  #[error("failed to parse CSV: {0}")]
  Csv(#[from] csv::Error),
  #[error("failed to parse JSON: {0}")]
  Json(#[from] serde_json::Error),
  #[error("malformed topology: {0}")]
  Topology(String),
}

/// Everything the map widget renders, loaded once at startup.
pub struct MapData {
  pub states: Vec<StateShape>,
  pub places: Vec<PlaceRecord>,
  pub partners: Vec<Partner>,
  pub density: Option<image::RgbaImage>,
}

/// Loads all data files referenced by the config. The density raster is
/// optional; everything else is required.
pub fn load_map_data(config: &Config) -> Result<MapData, DataError> {
  let states = boundaries::decode_states(&std::fs::read_to_string(config.boundaries_path())?)?;
  let places = places::load_places(&config.places_path())?;
  let partners = partners::load_partners(&config.partners_path())?;
  let density = load_density(&config.density_path());

  log::info!(
    "Loaded {} states, {} places, {} partners",
    states.len(),
    places.len(),
    partners.len()
  );

  Ok(MapData {
    states,
    places,
    partners,
    density,
  })
}

fn load_density(path: &Path) -> Option<image::RgbaImage> {
  match image::open(path) {
    Ok(img) => Some(img.to_rgba8()),
    Err(e) => {
      log::warn!("No density raster at {}: {e}", path.display());
      None
    }
  }
}
