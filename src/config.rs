use std::path::PathBuf;

use dirs::home_dir;
use log::error;

const BOUNDARIES_FILE: &str = "states-albers-10m.json";
const PLACES_FILE: &str = "places.csv";
const PARTNERS_FILE: &str = "partners.csv";
const DENSITY_FILE: &str = "density.png";

/// Where the data files live. Resolved from the environment, then the config
/// file, then defaults; explicit per-file paths win over `data_dir`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Config {
  pub config_path: Option<PathBuf>,
  pub data_dir: Option<PathBuf>,
  pub boundaries_file: Option<PathBuf>,
  pub places_file: Option<PathBuf>,
  pub partners_file: Option<PathBuf>,
  pub density_file: Option<PathBuf>,
}

impl Config {
  #[must_use]
  pub fn new() -> Self {
    let from_env = Self::from_env();
    let from_file = Self::from_file();
    let default = Self::default();

    let mut merged = from_env;
    if let Some(from_file) = &from_file {
      merged = merged.merge(from_file);
    }
    merged = merged.merge(&default);

    if merged.config_path.is_some() && from_file.is_none() {
      merged.init_cfg_file();
    }

    merged
  }

  #[must_use]
  pub fn boundaries_path(&self) -> PathBuf {
    self.resolve(self.boundaries_file.as_ref(), BOUNDARIES_FILE)
  }

  #[must_use]
  pub fn places_path(&self) -> PathBuf {
    self.resolve(self.places_file.as_ref(), PLACES_FILE)
  }

  #[must_use]
  pub fn partners_path(&self) -> PathBuf {
    self.resolve(self.partners_file.as_ref(), PARTNERS_FILE)
  }

  #[must_use]
  pub fn density_path(&self) -> PathBuf {
    self.resolve(self.density_file.as_ref(), DENSITY_FILE)
  }

  fn resolve(&self, explicit: Option<&PathBuf>, file_name: &str) -> PathBuf {
    explicit.cloned().unwrap_or_else(|| {
      self
        .data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("data"))
        .join(file_name)
    })
  }

  fn from_env() -> Self {
    Self {
      config_path: std::env::var("PLACEMAP_CONFIG").ok().map(PathBuf::from),
      data_dir: std::env::var("PLACEMAP_DATA_DIR").ok().map(PathBuf::from),
      boundaries_file: None,
      places_file: None,
      partners_file: None,
      density_file: None,
    }
  }

  fn merge(mut self, other: &Self) -> Self {
    self.config_path = self.config_path.or(other.config_path.clone());
    self.data_dir = self.data_dir.or(other.data_dir.clone());
    self.boundaries_file = self.boundaries_file.or(other.boundaries_file.clone());
    self.places_file = self.places_file.or(other.places_file.clone());
    self.partners_file = self.partners_file.or(other.partners_file.clone());
    self.density_file = self.density_file.or(other.density_file.clone());
    self
  }

  fn from_file() -> Option<Self> {
    let config_path = std::env::var("PLACEMAP_CONFIG")
      .ok()
      .map(PathBuf::from)
      .or_else(|| home_dir().map(|p| p.join(".config").join("placemap")))?;
    let config_path = config_path.join("config.json");

    serde_json::from_str(&std::fs::read_to_string(&config_path).ok()?)
      .inspect_err(|e| error!("Failed to read config file: {e}"))
      .ok()?
  }

  fn init_cfg_file(&self) {
    let Some(path) = &self.config_path else {
      return;
    };
    if !path.exists() {
      let _ = std::fs::create_dir_all(path).inspect_err(|e| {
        error!("Failed to create config directory: {e}");
      });
    }

    let path = path.join("config.json");
    if !path.exists() {
      match serde_json::to_string_pretty(self) {
        Ok(config) => {
          let _ = std::fs::write(path, config).inspect_err(|e| {
            error!("Failed to write config file: {e}");
          });
        }
        Err(e) => error!("Failed to serialize config: {e}"),
      }
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      config_path: home_dir().map(|p| p.join(".config").join("placemap")),
      data_dir: Some(PathBuf::from("data")),
      boundaries_file: None,
      places_file: None,
      partners_file: None,
      density_file: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn explicit_file_wins_over_data_dir() {
    let config = Config {
      data_dir: Some(PathBuf::from("/elsewhere")),
      places_file: Some(PathBuf::from("/explicit/places.csv")),
      ..Config::default()
    };
    assert_eq!(config.places_path(), PathBuf::from("/explicit/places.csv"));
    assert_eq!(
      config.partners_path(),
      PathBuf::from("/elsewhere/partners.csv")
    );
  }

  #[test]
  fn merge_prefers_the_left_side() {
    let left = Config {
      data_dir: Some(PathBuf::from("/left")),
      ..Config::default()
    };
    let right = Config {
      data_dir: Some(PathBuf::from("/right")),
      density_file: Some(PathBuf::from("/right/density.png")),
      ..Config::default()
    };
    let merged = left.merge(&right);
    assert_eq!(merged.data_dir, Some(PathBuf::from("/left")));
    assert_eq!(merged.density_file, Some(PathBuf::from("/right/density.png")));
  }
}
