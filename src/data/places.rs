use std::io::Read;
use std::path::Path;

use itertools::Itertools as _;
use serde::Deserialize;

use super::DataError;

pub const DESCRIPTION_FALLBACK: &str = "No description available yet.";
pub const HIGHLIGHT_FALLBACK: &str = "No highlight available yet.";
pub const PREVIEW_FALLBACK: &str = "No preview available yet.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  Active,
  Completed,
}

/// One project site. Constructed once by the loader and immutable afterwards.
///
/// `(0, 0)` coordinates are the source sheet's sentinel for "no location";
/// such records stay in the list but are never mapped.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRecord {
  pub id: u64,
  pub name: String,
  pub lat: f64,
  pub lon: f64,
  pub city: String,
  pub state: String,
  pub start_year: Option<i32>,
  /// `None` means the project is ongoing.
  pub end_year: Option<i32>,
  pub focus_areas: Vec<String>,
  pub status: Status,
  pub approved: bool,
  pub description: String,
  pub highlight: String,
  pub preview_description: String,
}

impl PlaceRecord {
  /// Whether the record carries the "no location" sentinel.
  #[must_use]
  pub fn has_location(&self) -> bool {
    !(self.lat == 0. && self.lon == 0.)
  }

  #[must_use]
  pub fn years_label(&self) -> String {
    match (self.start_year, self.end_year) {
      (Some(start), Some(end)) => format!("{start} \u{2013} {end}"),
      (Some(start), None) => format!("{start} \u{2013} ongoing"),
      (None, Some(end)) => format!("until {end}"),
      (None, None) => String::new(),
    }
  }
}

/// The source sheet's column layout before renaming.
#[derive(Debug, Deserialize)]
struct RawPlace {
  #[serde(rename = "ID")]
  id: u64,
  #[serde(rename = "Project Name", default)]
  name: String,
  #[serde(rename = "Latitude", default)]
  lat: Option<f64>,
  #[serde(rename = "Longitude", default)]
  lon: Option<f64>,
  #[serde(rename = "City", default)]
  city: String,
  #[serde(rename = "State", default)]
  state: String,
  #[serde(rename = "Start Year", default)]
  start_year: Option<i32>,
  #[serde(rename = "End Year", default)]
  end_year: Option<i32>,
  #[serde(rename = "Focus Areas", default)]
  focus_areas: String,
  #[serde(rename = "Status", default)]
  status: String,
  #[serde(rename = "Approved", default)]
  approved: String,
  #[serde(rename = "Description", default)]
  description: String,
  #[serde(rename = "Highlight", default)]
  highlight: String,
  #[serde(rename = "Preview Description", default)]
  preview_description: String,
}

impl From<RawPlace> for PlaceRecord {
  fn from(raw: RawPlace) -> Self {
    Self {
      id: raw.id,
      name: raw.name.trim().to_string(),
      lat: raw.lat.unwrap_or(0.),
      lon: raw.lon.unwrap_or(0.),
      city: raw.city.trim().to_string(),
      state: raw.state.trim().to_string(),
      start_year: raw.start_year,
      end_year: raw.end_year,
      focus_areas: raw
        .focus_areas
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unique()
        .map(ToString::to_string)
        .collect(),
      status: if raw.status.trim().eq_ignore_ascii_case("active") {
        Status::Active
      } else {
        Status::Completed
      },
      approved: is_truthy(&raw.approved),
      description: text_or(&raw.description, DESCRIPTION_FALLBACK),
      highlight: text_or(&raw.highlight, HIGHLIGHT_FALLBACK),
      preview_description: text_or(&raw.preview_description, PREVIEW_FALLBACK),
    }
  }
}

fn is_truthy(value: &str) -> bool {
  matches!(
    value.trim().to_ascii_lowercase().as_str(),
    "true" | "yes" | "1"
  )
}

fn text_or(value: &str, fallback: &str) -> String {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    fallback.to_string()
  } else {
    trimmed.to_string()
  }
}

/// Parses place records and applies the loader-side gate: only approved
/// records with a name ever reach the map. Malformed rows are skipped with a
/// warning; one broken row in the export must not take the whole map down.
pub fn parse_places(reader: impl Read) -> Result<Vec<PlaceRecord>, DataError> {
  let mut rdr = csv::Reader::from_reader(reader);
  let mut places = Vec::new();
  let mut skipped = 0_usize;
  for record in rdr.deserialize::<RawPlace>() {
    let raw = match record {
      Ok(raw) => raw,
      Err(e) => {
        log::warn!("Skipping malformed place record: {e}");
        skipped += 1;
        continue;
      }
    };
    let place = PlaceRecord::from(raw);
    if place.approved && !place.name.is_empty() {
      places.push(place);
    } else {
      skipped += 1;
    }
  }
  if skipped > 0 {
    log::debug!("Skipped {skipped} malformed, unapproved or unnamed place records");
  }
  Ok(places)
}

pub fn load_places(path: &Path) -> Result<Vec<PlaceRecord>, DataError> {
  parse_places(std::fs::File::open(path)?)
}
