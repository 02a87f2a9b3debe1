use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::DataError;

/// A partner organization, passed through to the overlay untouched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Partner {
  #[serde(rename = "Partner Name")]
  pub name: String,
  #[serde(rename = "Partner Link", default)]
  pub link: String,
}

pub fn parse_partners(reader: impl Read) -> Result<Vec<Partner>, DataError> {
  let mut rdr = csv::Reader::from_reader(reader);
  let mut partners = Vec::new();
  for record in rdr.deserialize::<Partner>() {
    let partner = record?;
    if !partner.name.trim().is_empty() {
      partners.push(partner);
    }
  }
  Ok(partners)
}

pub fn load_partners(path: &Path) -> Result<Vec<Partner>, DataError> {
  parse_partners(std::fs::File::open(path)?)
}
