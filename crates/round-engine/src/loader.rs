//! Country dataset loading

use crate::{Country, GameError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Supplier of the full country list, read once at startup
pub trait CountrySource {
    /// Human-readable origin for logs and error messages
    fn describe(&self) -> String;

    fn load_countries(&self) -> Result<Vec<Country>>;
}

/// JSON array of `{name, continent, lat, lon}` records on disk
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CountrySource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load_countries(&self) -> Result<Vec<Country>> {
        load_countries(&self.path)
    }
}

/// Dataset already in memory
#[derive(Debug, Clone, Default)]
pub struct StaticSource(pub Vec<Country>);

impl CountrySource for StaticSource {
    fn describe(&self) -> String {
        format!("{} built-in countries", self.0.len())
    }

    fn load_countries(&self) -> Result<Vec<Country>> {
        if self.0.is_empty() {
            return Err(GameError::NoCountries);
        }
        Ok(self.0.clone())
    }
}

fn is_valid_latitude(lat: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && lat.is_finite()
}

fn is_valid_longitude(lon: f64) -> bool {
    (-180.0..=180.0).contains(&lon) && lon.is_finite()
}

/// Raw record; every field optional so one bad row does not sink the file
#[derive(Debug, Deserialize)]
struct RawCountry {
    name: Option<String>,
    continent: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Load countries from a JSON file
pub fn load_countries(path: impl AsRef<Path>) -> Result<Vec<Country>> {
    let path = path.as_ref();
    info!("Loading countries from {:?}", path);

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let raw: Vec<RawCountry> = serde_json::from_reader(reader)?;

    validate(raw)
}

/// Parse countries from a JSON string
pub fn parse_countries(json: &str) -> Result<Vec<Country>> {
    let raw: Vec<RawCountry> = serde_json::from_str(json)?;
    validate(raw)
}

fn validate(raw: Vec<RawCountry>) -> Result<Vec<Country>> {
    let mut countries = Vec::with_capacity(raw.len());
    let mut names = HashSet::new();
    let mut skipped = 0;

    for (i, record) in raw.into_iter().enumerate() {
        let name = record.name.as_deref().map(str::trim).unwrap_or_default();
        let continent = record.continent.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() || continent.is_empty() {
            warn!("Skipping record {}: missing name or continent", i);
            skipped += 1;
            continue;
        }

        let (lat, lon) = match (record.lat, record.lon) {
            (Some(lat), Some(lon)) if is_valid_latitude(lat) && is_valid_longitude(lon) => {
                (lat, lon)
            }
            _ => {
                warn!("Skipping {}: missing or out-of-range coordinates", name);
                skipped += 1;
                continue;
            }
        };

        if !names.insert(name.to_string()) {
            warn!("Skipping duplicate country {}", name);
            skipped += 1;
            continue;
        }

        countries.push(Country::new(name, continent, lat, lon));
    }

    info!(
        "Loaded {} countries ({} skipped)",
        countries.len(),
        skipped
    );

    if countries.is_empty() {
        return Err(GameError::NoCountries);
    }

    Ok(countries)
}
