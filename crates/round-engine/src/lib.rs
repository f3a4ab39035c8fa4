//! Country Guess Round Engine
//!
//! Picks a hidden target country from a region-filtered pool and grades
//! guesses against it with great-circle hints.
//!
//! # Round Lifecycle
//!
//! ```text
//! CountrySource ──load──▶ [Country] ──start_round(region)──▶ Pool + Target
//!                                                              │
//!                             guess name ──evaluate──▶ GuessResult
//! ```
//!
//! | Hint        | Source                                   |
//! |-------------|------------------------------------------|
//! | Continent   | guess.continent == target.continent      |
//! | Distance    | haversine, whole km                      |
//! | Direction   | initial bearing guess → target, 8 points |
//!
//! The engine owns no history. [`session::GameSession`] is the adapter that
//! front-ends drive; it keeps the guess history and input policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod engine;
pub mod loader;
pub mod session;

pub use engine::RoundEngine;
pub use geo_math::{Compass, Point};
pub use loader::{CountrySource, JsonFileSource, StaticSource};
pub use session::{GameSession, GuessEntry};

/// Region selector value meaning "no continent filter"
pub const WORLD: &str = "World";

/// Fixed set offered by the region selector
pub const REGIONS: [&str; 7] = [
    WORLD,
    "Africa",
    "Asia",
    "Europe",
    "North America",
    "South America",
    "Oceania",
];

#[derive(Error, Debug)]
pub enum GameError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No valid countries in dataset")]
    NoCountries,
    #[error("No countries in region {0}")]
    EmptyPool(Region),
    #[error("No round in progress")]
    NoActiveRound,
    #[error("Invalid region: {0:?}")]
    InvalidRegion(String),
}

impl GameError {
    /// True when the dataset could not be loaded and no game can start
    pub fn is_initialization_failure(&self) -> bool {
        matches!(
            self,
            GameError::Io(_) | GameError::Json(_) | GameError::NoCountries
        )
    }
}

pub type Result<T> = std::result::Result<T, GameError>;

/// A guessable country
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Country {
    pub name: String,
    pub continent: String,
    pub lat: f64,
    pub lon: f64,
}

impl Country {
    pub fn new(name: impl Into<String>, continent: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            continent: continent.into(),
            lat,
            lon,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.lat, self.lon)
    }
}

/// Pool filter chosen by the player
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Region {
    #[default]
    World,
    Continent(String),
}

impl Region {
    /// Whether a country belongs to this region's pool
    pub fn matches(&self, country: &Country) -> bool {
        match self {
            Region::World => true,
            Region::Continent(name) => country.continent == *name,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::World => f.write_str(WORLD),
            Region::Continent(name) => f.write_str(name),
        }
    }
}

impl FromStr for Region {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(GameError::InvalidRegion(s.to_string()));
        }
        if s == WORLD {
            Ok(Region::World)
        } else {
            Ok(Region::Continent(s.to_string()))
        }
    }
}

impl TryFrom<String> for Region {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.to_string()
    }
}

/// Outcome of grading one guess
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuessResult {
    Correct {
        name: String,
    },
    Incomplete {
        /// The guessed country
        name: String,
        continent_match: bool,
        distance_km: u32,
        /// Points from the guess toward the target
        direction: Compass,
    },
}

impl GuessResult {
    pub fn is_correct(&self) -> bool {
        matches!(self, GuessResult::Correct { .. })
    }
}
