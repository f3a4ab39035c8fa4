//! Geo Math Library
//!
//! Spherical-earth helpers used to grade guesses: great-circle distance,
//! initial bearing and the 8-point compass rose.
//!
//! # Formulas
//!
//! ```text
//! a = sin²(Δφ/2) + cos φ₁ · cos φ₂ · sin²(Δλ/2)
//! d = 2R · asin(√a)                                  R = 6371 km
//!
//! θ = atan2(sin Δλ · cos φ₂, cos φ₁ · sin φ₂ − sin φ₁ · cos φ₂ · cos Δλ)
//! ```
//!
//! All inputs are degrees. Coordinates are assumed validated (finite, in
//! range) before they reach this crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean earth radius in km
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Width of one compass sector in degrees
pub const SECTOR_DEG: f64 = 45.0;

/// A position on the sphere in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// 8-point compass rose, clockwise from north
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compass {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Compass {
    /// Sectors in index order (0 = N, clockwise)
    pub const ALL: [Compass; 8] = [
        Compass::N,
        Compass::NE,
        Compass::E,
        Compass::SE,
        Compass::S,
        Compass::SW,
        Compass::W,
        Compass::NW,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Compass::N => "N",
            Compass::NE => "NE",
            Compass::E => "E",
            Compass::SE => "SE",
            Compass::S => "S",
            Compass::SW => "SW",
            Compass::W => "W",
            Compass::NW => "NW",
        }
    }
}

impl fmt::Display for Compass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Haversine distance between two points, rounded to whole km
///
/// Symmetric in its arguments and zero for identical points.
pub fn distance_km(a: Point, b: Point) -> u32 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    // Clamp: float noise can push antipodal pairs just past 1.0
    let h = ((d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);

    (2.0 * EARTH_RADIUS_KM * h.sqrt().asin()).round() as u32
}

/// Initial great-circle bearing from `from` toward `to`, in [0, 360)
pub fn bearing_degrees(from: Point, to: Point) -> f64 {
    let d_lon = (to.lon - from.lon).to_radians();
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Snap a bearing to the nearest compass sector
///
/// Halves round up, so 22.5° is NE and 337.5° wraps to N.
pub fn to_compass(bearing: f64) -> Compass {
    let index = (bearing / SECTOR_DEG).round() as i64;
    Compass::ALL[index.rem_euclid(8) as usize]
}

/// Compass direction from `from` toward `to`
pub fn direction(from: Point, to: Point) -> Compass {
    to_compass(bearing_degrees(from, to))
}


// ============================================================================
// Property-based Tests
// ============================================================================
