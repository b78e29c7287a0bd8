//! Geographic coordinates and their validation.
//!
//! A [`Coordinate`] is only ever built through [`check`] or
//! [`Coordinate::new`], so every instance handed out by this crate
//! is finite and within range.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

pub const LAT_MIN: f64 = -90.0;
pub const LAT_MAX: f64 = 90.0;
pub const LON_MIN: f64 = -180.0;
pub const LON_MAX: f64 = 180.0;

/// Optional sign, digits with an optional fraction, or a bare fraction.
/// No exponent, no `inf`/`NaN`, no surrounding whitespace.
static SIGNED_DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)$").expect("signed decimal pattern")
});

/// A coordinate component as supplied by a caller or a geocoder:
/// either a number or its textual form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Degrees {
    Number(f64),
    Text(String),
}

impl Degrees {
    /// Numeric value, enforcing the signed-decimal grammar for text.
    pub fn to_f64(&self) -> Result<f64> {
        match self {
            Self::Number(v) if v.is_finite() => Ok(*v),
            Self::Number(v) => Err(Error::InvalidCoordinateFormat(v.to_string())),
            Self::Text(s) => parse_degrees(s),
        }
    }
}

impl From<f64> for Degrees {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for Degrees {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{}", v),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Parse a degree value; the whole string must be a signed decimal.
pub fn parse_degrees(s: &str) -> Result<f64> {
    if !SIGNED_DECIMAL.is_match(s) {
        return Err(Error::InvalidCoordinateFormat(s.to_string()));
    }
    s.parse::<f64>()
        .map_err(|_| Error::InvalidCoordinateFormat(s.to_string()))
}

pub fn in_range(lat: f64, lon: f64) -> bool {
    (LAT_MIN..=LAT_MAX).contains(&lat) && (LON_MIN..=LON_MAX).contains(&lon)
}

/// Check a latitude/longitude pair and build a [`Coordinate`] from it.
///
/// Format problems are reported before range problems.
pub fn check(lat: &Degrees, lon: &Degrees) -> Result<Coordinate> {
    let lat = lat.to_f64()?;
    let lon = lon.to_f64()?;
    Coordinate::new(lat, lon)
}

/// Pure accept/reject form of [`check`].
pub fn validate(lat: &Degrees, lon: &Degrees) -> bool {
    check(lat, lon).is_ok()
}

/// A validated WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = Error;

    fn try_from(raw: RawCoordinate) -> Result<Self> {
        Self::new(raw.lat, raw.lon)
    }
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if lat.is_nan() || lon.is_nan() {
            return Err(Error::InvalidCoordinateFormat(format!("{}, {}", lat, lon)));
        }
        if !in_range(lat, lon) {
            return Err(Error::InvalidCoordinateRange { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    // Componentwise combinations of two in-range values stay in range.

    pub fn min(self, other: Self) -> Self {
        Self {
            lat: self.lat.min(other.lat),
            lon: self.lon.min(other.lon),
        }
    }

    pub fn max(self, other: Self) -> Self {
        Self {
            lat: self.lat.max(other.lat),
            lon: self.lon.max(other.lon),
        }
    }

    pub fn midpoint(self, other: Self) -> Self {
        Self {
            lat: (self.lat + other.lat) / 2.0,
            lon: (self.lon + other.lon) / 2.0,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.lat >= 0.0 { 'N' } else { 'S' };
        let ew = if self.lon >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.4}\u{00B0} {}, {:.4}\u{00B0} {}",
            self.lat.abs(),
            ns,
            self.lon.abs(),
            ew
        )
    }
}
