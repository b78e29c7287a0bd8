//! Core types for the location subsystem.

use crate::coords::{self, Coordinate, Degrees};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use url::Url;

/// What a caller wants placed on the map.
///
/// Explicit coordinates always win over free text; their label is only
/// a caption and is never geocoded.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates {
        lat: Degrees,
        lon: Degrees,
        label: Option<String>,
    },
    Place {
        label: String,
    },
}

impl LocationQuery {
    pub fn coordinates(lat: impl Into<Degrees>, lon: impl Into<Degrees>) -> Self {
        Self::Coordinates {
            lat: lat.into(),
            lon: lon.into(),
            label: None,
        }
    }

    pub fn place(label: impl Into<String>) -> Self {
        Self::Place {
            label: label.into(),
        }
    }

    /// Build a coordinate query from an ordered `[lat, lon]` sequence.
    ///
    /// Any other arity is a malformed call, not a resolution failure.
    pub fn from_pair(values: &[Degrees], label: Option<String>) -> Result<Self> {
        match values {
            [lat, lon] => Ok(Self::Coordinates {
                lat: lat.clone(),
                lon: lon.clone(),
                label,
            }),
            _ => Err(Error::MalformedQuery(format!(
                "coordinates must be a [lat, lon] pair, got {} value(s)",
                values.len()
            ))),
        }
    }

    /// Attach a caption to a coordinate query.
    ///
    /// A place query's text is what gets geocoded, so it is left as is;
    /// give the entry a caption with [`PlaceEntry::with_caption`] instead.
    pub fn with_caption(self, caption: impl Into<String>) -> Self {
        match self {
            Self::Coordinates { lat, lon, .. } => Self::Coordinates {
                lat,
                lon,
                label: Some(caption.into()),
            },
            place @ Self::Place { .. } => place,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Coordinates { label, .. } => label.as_deref(),
            Self::Place { label } => Some(label),
        }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coordinates { lat, lon, .. } => write!(f, "({}, {})", lat, lon),
            Self::Place { label } => write!(f, "'{}'", label),
        }
    }
}

/// One input record for the map: a query plus marker decoration.
///
/// JSON forms:
/// `{"coordinates": [lat, lon], "label": "..", "icon": ".."}` or
/// `{"address": "..", "label": "..", "icon": ".."}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawPlaceEntry")]
pub struct PlaceEntry {
    pub query: LocationQuery,
    /// Popup text; defaults to the query's own label.
    pub caption: Option<String>,
    pub icon: Option<Url>,
}

#[derive(Deserialize)]
struct RawPlaceEntry {
    #[serde(default)]
    coordinates: Option<Vec<Degrees>>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    icon: Option<Url>,
}

impl TryFrom<RawPlaceEntry> for PlaceEntry {
    type Error = Error;

    fn try_from(raw: RawPlaceEntry) -> Result<Self> {
        let query = match (raw.coordinates, raw.address) {
            (Some(values), _) => LocationQuery::from_pair(&values, raw.label.clone())?,
            (None, Some(address)) => LocationQuery::place(address),
            (None, None) => {
                return Err(Error::MalformedQuery(
                    "entry needs either 'coordinates' or 'address'".into(),
                ))
            }
        };
        Ok(Self {
            query,
            caption: raw.label,
            icon: raw.icon,
        })
    }
}

impl PlaceEntry {
    pub fn new(query: LocationQuery) -> Self {
        Self {
            query,
            caption: None,
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: Url) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref().or_else(|| self.query.label())
    }
}

/// Anything exposing `latitude()`/`longitude()` accessors.
pub trait Located {
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;
}

impl Located for Coordinate {
    fn latitude(&self) -> f64 {
        self.lat()
    }

    fn longitude(&self) -> f64 {
        self.lon()
    }
}

/// The result shapes a pluggable geocoder may hand back.
///
/// Deserializes from JSON in the order listed, so a document is
/// matched against the nested shape first.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GeocodeResult {
    /// `{"geometry": {"location": {"lat": .., "lng": ..}}}`
    Geometry { geometry: Geometry },
    /// `{"lat": .., "lon": ..}`
    LatLon { lat: Degrees, lon: Degrees },
    /// An object with `latitude`/`longitude`.
    Point { latitude: Degrees, longitude: Degrees },
    /// A raw `[lat, lon]` sequence.
    Pair(Vec<Degrees>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LatLng {
    pub lat: Degrees,
    pub lng: Degrees,
}

impl GeocodeResult {
    pub fn from_located<L: Located + ?Sized>(located: &L) -> Self {
        Self::Point {
            latitude: located.latitude().into(),
            longitude: located.longitude().into(),
        }
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| {
            Error::UnresolvableLocation(format!("unrecognised geocoder result: {}", e))
        })
    }

    /// Normalize into a validated [`Coordinate`].
    pub fn into_coordinate(self) -> Result<Coordinate> {
        let (lat, lon) = match self {
            Self::Geometry { geometry } => (geometry.location.lat, geometry.location.lng),
            Self::LatLon { lat, lon } => (lat, lon),
            Self::Point {
                latitude,
                longitude,
            } => (latitude, longitude),
            Self::Pair(values) => match <[Degrees; 2]>::try_from(values) {
                Ok([lat, lon]) => (lat, lon),
                Err(values) => {
                    return Err(Error::UnresolvableLocation(format!(
                        "expected a (lat, lon) pair, got {} value(s)",
                        values.len()
                    )))
                }
            },
        };
        coords::check(&lat, &lon)
    }
}
