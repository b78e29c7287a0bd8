//! Bounding box, zoom level and viewport derivation for a marker set.
//!
//! The bounding box is the tightest axis-aligned rectangle in plain
//! lat/lon. Sets that straddle the antimeridian get a box spanning the
//! long way round; that is a known limitation, not something corrected
//! here.

use crate::coords::Coordinate;
use crate::error::{Error, Result};
use crate::markers::MarkerSet;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_ZOOM: u32 = 13;

/// A non-negative integer zoom level.
///
/// Conversions reject negative and fractional input; nothing is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Zoom(u32);

impl Zoom {
    pub const fn new(level: u32) -> Self {
        Self(level)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self(DEFAULT_ZOOM)
    }
}

impl fmt::Display for Zoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Zoom {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        u32::try_from(value)
            .map(Self)
            .map_err(|_| Error::InvalidZoomValue(value.to_string()))
    }
}

impl TryFrom<i32> for Zoom {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        Self::try_from(i64::from(value))
    }
}

impl TryFrom<f64> for Zoom {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        if !value.is_finite() || value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
            return Err(Error::InvalidZoomValue(value.to_string()));
        }
        Ok(Self(value as u32))
    }
}

impl FromStr for Zoom {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidZoomValue(s.to_string()))?;
        Self::try_from(value)
    }
}

/// The tightest axis-aligned rectangle around a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl BoundingBox {
    /// `None` for an empty input.
    pub fn covering<I>(coordinates: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let mut iter = coordinates.into_iter();
        let first = iter.next()?;
        let (south_west, north_east) =
            iter.fold((first, first), |(sw, ne), c| (sw.min(c), ne.max(c)));
        Some(Self {
            south_west,
            north_east,
        })
    }

    pub fn center(&self) -> Coordinate {
        self.south_west.midpoint(self.north_east)
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        (self.south_west.lat()..=self.north_east.lat()).contains(&c.lat())
            && (self.south_west.lon()..=self.north_east.lon()).contains(&c.lon())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: Zoom,
}

/// Derives the viewport from a marker set and the caller's zoom setting.
#[derive(Debug, Clone, Default)]
pub struct ViewportCalculator {
    zoom: Zoom,
}

impl ViewportCalculator {
    pub fn new(zoom: Zoom) -> Self {
        Self { zoom }
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    /// Set the zoom level, rejecting negative or fractional values.
    pub fn set_zoom<Z>(&mut self, zoom: Z) -> Result<()>
    where
        Z: TryInto<Zoom, Error = Error>,
    {
        self.zoom = zoom.try_into()?;
        Ok(())
    }

    /// An explicit center wins unconditionally; otherwise the bounding
    /// box midpoint is used. Zoom is always the configured level.
    pub fn compute(&self, markers: &MarkerSet, explicit_center: Option<Coordinate>) -> Result<Viewport> {
        let bounds = markers.bounds().ok_or(Error::NoMarkersToRender)?;
        let center = explicit_center.unwrap_or_else(|| bounds.center());
        Ok(Viewport {
            center,
            zoom: self.zoom,
        })
    }
}
