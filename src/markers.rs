//! Markers and the ordered set a map is rendered from.

use crate::coords::Coordinate;
use crate::error::{Error, Result};
use crate::location::{CoordinateResolver, LocationQuery, PlaceEntry};
use crate::viewport::BoundingBox;
use serde::{Serialize, Serializer};
use url::Url;

/// A resolved, validated map marker. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    coordinate: Coordinate,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<Url>,
}

impl Marker {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            label: None,
            icon: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_icon(mut self, icon: Url) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn icon(&self) -> Option<&Url> {
        self.icon.as_ref()
    }
}

/// An entry that was skipped because it could not be resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionFailure {
    pub query: String,
    #[serde(rename = "reason", serialize_with = "serialize_display")]
    pub error: Error,
}

fn serialize_display<S: Serializer>(error: &Error, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Markers in insertion order, plus the entries that failed to resolve.
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    markers: Vec<Marker>,
    failures: Vec<ResolutionFailure>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    /// Resolve `query` and append a marker on success.
    ///
    /// Resolution failures are recorded and logged, not returned.
    pub fn add_from_query(&mut self, resolver: &CoordinateResolver, query: &LocationQuery) -> bool {
        self.add_entry(resolver, &PlaceEntry::new(query.clone()))
    }

    pub fn add_entry(&mut self, resolver: &CoordinateResolver, entry: &PlaceEntry) -> bool {
        let outcome = resolver.resolve(&entry.query);
        self.record(entry, outcome)
    }

    /// Append the outcome of an already attempted resolution.
    pub fn record(&mut self, entry: &PlaceEntry, outcome: Result<Coordinate>) -> bool {
        match outcome {
            Ok(coordinate) => {
                let mut marker = Marker::new(coordinate);
                marker.label = entry.caption().map(str::to_string);
                marker.icon = entry.icon.clone();
                self.add(marker);
                true
            }
            Err(error) => {
                log::warn!("Skipping {}: {}", entry.query, error);
                self.failures.push(ResolutionFailure {
                    query: entry.query.to_string(),
                    error,
                });
                false
            }
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn failures(&self) -> &[ResolutionFailure] {
        &self.failures
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Marker> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::covering(self.markers.iter().map(Marker::coordinate))
    }

    pub fn into_parts(self) -> (Vec<Marker>, Vec<ResolutionFailure>) {
        (self.markers, self.failures)
    }
}

impl<'a> IntoIterator for &'a MarkerSet {
    type Item = &'a Marker;
    type IntoIter = std::slice::Iter<'a, Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.iter()
    }
}
