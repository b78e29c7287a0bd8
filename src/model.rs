//! The finished map model handed to a renderer.
//!
//! A renderer consumes two fragments: the ordered markers and the
//! viewport. Bounds and skipped entries ride along for diagnostics.

use crate::config::MapConfig;
use crate::error::Result;
use crate::location::{CoordinateResolver, PlaceEntry};
use crate::markers::{Marker, MarkerSet, ResolutionFailure};
use crate::viewport::{BoundingBox, Viewport, ViewportCalculator};
use serde::Serialize;
use std::thread;

#[derive(Debug, Clone, Serialize)]
pub struct MapModel {
    pub markers: Vec<Marker>,
    pub viewport: Viewport,
    pub bounds: BoundingBox,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ResolutionFailure>,
}

impl MapModel {
    /// Resolve every entry in order and derive the viewport.
    ///
    /// Unresolvable entries are skipped; if none remain the build fails
    /// with `NoMarkersToRender`.
    pub fn build(entries: &[PlaceEntry], resolver: &CoordinateResolver, map: &MapConfig) -> Result<Self> {
        let mut set = MarkerSet::new();
        for entry in entries {
            set.add_entry(resolver, entry);
        }
        Self::from_marker_set(set, map)
    }

    /// Like [`MapModel::build`], resolving on up to `workers` threads
    /// that share `resolver`. Marker order still follows `entries`.
    pub fn build_concurrent(
        entries: &[PlaceEntry],
        resolver: &CoordinateResolver,
        map: &MapConfig,
        workers: usize,
    ) -> Result<Self> {
        let workers = workers.clamp(1, entries.len().max(1));
        let chunk_size = entries.len().div_ceil(workers).max(1);

        let outcomes: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = entries
                .chunks(chunk_size)
                .map(|chunk| {
                    s.spawn(move || {
                        chunk
                            .iter()
                            .map(|entry| resolver.resolve(&entry.query))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| match h.join() {
                    Ok(results) => results,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });

        let mut set = MarkerSet::new();
        for (entry, outcome) in entries.iter().zip(outcomes) {
            set.record(entry, outcome);
        }
        Self::from_marker_set(set, map)
    }

    pub fn from_marker_set(set: MarkerSet, map: &MapConfig) -> Result<Self> {
        let calculator = ViewportCalculator::new(map.zoom());
        let viewport = calculator.compute(&set, map.explicit_center()?)?;
        let bounds = set.bounds().ok_or(crate::Error::NoMarkersToRender)?;
        let (markers, failures) = set.into_parts();
        if !failures.is_empty() {
            log::warn!(
                "{} of {} entries could not be placed",
                failures.len(),
                failures.len() + markers.len()
            );
        }
        Ok(Self {
            markers,
            viewport,
            bounds,
            failures,
        })
    }

    pub fn markers_fragment(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(&self.markers)
    }

    pub fn viewport_fragment(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self.viewport)
    }
}
