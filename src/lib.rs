//! Geomarker: turns a list of places into a renderable map model.
//!
//! Places are given as explicit coordinates or free-text addresses.
//! Addresses are geocoded through a cache and a throttle; every
//! coordinate is range-checked before it becomes a [`Marker`]; the
//! viewport is centred on the bounding box of the markers unless the
//! caller pins a center.
//!
//! ```no_run
//! use geomarker::{CoordinateResolver, LocationQuery, MarkerSet, ViewportCalculator};
//! use geomarker::location::RemoteHttpBackend;
//!
//! let resolver = CoordinateResolver::with_backend(RemoteHttpBackend::new());
//! let mut markers = MarkerSet::new();
//! markers.add_from_query(&resolver, &LocationQuery::place("Paris"));
//! markers.add_from_query(&resolver, &LocationQuery::coordinates(52.52, 13.405));
//! let viewport = ViewportCalculator::default().compute(&markers, None)?;
//! println!("{} at zoom {}", viewport.center, viewport.zoom);
//! # Ok::<(), geomarker::Error>(())
//! ```

pub mod config;
pub mod coords;
pub mod error;
pub mod location;
pub mod markers;
pub mod model;
pub mod viewport;

pub use config::{CacheKind, Config, MapConfig, ResolverConfig};
pub use coords::{Coordinate, Degrees};
pub use error::{Error, Result};
pub use location::{CoordinateResolver, GeocodeBackend, LocationQuery, PlaceEntry};
pub use markers::{Marker, MarkerSet, ResolutionFailure};
pub use model::MapModel;
pub use viewport::{BoundingBox, Viewport, ViewportCalculator, Zoom};
