//! Location resolution subsystem.
//!
//! Turns place queries into validated coordinates: explicit coordinates
//! are checked in place, free text goes through a TTL cache, a
//! minimum-interval throttle and a pluggable geocoding backend.

pub mod cache;
pub mod providers;
pub mod rate_limit;
pub mod resolver;
pub mod types;

pub use cache::{FileCache, MemoryCache, NoopCache, ResponseCache};
pub use providers::{
    GeocodeBackend, Geocoder, GeocoderError, PluggableGeocoderBackend, RemoteHttpBackend,
};
pub use rate_limit::RateLimiter;
pub use resolver::CoordinateResolver;
pub use types::{GeocodeResult, LocationQuery, Located, PlaceEntry};
