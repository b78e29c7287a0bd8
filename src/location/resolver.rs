//! Coordinate resolver: validation, cache, throttle and backend in one pipeline.
//!
//! Coordinate flow:  Validator → done (no cache, no network)
//! Free-text flow:   empty check → cache → rate limiter → backend → cache
//!
//! Backend answers that fail validation are reported as unresolvable,
//! never as a coordinate error of the caller's.
//!
//! Failed lookups are never cached and never retried here; the caller
//! decides whether to try a query again later.

use super::cache::{self, MemoryCache, ResponseCache};
use super::providers::{self, GeocodeBackend, Geocoder, PluggableGeocoderBackend, RemoteHttpBackend};
use super::rate_limit::RateLimiter;
use super::types::LocationQuery;
use crate::config::ResolverConfig;
use crate::coords::{self, Coordinate};
use crate::error::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

/// Resolves [`LocationQuery`] values to validated coordinates.
///
/// Safe to share across threads; cache and throttle state are owned by
/// this instance, so separate resolvers never influence each other.
pub struct CoordinateResolver {
    backend: Box<dyn GeocodeBackend>,
    cache: Arc<dyn ResponseCache>,
    limiter: RateLimiter,
}

impl CoordinateResolver {
    pub fn new(
        backend: Box<dyn GeocodeBackend>,
        cache: Arc<dyn ResponseCache>,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            backend,
            cache,
            limiter,
        }
    }

    /// A resolver over `backend` with an in-memory cache and no throttle.
    pub fn with_backend<B: GeocodeBackend + 'static>(backend: B) -> Self {
        Self::new(
            Box::new(backend),
            Arc::new(MemoryCache::default()),
            RateLimiter::default(),
        )
    }

    pub fn with_geocoder<G: Geocoder + 'static>(geocoder: G) -> Self {
        Self::with_backend(PluggableGeocoderBackend::new(geocoder))
    }

    /// The public HTTP backend configured from `cfg`.
    pub fn from_config(cfg: &ResolverConfig) -> Self {
        let backend = RemoteHttpBackend::with_timeout(cfg.endpoint.clone(), cfg.timeout);
        Self::from_config_with_backend(cfg, Box::new(backend))
    }

    /// Cache and throttle from `cfg`, around a caller-supplied backend.
    pub fn from_config_with_backend(cfg: &ResolverConfig, backend: Box<dyn GeocodeBackend>) -> Self {
        Self::new(backend, cfg.build_cache(), RateLimiter::new(cfg.min_interval))
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.limiter = RateLimiter::new(min_interval);
        self
    }

    pub fn cache(&self) -> &Arc<dyn ResponseCache> {
        &self.cache
    }

    pub fn resolve(&self, query: &LocationQuery) -> Result<Coordinate> {
        match query {
            LocationQuery::Coordinates { lat, lon, .. } => coords::check(lat, lon),
            LocationQuery::Place { label } => self.resolve_text(label),
        }
    }

    /// Geocode free text through the cache.
    pub fn resolve_text(&self, label: &str) -> Result<Coordinate> {
        let text = cache::normalize_query(label);
        if text.is_empty() {
            return Err(Error::EmptyQuery);
        }

        let key = cache::cache_key(&text);
        if let Some(hit) = self.cache.get(&key) {
            log::debug!("Cache hit for '{}'", text);
            return Ok(hit);
        }
        log::debug!("Cache miss for '{}'", text);

        self.limiter.wait();
        log::info!("Geocoding '{}' via {}", text, self.backend.name());
        let coordinate = self
            .backend
            .resolve(&text)
            .map_err(|e| providers::invalid_answer(&text, e))?;

        self.cache.put(&key, coordinate);
        Ok(coordinate)
    }
}
