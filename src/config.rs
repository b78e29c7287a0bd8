//! Resolver and map configuration, read from a TOML file.
//!
//! ```toml
//! [resolver]
//! endpoint = "https://nominatim.openstreetmap.org/search"
//! cache = "file"
//! cache-ttl = "24h"
//! min-interval = "1s"
//! timeout = "10s"
//!
//! [map]
//! zoom = 12
//! center = [48.85, 2.35]
//! ```
//!
//! Every key is optional; a missing file means all defaults.

use crate::coords::Coordinate;
use crate::error::{Error, Result};
use crate::location::cache::{self, FileCache, MemoryCache, NoopCache, ResponseCache};
use crate::location::providers;
use crate::viewport::{Zoom, DEFAULT_ZOOM};
use duration_str::deserialize_duration;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub resolver: ResolverConfig,
    pub map: MapConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheKind {
    Memory,
    File,
    None,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ResolverConfig {
    pub endpoint: String,
    #[serde(deserialize_with = "deserialize_duration")]
    pub cache_ttl: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub min_interval: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    pub cache: CacheKind,
    pub cache_file: Option<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            endpoint: providers::DEFAULT_ENDPOINT.to_string(),
            cache_ttl: cache::DEFAULT_TTL,
            min_interval: Duration::ZERO,
            timeout: providers::DEFAULT_TIMEOUT,
            cache: CacheKind::Memory,
            cache_file: None,
        }
    }
}

impl ResolverConfig {
    pub fn build_cache(&self) -> Arc<dyn ResponseCache> {
        match self.cache {
            CacheKind::Memory => Arc::new(MemoryCache::new(self.cache_ttl)),
            CacheKind::File => match &self.cache_file {
                Some(path) => Arc::new(FileCache::load_from(path.clone(), self.cache_ttl)),
                None => Arc::new(FileCache::load(self.cache_ttl)),
            },
            CacheKind::None => Arc::new(NoopCache),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MapConfig {
    pub zoom: u32,
    /// `[lat, lon]`; overrides the derived center.
    pub center: Option<[f64; 2]>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            center: None,
        }
    }
}

impl MapConfig {
    pub fn zoom(&self) -> Zoom {
        Zoom::new(self.zoom)
    }

    pub fn explicit_center(&self) -> Result<Option<Coordinate>> {
        self.center
            .map(|[lat, lon]| Coordinate::new(lat, lon))
            .transpose()
            .map_err(|e| Error::Config(format!("map.center: {}", e)))
    }
}

impl Config {
    /// Load from `path`; `None` or a missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            log::info!("No configuration file specified, using defaults");
            return Ok(Self::default());
        };
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("{} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(Error::Config(format!("{}: {}", path.display(), e))),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        cfg.map.explicit_center()?;
        Ok(cfg)
    }
}
