//! Geocoding response cache.
//!
//! Keys are the namespaced, whitespace-collapsed query text (case is
//! preserved). Expiry is time-based and lazy: a stale entry reads as
//! absent and is dropped by that read. No size-based eviction.

use crate::coords::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub const KEY_NAMESPACE: &str = "geomarker:geocode:";
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 3600);

/// Trim and collapse internal whitespace runs to single spaces.
pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cache key for a free-text query.
pub fn cache_key(query: &str) -> String {
    format!("{}{}", KEY_NAMESPACE, normalize_query(query))
}

/// Any store that can hold resolved coordinates with expiry.
///
/// Implementations must tolerate concurrent `get`/`put`; on duplicate
/// keys the last writer wins.
pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Coordinate>;
    fn put(&self, key: &str, coordinate: Coordinate);
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct CacheEntry {
    coordinate: Coordinate,
    inserted_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            inserted_at: Utc::now(),
        }
    }

    fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        // Entries stamped in the future (clock skew) count as fresh.
        now.signed_duration_since(self.inserted_at)
            .to_std()
            .map(|age| age > ttl)
            .unwrap_or(false)
    }
}

type Entries = HashMap<String, CacheEntry>;

fn lock(entries: &Mutex<Entries>) -> MutexGuard<'_, Entries> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Read `key`, dropping it if it has outlived `ttl`.
fn lookup(entries: &mut Entries, key: &str, ttl: Duration) -> Option<Coordinate> {
    let entry = entries.get(key)?;
    if entry.is_expired(ttl, Utc::now()) {
        log::debug!("Cache entry expired: {}", key);
        entries.remove(key);
        return None;
    }
    Some(entry.coordinate)
}

// ─── In-memory cache ────────────────────────────────────────────

/// The default cache: a TTL map guarded by a mutex.
pub struct MemoryCache {
    ttl: Duration,
    entries: Mutex<Entries>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored entries, stale ones included until read.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResponseCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Coordinate> {
        lookup(&mut lock(&self.entries), key, self.ttl)
    }

    fn put(&self, key: &str, coordinate: Coordinate) {
        lock(&self.entries).insert(key.to_string(), CacheEntry::new(coordinate));
    }
}

// ─── File-backed cache ──────────────────────────────────────────

/// A JSON file cache, by default at `<user cache dir>/geomarker/geocode.json`.
///
/// Loaded once; rewritten on every `put`. A missing or unreadable file
/// starts an empty cache.
pub struct FileCache {
    path: PathBuf,
    ttl: Duration,
    entries: Mutex<Entries>,
}

impl FileCache {
    pub fn load(ttl: Duration) -> Self {
        Self::load_from(Self::default_path(), ttl)
    }

    pub fn load_from(path: PathBuf, ttl: Duration) -> Self {
        let now = Utc::now();
        let mut entries = Self::read_file(&path).unwrap_or_default();
        entries.retain(|_, e| !e.is_expired(ttl, now));
        log::debug!("Loaded {} cache entries from {}", entries.len(), path.display());
        Self {
            path,
            ttl,
            entries: Mutex::new(entries),
        }
    }

    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("geomarker")
            .join("geocode.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_file(path: &Path) -> Option<Entries> {
        let data = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&data) {
            Ok(entries) => Some(entries),
            Err(e) => {
                log::warn!("Ignoring unreadable cache file {}: {}", path.display(), e);
                None
            }
        }
    }

    fn persist(&self, entries: &Entries) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Could not create cache directory {}: {}", parent.display(), e);
                return;
            }
        }
        let written = serde_json::to_string_pretty(entries)
            .map_err(|e| e.to_string())
            .and_then(|json| fs::write(&self.path, json).map_err(|e| e.to_string()));
        if let Err(e) = written {
            log::warn!("Could not write cache file {}: {}", self.path.display(), e);
        }
    }
}

impl ResponseCache for FileCache {
    fn get(&self, key: &str) -> Option<Coordinate> {
        lookup(&mut lock(&self.entries), key, self.ttl)
    }

    fn put(&self, key: &str, coordinate: Coordinate) {
        let mut entries = lock(&self.entries);
        entries.insert(key.to_string(), CacheEntry::new(coordinate));
        self.persist(&entries);
    }
}

// ─── No-op cache ────────────────────────────────────────────────

/// A cache that never hits.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl ResponseCache for NoopCache {
    fn get(&self, _key: &str) -> Option<Coordinate> {
        None
    }

    fn put(&self, _key: &str, _coordinate: Coordinate) {}
}
