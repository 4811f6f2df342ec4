//! Serving-URL cache.
//!
//! Asking the image service for a serving URL is a network round trip, and
//! the answer for a given stored file never changes. This module remembers
//! the answer per attachment so each attachment costs at most one lookup.
//!
//! # Design
//!
//! Entries are keyed by attachment id and record the file reference they
//! were obtained for. A lookup only hits when the attachment still points at
//! the same file; replacing the file behind an attachment therefore misses
//! and fetches a fresh URL. Failed lookups are never recorded, so a service
//! outage does not get frozen into the cache.
//!
//! ## Storage
//!
//! The cache is a JSON file at `<state_dir>/.serving-url-cache.json`. It
//! carries a format version; a missing, unreadable, or stale-version file
//! loads as an empty cache and is rebuilt from the service on demand.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache file within the state directory.
const CACHE_FILENAME: &str = ".serving-url-cache.json";

/// Version of the cache format. Bump this to invalidate all existing caches
/// when the format changes.
const CACHE_VERSION: u32 = 1;

/// A serving URL and the file reference it was obtained for.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CachedServingUrl {
    pub url: String,
    pub file: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ServingUrlCache {
    pub version: u32,
    pub entries: BTreeMap<u64, CachedServingUrl>,
}

impl ServingUrlCache {
    pub fn empty() -> Self {
        Self {
            version: CACHE_VERSION,
            entries: BTreeMap::new(),
        }
    }

    /// Load from the state directory. Returns an empty cache if the file
    /// doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(state_dir: &Path) -> Self {
        let content = match std::fs::read_to_string(cache_path(state_dir)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let cache: Self = match serde_json::from_str(&content) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        if cache.version != CACHE_VERSION {
            return Self::empty();
        }
        cache
    }

    pub fn save(&self, state_dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(state_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(cache_path(state_dir), json)
    }

    /// Cached URL for an attachment, provided it was obtained for `file`.
    pub fn get(&self, id: u64, file: &str) -> Option<&str> {
        self.entries
            .get(&id)
            .filter(|entry| entry.file == file)
            .map(|entry| entry.url.as_str())
    }

    pub fn insert(&mut self, id: u64, file: impl Into<String>, url: impl Into<String>) {
        self.entries.insert(
            id,
            CachedServingUrl {
                url: url.into(),
                file: file.into(),
            },
        );
    }

    /// Forget an attachment. Returns whether an entry existed.
    pub fn remove(&mut self, id: u64) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ServingUrlCache {
    fn default() -> Self {
        Self::empty()
    }
}

/// Lookup counters for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} fetched ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} fetched", self.misses)
        }
    }
}

/// Resolve the cache file path for a state directory.
pub fn cache_path(state_dir: &Path) -> PathBuf {
    state_dir.join(CACHE_FILENAME)
}
