// Explicit cache of loaded maps.
//
// `MapCache` parses each map text once and hands out `Snapshot` clones
// (an `Arc` bump) on every later request for the same key. It is an ordinary
// value owned by whoever needs it (tests, the `warren-path` binary); there is
// no process-wide cache.
//
// File maps are keyed by their path as given; `load_str()` takes an explicit
// key. Every map in a cache is built with the cache's `NavConfig`.

use crate::config::NavConfig;
use crate::error::MapError;
use crate::map_text::parse_map;
use crate::snapshot::Snapshot;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Parsed maps keyed by name, all built with one config.
#[derive(Debug, Default)]
pub struct MapCache {
    config: NavConfig,
    maps: BTreeMap<String, Snapshot>,
}

impl MapCache {
    pub fn new(config: NavConfig) -> Self {
        Self {
            config,
            maps: BTreeMap::new(),
        }
    }

    /// Snapshot of the map file at `path`, reading and parsing it on first
    /// use.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<Snapshot, MapError> {
        let path = path.as_ref();
        let key = path.to_string_lossy().into_owned();
        if let Some(snapshot) = self.maps.get(&key) {
            return Ok(snapshot.clone());
        }
        let text = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.insert_parsed(key, &text)
    }

    /// Snapshot of `text` stored under `key`, parsing it on first use. A
    /// later call with the same key returns the cached map and ignores
    /// `text`.
    pub fn load_str(&mut self, key: &str, text: &str) -> Result<Snapshot, MapError> {
        if let Some(snapshot) = self.maps.get(key) {
            return Ok(snapshot.clone());
        }
        self.insert_parsed(key.to_owned(), text)
    }

    fn insert_parsed(&mut self, key: String, text: &str) -> Result<Snapshot, MapError> {
        let layout = parse_map(text, &self.config)?;
        let snapshot = Snapshot::from_layout(&layout, &self.config);
        let domain = snapshot.domain();
        debug!(
            map = %key,
            rows = domain.rows,
            cols = domain.cols,
            layers = domain.layers,
            doors = snapshot.get_doors().len(),
            "loaded map"
        );
        self.maps.insert(key, snapshot.clone());
        Ok(snapshot)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.maps.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Drop one map. Snapshots already handed out stay valid.
    pub fn evict(&mut self, key: &str) -> Option<Snapshot> {
        self.maps.remove(key)
    }

    pub fn clear(&mut self) {
        self.maps.clear();
    }
}
