//! Persistence gateway.
//!
//! The canvas persists three JSON documents under namespaced keys in any
//! string key-value store. Loading never fails: missing or corrupt entries
//! fall back to defaults. Saving fully overwrites the key.

use crate::config::CanvasConfig;
use crate::constants::STORAGE_PREFIX;
use crate::types::{Edge, Node};
use crate::viewport::Viewport;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Key under which the node list is stored.
pub const NODES_KEY: &str = "nodes";
/// Key under which the edge list is stored.
pub const EDGES_KEY: &str = "edges";
/// Key under which the viewport is stored.
pub const VIEWPORT_KEY: &str = "viewport";

/// Minimal durable key-value interface backing the canvas.
pub trait KeyValueStore {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;
    /// Overwrites the value stored under `key`.
    fn set(&mut self, key: &str, value: String);
    /// Deletes `key` if present.
    fn remove(&mut self, key: &str);
}

/// Returns the namespaced form of a key, e.g. `canvas:nodes`.
pub fn storage_key(key: &str) -> String {
    format!("{STORAGE_PREFIX}{key}")
}

/// In-memory store that remembers which keys changed since the last flush.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    dirty: BTreeSet<String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a store with the canvas keys found in eframe's storage.
    ///
    /// Empty strings are treated as absent, since eframe cannot delete keys.
    pub fn from_eframe(storage: &dyn eframe::Storage) -> Self {
        let mut store = Self::new();
        for key in [NODES_KEY, EDGES_KEY, VIEWPORT_KEY] {
            let key = storage_key(key);
            if let Some(value) = storage.get_string(&key).filter(|v| !v.is_empty()) {
                store.entries.insert(key, value);
            }
        }
        store
    }

    /// Writes every key changed since the last flush into eframe's storage.
    ///
    /// # Returns
    ///
    /// The number of keys written.
    pub fn flush_to(&mut self, storage: &mut dyn eframe::Storage) -> usize {
        let dirty = std::mem::take(&mut self.dirty);
        for key in &dirty {
            let value = self.entries.get(key).cloned().unwrap_or_default();
            storage.set_string(key, value);
        }
        dirty.len()
    }

    /// Whether there are writes not yet flushed.
    pub fn has_pending_writes(&self) -> bool {
        !self.dirty.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
        self.dirty.insert(key.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.dirty.insert(key.to_string());
    }
}

/// Reads and parses a namespaced JSON entry, falling back to `default` on any failure.
fn load_or<T, S>(store: &S, key: &str, default: impl FnOnce() -> T) -> T
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let full_key = storage_key(key);
    let Some(raw) = store.get(&full_key) else {
        return default();
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("Ignoring corrupt entry {full_key}: {err}");
            default()
        }
    }
}

/// Serializes and writes a namespaced JSON entry.
fn save_entry<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), serde_json::Error>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value)?;
    store.set(&storage_key(key), json);
    Ok(())
}

/// Loads the node list; empty if missing or unreadable.
pub fn load_nodes<S: KeyValueStore + ?Sized>(store: &S) -> Vec<Node> {
    load_or(store, NODES_KEY, Vec::new)
}

/// Loads the edge list; empty if missing or unreadable.
pub fn load_edges<S: KeyValueStore + ?Sized>(store: &S) -> Vec<Edge> {
    load_or(store, EDGES_KEY, Vec::new)
}

/// Loads the viewport; the identity viewport if missing, unreadable or degenerate.
pub fn load_viewport<S: KeyValueStore + ?Sized>(store: &S, config: &CanvasConfig) -> Viewport {
    load_or(store, VIEWPORT_KEY, Viewport::default).sanitized(config)
}

/// Overwrites the stored node list.
pub fn save_nodes<S: KeyValueStore + ?Sized>(
    store: &mut S,
    nodes: &[Node],
) -> Result<(), serde_json::Error> {
    save_entry(store, NODES_KEY, nodes)
}

/// Overwrites the stored edge list.
pub fn save_edges<S: KeyValueStore + ?Sized>(
    store: &mut S,
    edges: &[Edge],
) -> Result<(), serde_json::Error> {
    save_entry(store, EDGES_KEY, edges)
}

/// Overwrites the stored viewport.
pub fn save_viewport<S: KeyValueStore + ?Sized>(
    store: &mut S,
    viewport: &Viewport,
) -> Result<(), serde_json::Error> {
    save_entry(store, VIEWPORT_KEY, viewport)
}

/// Removes every canvas key.
pub fn clear<S: KeyValueStore + ?Sized>(store: &mut S) {
    for key in [NODES_KEY, EDGES_KEY, VIEWPORT_KEY] {
        store.remove(&storage_key(key));
    }
}
