use crate::{FlowEdge, FlowNode};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Key the flow is saved under
pub const DEFAULT_STORAGE_KEY: &str = "chatbot-flow";

/// Durable string key-value store (the browser's localStorage, a directory, ...)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Serialized form of a flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowDocument {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowDocument {
    /// Snapshot a graph, preserving node and edge order
    pub fn from_graph(nodes: &[FlowNode], edges: &[FlowEdge]) -> Self {
        Self {
            nodes: nodes.to_vec(),
            edges: edges.to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize flow")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse flow")
    }

    /// Write this document under `key`
    pub fn save_to(&self, store: &mut dyn KeyValueStore, key: &str) -> Result<()> {
        let json = self.to_json()?;
        store
            .set(key, &json)
            .with_context(|| format!("Failed to store flow under key: {}", key))
    }

    /// Read the document stored under `key`, if any
    pub fn load_from(store: &dyn KeyValueStore, key: &str) -> Result<Option<Self>> {
        match store.get(key)? {
            Some(json) => Self::from_json(&json)
                .with_context(|| format!("Failed to parse flow stored under key: {}", key))
                .map(Some),
            None => Ok(None),
        }
    }

    /// Read a document from a JSON file
    pub fn read_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open flow file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse flow from: {}", path.display()))
    }
}

/// In-memory store. Clones share the same entries, so a test can keep a
/// handle while the flow store owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    root_dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `path`, creating the directory if needed
    pub fn open(path: &Path) -> Result<Self> {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create store directory: {}", path.display()))?;

        Ok(Self {
            root_dir: path.to_path_buf(),
        })
    }

    /// Get the root directory
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Path of the file backing `key`
    pub fn key_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(anyhow!("Invalid storage key: {:?}", key));
        }
        Ok(self.root_dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;

        if !path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read: {}", path.display()))
            .map(Some)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;

        let file = File::create(&path)
            .with_context(|| format!("Failed to create: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(value.as_bytes())
            .with_context(|| format!("Failed to write: {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush: {}", path.display()))?;

        Ok(())
    }
}
