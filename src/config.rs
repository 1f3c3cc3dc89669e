use crate::storage::DEFAULT_STORAGE_KEY;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long the "saved" notice stays visible
pub const DEFAULT_NOTICE_DELAY_MS: u64 = 3000;

/// Builder settings. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Key the flow is written under
    pub storage_key: String,

    pub notice_delay_ms: u64,

    /// Directory used by the file-backed store
    pub data_dir: PathBuf,
}

impl BuilderConfig {
    pub fn notice_delay(&self) -> Duration {
        Duration::from_millis(self.notice_delay_ms)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create config file: {}", path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .with_context(|| format!("Failed to write config to: {}", path.display()))?;
        Ok(())
    }

    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config from: {}", path.display()))
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            notice_delay_ms: DEFAULT_NOTICE_DELAY_MS,
            data_dir: PathBuf::from(".flow-builder"),
        }
    }
}
