//! Per-session persistence of the watermark's true sample count.
//!
//! The decoder needs the pre-padding watermark length to trim the
//! recovered signal. Each record is keyed by a session id, so unrelated
//! encode/decode pairs never observe each other's metadata.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};

/// Facts about one encode operation that its matching decode requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkMetadata {
    /// Watermark sample count after rate alignment, before truncation/padding
    /// to the host length.
    pub original_watermark_length: u64,
}

impl WatermarkMetadata {
    pub fn new(original_watermark_length: u64) -> Self {
        Self {
            original_watermark_length,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Metadata(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Metadata(e.to_string()))
    }

    /// Write the record as JSON to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)
            .map_err(|e| Error::Metadata(format!("{}: {e}", path.display())))
    }

    /// Read a record from `path`, returning `None` if the file does not exist.
    pub fn read_from(path: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Metadata(format!("{}: {e}", path.display()))),
        }
    }
}

/// Storage for watermark metadata, keyed by session id.
pub trait MetadataStore {
    /// Store `metadata` for `session`, replacing any previous record.
    fn save(&self, session: &str, metadata: &WatermarkMetadata) -> Result<()>;

    /// Fetch the record for `session`, if one was saved.
    fn load(&self, session: &str) -> Result<Option<WatermarkMetadata>>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, WatermarkMetadata>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetadataStore for MemoryStore {
    fn save(&self, session: &str, metadata: &WatermarkMetadata) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| Error::Metadata("store lock poisoned".into()))?;
        records.insert(session.to_string(), *metadata);
        Ok(())
    }

    fn load(&self, session: &str) -> Result<Option<WatermarkMetadata>> {
        let records = self
            .records
            .lock()
            .map_err(|_| Error::Metadata("store lock poisoned".into()))?;
        Ok(records.get(session).copied())
    }
}

/// One JSON file per session in a directory: `<dir>/<session>.wm.json`.
#[derive(Debug, Clone)]
pub struct SidecarStore {
    dir: PathBuf,
}

impl SidecarStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding the record for `session`.
    pub fn path_for(&self, session: &str) -> PathBuf {
        self.dir.join(format!("{}.wm.json", sanitize_session(session)))
    }
}

impl MetadataStore for SidecarStore {
    fn save(&self, session: &str, metadata: &WatermarkMetadata) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Metadata(format!("{}: {e}", self.dir.display())))?;
        metadata.write_to(&self.path_for(session))
    }

    fn load(&self, session: &str) -> Result<Option<WatermarkMetadata>> {
        WatermarkMetadata::read_from(&self.path_for(session))
    }
}

/// Map a session id onto a safe file stem.
fn sanitize_session(session: &str) -> String {
    let stem: String = session
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() { "_".to_string() } else { stem }
}
