//! Scan history storage
//!
//! An ordered, newest-first list of recognition results. Every mutation is
//! written through to the persistence backend immediately; a failed write
//! is logged and the in-memory state stays authoritative.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A recognized image and its text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scan {
    /// Unique, time-derived identifier
    pub id: String,
    /// Local path of the recognized image
    pub image_uri: String,
    pub extracted_text: String,
    /// Creation time in epoch milliseconds
    pub created_at: i64,
}

impl Scan {
    pub fn new(
        id: impl Into<String>,
        image_uri: impl Into<String>,
        extracted_text: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            image_uri: image_uri.into(),
            extracted_text: extracted_text.into(),
            created_at,
        }
    }

    pub fn image_path(&self) -> &Path {
        Path::new(&self.image_uri)
    }
}

/// Persisted form of the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub scans: Vec<Scan>,
    #[serde(default)]
    pub current_scan_id: Option<String>,
}

/// Durable backing for the history store
pub trait HistoryPersistence: Send + Sync {
    /// Read the stored state, `None` when nothing was saved yet
    fn load(&self) -> Result<Option<HistoryRecord>>;
    fn save(&self, record: &HistoryRecord) -> Result<()>;
}

/// History stored as a pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonHistoryFile {
    path: PathBuf,
}

impl JsonHistoryFile {
    pub const FILE_NAME: &'static str = "history.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `history.json` inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(Self::FILE_NAME))
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryPersistence for JsonHistoryFile {
    fn load(&self) -> Result<Option<HistoryRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let record: HistoryRecord = serde_json::from_str(&content)?;
        Ok(Some(record))
    }

    fn save(&self, record: &HistoryRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(record)?;
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

/// Newest-first scan history with a current selection
pub struct ScanHistory {
    scans: Vec<Scan>,
    selected_id: Option<String>,
    persistence: Option<Box<dyn HistoryPersistence>>,
    /// Images under this directory are deleted along with their scan
    image_dir: Option<PathBuf>,
}

impl std::fmt::Debug for ScanHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanHistory")
            .field("scans", &self.scans.len())
            .field("selected_id", &self.selected_id)
            .field("persistent", &self.persistence.is_some())
            .field("image_dir", &self.image_dir)
            .finish()
    }
}

impl Default for ScanHistory {
    fn default() -> Self {
        Self::ephemeral()
    }
}

impl ScanHistory {
    /// A store that lives only in memory
    pub fn ephemeral() -> Self {
        Self {
            scans: Vec::new(),
            selected_id: None,
            persistence: None,
            image_dir: None,
        }
    }

    /// Restore from `persistence`, starting empty when nothing can be read
    pub fn restore(persistence: Box<dyn HistoryPersistence>) -> Self {
        let record = match persistence.load() {
            Ok(Some(record)) => record,
            Ok(None) => HistoryRecord::default(),
            Err(e) => {
                warn!("Failed to restore scan history, starting empty: {}", e);
                HistoryRecord::default()
            }
        };

        let mut scans: Vec<Scan> = Vec::with_capacity(record.scans.len());
        for scan in record.scans {
            if scans.iter().any(|s| s.id == scan.id) {
                warn!("Dropping duplicate scan id {} from stored history", scan.id);
                continue;
            }
            scans.push(scan);
        }

        info!("Restored {} scans from history", scans.len());

        Self {
            selected_id: record
                .current_scan_id
                .filter(|id| scans.iter().any(|s| &s.id == id)),
            scans,
            persistence: Some(persistence),
            image_dir: None,
        }
    }

    /// Take ownership of image files written under `dir`
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(dir.into());
        self
    }

    /// Insert at the front and select it
    ///
    /// An existing entry with the same id is replaced so ids stay unique.
    pub fn add(&mut self, scan: Scan) {
        let replaced = self
            .scans
            .iter()
            .position(|s| s.id == scan.id)
            .map(|pos| self.scans.remove(pos));
        self.selected_id = Some(scan.id.clone());
        self.scans.insert(0, scan);
        self.persist();
        if let Some(old) = replaced {
            self.discard_image(old.image_path());
        }
    }

    /// Remove the scan with `id`, clearing the selection if it pointed there
    pub fn remove(&mut self, id: &str) -> Option<Scan> {
        let pos = self.scans.iter().position(|s| s.id == id)?;
        let removed = self.scans.remove(pos);
        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = None;
        }
        self.persist();
        self.discard_image(removed.image_path());
        Some(removed)
    }

    /// Empty the history and clear the selection
    pub fn clear_all(&mut self) {
        let removed = std::mem::take(&mut self.scans);
        self.selected_id = None;
        self.persist();
        for scan in &removed {
            self.discard_image(scan.image_path());
        }
    }

    /// Delete `path` if it lives in the owned image directory and no scan
    /// still points at it
    ///
    /// Files outside the directory are never touched. Returns true when a
    /// file was removed.
    pub fn discard_image(&self, path: &Path) -> bool {
        let Some(dir) = &self.image_dir else {
            return false;
        };
        if !path.starts_with(dir) || self.scans.iter().any(|s| s.image_path() == path) {
            return false;
        }
        match std::fs::remove_file(path) {
            Ok(()) => {
                debug!("Removed image {:?}", path);
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!("Failed to remove image {:?}: {}", path, e);
                false
            }
        }
    }

    /// Set the currently viewed scan without touching the list
    pub fn select(&mut self, id: Option<&str>) {
        self.selected_id = id.map(str::to_string);
        self.persist();
    }

    /// The selected scan, if it still exists
    pub fn selected(&self) -> Option<&Scan> {
        let id = self.selected_id.as_deref()?;
        self.get(id)
    }

    #[cfg(test)]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn get(&self, id: &str) -> Option<&Scan> {
        self.scans.iter().find(|s| s.id == id)
    }

    /// All scans, newest first
    pub fn scans(&self) -> &[Scan] {
        &self.scans
    }

    pub fn len(&self) -> usize {
        self.scans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    /// A fresh id derived from `now_ms`, bumped until unused
    pub fn next_id(&self, now_ms: i64) -> String {
        let mut candidate = now_ms;
        while self.get(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }

    fn persist(&self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        let record = HistoryRecord {
            scans: self.scans.clone(),
            current_scan_id: self.selected_id.clone(),
        };
        match persistence.save(&record) {
            Ok(()) => debug!("Persisted {} scans", record.scans.len()),
            Err(e) => warn!("Failed to persist scan history: {}", e),
        }
    }
}
