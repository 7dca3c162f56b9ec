//! The single most-recent inference outcome.
//!
//! Records are stored as JSON text in both backends, so a damaged or partial
//! record surfaces as [`SlotError::Corrupt`] on read. Callers recover by
//! clearing the slot.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SlotError;
use crate::file_reader::ImageRef;
use crate::inference::InferenceResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub image: ImageRef,
    pub inference: InferenceResult,
}

impl ResultRecord {
    pub fn new(image: ImageRef, inference: InferenceResult) -> Self {
        Self { image, inference }
    }
}

/// Parse a stored record, rejecting anything incomplete.
pub fn decode(raw: &str) -> Result<ResultRecord, SlotError> {
    let record: ResultRecord =
        serde_json::from_str(raw).map_err(|e| SlotError::Corrupt(e.to_string()))?;
    if record.image.as_str().is_empty() {
        return Err(SlotError::Corrupt("missing image reference".into()));
    }
    let c = record.inference.confidence;
    if !(0.0..=1.0).contains(&c) {
        return Err(SlotError::Corrupt(format!("confidence {c} out of range")));
    }
    Ok(record)
}

fn encode(record: &ResultRecord) -> Result<String, SlotError> {
    serde_json::to_string(record).map_err(|e| SlotError::Io(io::Error::other(e)))
}

pub trait ResultSlot {
    fn set_last(&mut self, record: &ResultRecord) -> Result<(), SlotError>;
    fn get_last(&self) -> Result<Option<ResultRecord>, SlotError>;
    fn clear_last(&mut self) -> Result<(), SlotError>;
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryResultSlot {
    raw: Option<String>,
}

impl MemoryResultSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text as-is, bypassing encoding.
    pub fn put_raw(&mut self, raw: impl Into<String>) {
        self.raw = Some(raw.into());
    }
}

impl ResultSlot for MemoryResultSlot {
    fn set_last(&mut self, record: &ResultRecord) -> Result<(), SlotError> {
        self.raw = Some(encode(record)?);
        Ok(())
    }

    fn get_last(&self) -> Result<Option<ResultRecord>, SlotError> {
        self.raw.as_deref().map(decode).transpose()
    }

    fn clear_last(&mut self) -> Result<(), SlotError> {
        self.raw = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FileResultSlot {
    path: PathBuf,
}

impl FileResultSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSlot for FileResultSlot {
    fn set_last(&mut self, record: &ResultRecord) -> Result<(), SlotError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, encode(record)?)?;
        Ok(())
    }

    fn get_last(&self) -> Result<Option<ResultRecord>, SlotError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => decode(&raw).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn clear_last(&mut self) -> Result<(), SlotError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::infer;

    fn record() -> ResultRecord {
        ResultRecord::new(ImageRef("scans/a.png".into()), infer("a.png", 500))
    }

    #[test]
    fn memory_slot_round_trip() {
        let mut slot = MemoryResultSlot::new();
        assert!(slot.get_last().unwrap().is_none());
        slot.set_last(&record()).unwrap();
        assert_eq!(slot.get_last().unwrap(), Some(record()));
        slot.clear_last().unwrap();
        assert!(slot.get_last().unwrap().is_none());
    }

    #[test]
    fn unparsable_record_is_corrupt() {
        let mut slot = MemoryResultSlot::new();
        slot.put_raw("{\"image\":");
        assert!(matches!(slot.get_last(), Err(SlotError::Corrupt(_))));
    }

    #[test]
    fn incomplete_record_is_corrupt() {
        let mut slot = MemoryResultSlot::new();
        slot.put_raw(r#"{"image":"a.png"}"#);
        assert!(matches!(slot.get_last(), Err(SlotError::Corrupt(_))));
        slot.put_raw(r#"{"image":"","inference":{"label":"cancerous","confidence":0.9}}"#);
        assert!(matches!(slot.get_last(), Err(SlotError::Corrupt(_))));
        slot.put_raw(r#"{"image":"a.png","inference":{"label":"cancerous","confidence":7}}"#);
        assert!(matches!(slot.get_last(), Err(SlotError::Corrupt(_))));
    }

    #[test]
    fn file_slot_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_result.json");
        FileResultSlot::new(&path).set_last(&record()).unwrap();
        let mut slot = FileResultSlot::new(&path);
        assert_eq!(slot.get_last().unwrap(), Some(record()));
        slot.clear_last().unwrap();
        assert!(slot.get_last().unwrap().is_none());
        slot.clear_last().unwrap();
    }
}
