//! Authenticated session and its persistence.
//!
//! A [`SessionStore`] holds at most one session. The file store writes
//! `session.json`; a file that fails to parse is treated as no session and
//! left for the next `save` or `clear` to replace.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Public profile of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
}

/// Proof of authentication. Absent means guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

pub trait SessionStore {
    fn load(&self) -> Option<Session>;
    fn save(&mut self, session: &Session) -> io::Result<()>;
    fn clear(&mut self) -> io::Result<()>;
}

/// Process-lifetime store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Option<Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<Session> {
        self.session.clone()
    }

    fn save(&mut self, session: &Session) -> io::Result<()> {
        self.session = Some(session.clone());
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.session = None;
        Ok(())
    }
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<Session> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("cannot read session {}: {e}", self.path.display());
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(session) => Some(session),
            Err(e) => {
                log::warn!("ignoring corrupt session {}: {e}", self.path.display());
                None
            }
        }
    }

    fn save(&mut self, session: &Session) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session).map_err(io::Error::other)?;
        fs::write(&self.path, json)
    }

    fn clear(&mut self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Session {
        Session {
            user: User {
                name: "Ada".into(),
                email: "ada@example.org".into(),
            },
            token: "tok-1".into(),
        }
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemorySessionStore::new();
        assert!(store.load().is_none());
        store.save(&sample()).unwrap();
        assert_eq!(store.load(), Some(sample()));
        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        FileSessionStore::new(&path).save(&sample()).unwrap();
        assert_eq!(FileSessionStore::new(&path).load(), Some(sample()));
    }

    #[test]
    fn file_store_treats_garbage_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        let mut store = FileSessionStore::new(&path);
        assert!(store.load().is_none());
        store.clear().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn clearing_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSessionStore::new(dir.path().join("session.json"));
        assert!(store.clear().is_ok());
    }
}
