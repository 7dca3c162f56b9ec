//! Image file selection.
//!
//! The core never decodes images. It needs a name and a byte size for
//! inference and an opaque reference the presentation layer can display.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Opaque handle to the selected image (a path or data URL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub size: u64,
    pub image: ImageRef,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, size: u64, image: ImageRef) -> Self {
        Self {
            name: name.into(),
            size,
            image,
        }
    }
}

pub trait FileReader {
    fn read(&self, path: &Path) -> io::Result<ImageFile>;
}

/// Reads name and size from filesystem metadata.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFileReader;

impl FileReader for FsFileReader {
    fn read(&self, path: &Path) -> io::Result<ImageFile> {
        let meta = fs::metadata(path)?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(ImageFile {
            name,
            size: meta.len(),
            image: ImageRef(path.display().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_name_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        fs::write(&path, vec![0u8; 500]).unwrap();
        let file = FsFileReader.read(&path).unwrap();
        assert_eq!(file.name, "a.png");
        assert_eq!(file.size, 500);
        assert!(file.image.as_str().ends_with("a.png"));
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FsFileReader.read(dir.path()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsFileReader.read(&dir.path().join("nope.png")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
