//! File-backed document store
//!
//! Writes go to a temporary file in the destination directory, are
//! fsynced, then renamed over the destination. The previous document is
//! never deleted first, so a failed write leaves it untouched.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::DocumentStore;
use crate::errors::{DbError, DbResult};

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl DocumentStore for FileStore {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn read_document(&self) -> DbResult<Vec<u8>> {
        fs::read(&self.path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                DbError::document_not_found(self.path.display().to_string())
            } else {
                DbError::io(
                    format!("Failed to read document: {}", self.path.display()),
                    e,
                )
            }
        })
    }

    fn write_document(&mut self, bytes: &[u8]) -> DbResult<()> {
        let dir = self.parent_dir();

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| {
                DbError::io(format!("Failed to create directory: {}", dir.display()), e)
            })?;
        }

        let mut temp = NamedTempFile::new_in(&dir).map_err(|e| {
            DbError::io(format!("Failed to create temp file in: {}", dir.display()), e)
        })?;

        temp.write_all(bytes)
            .map_err(|e| DbError::io("Failed to write document", e))?;

        // fsync before the rename so the new name never points at partial data
        temp.as_file()
            .sync_all()
            .map_err(|e| DbError::io("fsync failed after writing document", e))?;

        temp.persist(&self.path).map_err(|e| {
            DbError::io(
                format!("Failed to replace document: {}", self.path.display()),
                e.error,
            )
        })?;

        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
