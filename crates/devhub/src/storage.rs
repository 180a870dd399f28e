//! Line sources and sinks the manager loads from and saves to.

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Provides the raw lines of a device file, read once in full.
pub trait LineSource {
    fn read_lines(&mut self) -> Result<Vec<String>, StorageError>;
}

/// Accepts the serialized device lines, written once in full, replacing any
/// previous content.
pub trait LineSink {
    fn write_lines(&mut self, lines: &[String]) -> Result<(), StorageError>;
}

impl LineSource for Vec<String> {
    fn read_lines(&mut self) -> Result<Vec<String>, StorageError> {
        Ok(self.clone())
    }
}

impl LineSink for Vec<String> {
    fn write_lines(&mut self, lines: &[String]) -> Result<(), StorageError> {
        self.clear();
        self.extend_from_slice(lines);
        Ok(())
    }
}

/// A plain text file, one line per device.
#[derive(Debug, Clone)]
pub struct TextFile {
    path: PathBuf,
}

impl TextFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes to a temporary file next to the target and renames it into
    /// place, so the target holds either the old or the new content.
    fn write_atomically(&self, contents: &str) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl LineSource for TextFile {
    fn read_lines(&mut self) -> Result<Vec<String>, StorageError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;
        let lines: Vec<String> = contents.lines().map(str::to_string).collect();
        debug!("Read {} lines from {}", lines.len(), self.path.display());
        Ok(lines)
    }
}

impl LineSink for TextFile {
    fn write_lines(&mut self, lines: &[String]) -> Result<(), StorageError> {
        let mut contents = lines.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        self.write_atomically(&contents)
            .map_err(|source| StorageError::Write {
                path: self.path.clone(),
                source,
            })?;
        debug!("Wrote {} lines to {}", lines.len(), self.path.display());
        Ok(())
    }
}
