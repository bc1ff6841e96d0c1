//! JSON document storage.
//!
//! Source files are read whole and kept as raw bytes alongside the parsed
//! value so callers can fingerprint exactly what was read.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::StorageError;

/// A source document as read from disk.
#[derive(Debug, Clone)]
pub struct RawSource {
    pub name: String,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub value: Value,
}

/// Read and parse a required source file.
///
/// Unreadable files map to [`StorageError::MissingSource`], unparsable ones
/// to [`StorageError::MalformedSource`]; both name the source.
pub fn read_source(name: &str, path: &Path) -> Result<RawSource, StorageError> {
    let bytes = fs::read(path).map_err(|e| StorageError::MissingSource {
        source_name: name.to_string(),
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let value = serde_json::from_slice(&bytes).map_err(|e| StorageError::MalformedSource {
        source_name: name.to_string(),
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    info!("Loaded {} source from {:?} ({} bytes)", name, path, bytes.len());

    Ok(RawSource {
        name: name.to_string(),
        path: path.to_path_buf(),
        bytes,
        value,
    })
}

/// Ensure the parent directory of `path` exists.
fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write a document as pretty-printed JSON, replacing any existing file.
///
/// Returns the size of the written file in bytes.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<u64, StorageError> {
    ensure_parent(path)?;

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;

    let size = fs::metadata(path)?.len();
    info!("Wrote {:?} ({} bytes)", path, size);

    Ok(size)
}
