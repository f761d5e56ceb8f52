//! File helpers shared by the config stores.

use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use crate::error::{ConfigError, Result};

/// Read a file into a string, returning `None` if it does not exist.
///
/// An empty or whitespace-only file is treated the same as a missing one.
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(None),
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfigError::read(path, e)),
    }
}

/// Read and parse a TOML file, returning `None` if it does not exist.
pub(crate) fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match read_optional(path)? {
        Some(content) => toml::from_str(&content)
            .map(Some)
            .map_err(|e| ConfigError::parse(path, e)),
        None => Ok(None),
    }
}

/// Atomically write `data` to `path` using a tempfile in the same directory.
///
/// Parent directories are created as needed.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| ConfigError::write(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ConfigError::write(path, e))?;
    tmp.write_all(data).map_err(|e| ConfigError::write(path, e))?;
    tmp.persist(path)
        .map_err(|e| ConfigError::write(path, e.error))?;
    Ok(())
}

/// Serialize `value` as TOML and write it atomically.
pub(crate) fn write_toml<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = toml::to_string(value)?;
    atomic_write(path, content.as_bytes())
}
