//! First-run config file creation

use super::error::{ConfigError, Result};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Write `defaults` to `path` as YAML unless something already exists there.
///
/// Returns `true` when the file was created. An existing file, including one
/// created by a concurrent invocation between our check and our write, is
/// left untouched and reported as `false`.
pub fn ensure_default_file<T: Serialize>(path: &Path, defaults: &T) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    let body = serde_yaml::to_string(defaults).map_err(|e| ConfigError::Serialize(e.to_string()))?;

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(ConfigError::io(path, e)),
    };
    file.write_all(body.as_bytes()).map_err(|e| ConfigError::io(path, e))?;

    tracing::info!("Wrote default config file {}", path.display());
    Ok(true)
}
