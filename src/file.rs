// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// File helpers shared by the config readers and the output writers.
use std::{fs, path::Path};

use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::error::{Error, emit_error, io_error, write_error};

/// Reads and decodes a YAML document from `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and [`Error::Parse`]
/// when the content does not match `T`.
pub fn read_yaml<T>(path: &Path) -> Result<T, Error>
where
    T: DeserializeOwned
{
    debug!("Reading {}", path.display());
    let content = fs::read_to_string(path).map_err(|source| io_error(path, source))?;
    let document = serde_yaml::from_str(&content)?;
    Ok(document)
}

/// Serializes `value` to a YAML string.
///
/// # Errors
///
/// Returns [`Error::Emit`] when serialization fails.
pub fn to_yaml<T>(value: &T) -> Result<String, Error>
where
    T: Serialize + ?Sized
{
    serde_yaml::to_string(value).map_err(emit_error)
}

/// Overwrites `path` with `content` and restores the permission bits the
/// file carried before the write.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file metadata cannot be read and
/// [`Error::Write`] when writing or restoring permissions fails.
pub fn write_preserving_permissions(path: &Path, content: &str) -> Result<(), Error> {
    let permissions = fs::metadata(path)
        .map_err(|source| io_error(path, source))?
        .permissions();

    fs::write(path, content).map_err(|source| write_error(path, source))?;
    fs::set_permissions(path, permissions).map_err(|source| write_error(path, source))?;

    debug!("Rewrote {}", path.display());
    Ok(())
}

/// Writes `content` to `path`, creating parent directories when missing.
///
/// # Errors
///
/// Returns [`Error::Write`] when a directory cannot be created or the write
/// fails.
pub fn write_output(path: &Path, content: &str) -> Result<(), Error> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|source| write_error(parent, source))?;
    }

    fs::write(path, content).map_err(|source| write_error(path, source))
}
