//! Small JSON state files kept in the data directory.

use crate::error::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::Path;

/// Reads a JSON document. A missing file is `Ok(None)`.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(Error::ReadFile {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_slice(&data)
        .map(Some)
        .map_err(|source| Error::Deserialize {
            path: path.to_path_buf(),
            source,
        })
}

/// Like [`read_json`] but any failure degrades to the default value.
pub(crate) fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match read_json(path) {
        Ok(Some(value)) => value,
        Ok(None) => {
            tracing::debug!(path = %path.display(), "State file missing, starting empty");
            T::default()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable state file");
            T::default()
        }
    }
}

/// Writes pretty JSON through a sibling temp file and renames it into place,
/// so readers never see a half-written document.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| Error::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let data = serde_json::to_vec_pretty(value).map_err(Error::Serialize)?;
    let tmp_path = path.with_extension("json.tmp");

    std::fs::write(&tmp_path, data).map_err(|source| Error::WriteFile {
        path: tmp_path.clone(),
        source,
    })?;
    std::fs::rename(&tmp_path, path).map_err(|source| Error::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}
