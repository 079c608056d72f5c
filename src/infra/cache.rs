use crate::domain::{Device, DeviceCatalog, InfraredRemote};
use crate::infra::ApiError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to read device cache {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("device cache {path} is corrupt: {source}\nHint: delete the file to force a refetch.")]
    Corrupt {
        path: String,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Fetch(#[from] ApiError),

    #[error("failed to encode device cache: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write device cache {path}: {source}")]
    Write { path: String, source: io::Error },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CacheState {
    Fresh,
    Stale,
}

/// One element of the on-disk array; the two shapes differ by
/// `deviceType` vs `remoteType`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum CacheRecord {
    Device(Device),
    InfraredRemote(InfraredRemote),
}

pub fn load_or_refresh<F>(
    path: &Path,
    max_age: Duration,
    fetch: F,
) -> Result<DeviceCatalog, CacheError>
where
    F: FnOnce() -> Result<DeviceCatalog, ApiError>,
{
    load_or_refresh_at(path, max_age, SystemTime::now(), fetch)
}

pub fn load_or_refresh_at<F>(
    path: &Path,
    max_age: Duration,
    now: SystemTime,
    fetch: F,
) -> Result<DeviceCatalog, CacheError>
where
    F: FnOnce() -> Result<DeviceCatalog, ApiError>,
{
    match cache_state(path, max_age, now)? {
        CacheState::Fresh => {
            debug!(path = %path.display(), "device cache is fresh");
            read_cache(path)
        }
        CacheState::Stale => {
            info!(path = %path.display(), "device cache is stale, refetching");
            let catalog = fetch()?;
            write_cache(path, &catalog)?;
            Ok(catalog)
        }
    }
}

pub fn cache_state(
    path: &Path,
    max_age: Duration,
    now: SystemTime,
) -> Result<CacheState, CacheError> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(CacheState::Stale),
        Err(error) => return Err(read_error(path, error)),
    };
    if !meta.is_file() || meta.len() == 0 {
        return Ok(CacheState::Stale);
    }

    let modified = meta.modified().map_err(|error| read_error(path, error))?;
    // A modification time ahead of `now` counts as brand new.
    let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
    if age >= max_age {
        Ok(CacheState::Stale)
    } else {
        Ok(CacheState::Fresh)
    }
}

pub fn read_cache(path: &Path) -> Result<DeviceCatalog, CacheError> {
    let raw = fs::read_to_string(path).map_err(|error| read_error(path, error))?;
    let records: Vec<CacheRecord> =
        serde_json::from_str(&raw).map_err(|source| CacheError::Corrupt {
            path: path.display().to_string(),
            source,
        })?;

    let mut catalog = DeviceCatalog::default();
    for record in records {
        match record {
            CacheRecord::Device(device) => catalog.devices.push(device),
            CacheRecord::InfraredRemote(remote) => catalog.infrared_remotes.push(remote),
        }
    }
    Ok(catalog)
}

/// Replaces the cache file via a sibling temp file and rename.
pub fn write_cache(path: &Path, catalog: &DeviceCatalog) -> Result<(), CacheError> {
    let records = catalog
        .devices
        .iter()
        .cloned()
        .map(CacheRecord::Device)
        .chain(
            catalog
                .infrared_remotes
                .iter()
                .cloned()
                .map(CacheRecord::InfraredRemote),
        )
        .collect::<Vec<_>>();
    let text = serde_json::to_string_pretty(&records)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|error| write_error(parent, error))?;
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, text).map_err(|error| {
        let _ = fs::remove_file(&tmp);
        write_error(&tmp, error)
    })?;
    fs::rename(&tmp, path).map_err(|error| {
        let _ = fs::remove_file(&tmp);
        write_error(path, error)
    })?;
    debug!(path = %path.display(), entries = catalog.len(), "wrote device cache");
    Ok(())
}

fn read_error(path: &Path, source: io::Error) -> CacheError {
    CacheError::Read {
        path: path.display().to_string(),
        source,
    }
}

fn write_error(path: &Path, source: io::Error) -> CacheError {
    CacheError::Write {
        path: path.display().to_string(),
        source,
    }
}
