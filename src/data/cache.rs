//! Load-once cache for normalised tables.
//!
//! Entries are keyed by canonical path and dashboard. Each entry remembers the
//! file's length and modification time; a mismatch on lookup means the file
//! changed on disk and the entry is rebuilt. Nothing expires on a timer.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::error::DataLoadError;
use super::loader::load_file;
use super::model::{DatasetKind, InstitutionTable};
use super::normalize::normalize;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: PathBuf,
    kind: DatasetKind,
}

/// What identifies one version of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl Fingerprint {
    fn of(path: &Path) -> Result<Self, DataLoadError> {
        let meta = fs::metadata(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Memoised `load_file` + `normalize`.
#[derive(Debug, Default)]
pub struct TableCache {
    entries: HashMap<CacheKey, (Fingerprint, Arc<InstitutionTable>)>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, loading and normalising it on a
    /// miss or when the file has changed since it was cached.
    pub fn get_or_load(
        &mut self,
        path: &Path,
        kind: DatasetKind,
    ) -> Result<Arc<InstitutionTable>, DataLoadError> {
        let canonical = path.canonicalize().map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let fingerprint = Fingerprint::of(&canonical)?;
        let key = CacheKey {
            path: canonical,
            kind,
        };

        match self.entries.get(&key) {
            Some((cached, table)) if *cached == fingerprint => {
                log::debug!("Cache hit for {}", key.path.display());
                return Ok(Arc::clone(table));
            }
            Some(_) => log::info!("{} changed on disk, reloading", key.path.display()),
            None => {}
        }

        let table = Arc::new(normalize(load_file(&key.path)?, kind));
        self.entries.insert(key, (fingerprint, Arc::clone(&table)));
        Ok(table)
    }
}
