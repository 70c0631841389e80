use super::{FingerprintCache, FingerprintRecord};
use crate::error::FfdlError;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Whether the cache file existed when the store was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOrigin {
    Created,
    Loaded,
}

/// Per-channel ETag cache backed by a JSON file.
///
/// Mutations stay in memory until [`FingerprintStore::flush`] rewrites the file.
#[derive(Debug)]
pub struct FingerprintStore {
    path: PathBuf,
    cache: FingerprintCache,
    origin: StoreOrigin,
}

impl FingerprintStore {
    /// Opens the cache at `path`, creating its directory and an empty cache file
    /// when missing.
    ///
    /// With `reset`, everything inside the directory holding the cache (the
    /// download output directory) is deleted first, so every channel starts
    /// from scratch.
    pub fn open(path: impl Into<PathBuf>, reset: bool) -> Result<Self, FfdlError> {
        let path = path.into();
        let dir = owning_dir(&path);

        if reset {
            clean_folder(dir)?;
        }

        std::fs::create_dir_all(dir).map_err(|e| FfdlError::StorageOpen {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        if !path.is_file() {
            tracing::debug!("Creating empty ETag cache at {}", path.display());
            let store = Self {
                path,
                cache: FingerprintCache::default(),
                origin: StoreOrigin::Created,
            };
            store.flush()?;
            return Ok(store);
        }

        let cache = load_cache(&path)?;
        tracing::debug!(
            "Loaded ETag cache with {} channels from {}",
            cache.len(),
            path.display()
        );
        Ok(Self {
            path,
            cache,
            origin: StoreOrigin::Loaded,
        })
    }

    pub fn origin(&self) -> StoreOrigin {
        self.origin
    }

    pub fn cache(&self) -> &FingerprintCache {
        &self.cache
    }

    pub fn has(&self, channel: &str) -> bool {
        self.cache.etags.contains_key(channel)
    }

    pub fn get_fingerprint(&self, channel: &str) -> Result<&str, FfdlError> {
        self.cache
            .etags
            .get(channel)
            .map(String::as_str)
            .ok_or_else(|| FfdlError::FingerprintNotFound {
                channel: channel.to_string(),
            })
    }

    pub fn record(&self, channel: &str) -> Option<FingerprintRecord> {
        self.cache.record(channel)
    }

    pub fn set(&mut self, channel: &str, fingerprint: impl Into<String>, was_cached: bool) {
        self.cache.insert(
            channel,
            FingerprintRecord {
                fingerprint: fingerprint.into(),
                was_cached,
            },
        );
    }

    /// Rewrites the cache file from memory.
    ///
    /// The new contents go to a temporary file next to the cache and are renamed
    /// over it, so an interrupted flush leaves the previous file intact.
    pub fn flush(&self) -> Result<(), FfdlError> {
        let save_error = |reason: String| FfdlError::StorageSave {
            path: self.path.clone(),
            reason,
        };

        let json = serde_json::to_string_pretty(&self.cache)
            .map_err(|e| save_error(format!("JSON serialization failed: {}", e)))?;

        let mut file = tempfile::NamedTempFile::new_in(owning_dir(&self.path))
            .map_err(|e| save_error(e.to_string()))?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.write_all(b"\n"))
            .and_then(|()| file.as_file().sync_all())
            .map_err(|e| save_error(e.to_string()))?;
        file.persist(&self.path)
            .map_err(|e| save_error(e.error.to_string()))?;

        tracing::trace!("Flushed ETag cache to {}", self.path.display());
        Ok(())
    }
}

fn owning_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Empties `dir` (the cache file included) without removing `dir` itself.
fn clean_folder(dir: &Path) -> Result<(), FfdlError> {
    let clean_error = |target: &Path, e: std::io::Error| FfdlError::StorageOpen {
        path: target.to_path_buf(),
        reason: format!("failed to clean: {}", e),
    };

    if !dir.exists() {
        return Ok(());
    }

    tracing::info!("Cleaning {}", dir.display());
    let entries = std::fs::read_dir(dir).map_err(|e| clean_error(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| clean_error(dir, e))?;
        let entry_path = entry.path();
        let is_dir = entry
            .file_type()
            .map_err(|e| clean_error(&entry_path, e))?
            .is_dir();
        let removed = if is_dir {
            std::fs::remove_dir_all(&entry_path)
        } else {
            std::fs::remove_file(&entry_path)
        };
        removed.map_err(|e| clean_error(&entry_path, e))?;
    }
    Ok(())
}

fn load_cache(path: &Path) -> Result<FingerprintCache, FfdlError> {
    let content = std::fs::read_to_string(path).map_err(|e| FfdlError::StorageLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| FfdlError::StorageLoad {
        path: path.to_path_buf(),
        reason: format!("JSON parsing failed: {}", e),
    })
}
