//! Durable key/value storage with per-entry expiration.
//!
//! DESIGN
//! ======
//! Entries behave like browser cookies: a plain string value plus an absolute
//! expiry. Reads of an expired entry return `None` and prune it. The trait has
//! no error results, so `FileStorage` logs I/O failures instead of returning
//! them.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// Client-side storage that survives process restarts.
pub trait DurableStorage: Send + Sync {
    /// Read a live entry.
    fn get(&self, key: &str) -> Option<String>;
    /// Write an entry that expires `ttl` from now.
    fn set(&self, key: &str, value: &str, ttl: Duration);
    /// Drop an entry. Missing keys are fine.
    fn remove(&self, key: &str);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Entry {
    value: String,
    /// Unix seconds.
    expires_at: i64,
}

impl Entry {
    fn new(value: &str, ttl: Duration) -> Self {
        let expires_at = (OffsetDateTime::now_utc() + ttl).unix_timestamp();
        Self { value: value.to_owned(), expires_at }
    }

    fn is_live(&self, now: i64) -> bool {
        self.expires_at > now
    }
}

/// Read `key` from `entries`, pruning it when expired. Returns the value and
/// whether the map was modified.
fn read_entry(entries: &mut HashMap<String, Entry>, key: &str) -> (Option<String>, bool) {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    match entries.get(key) {
        Some(entry) if entry.is_live(now) => (Some(entry.value.clone()), false),
        Some(_) => {
            entries.remove(key);
            (None, true)
        }
        None => (None, false),
    }
}

// =============================================================================
// MEMORY STORAGE
// =============================================================================

/// In-process storage. Nothing survives a restart; used by tests and by
/// ephemeral CLI sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        read_entry(&mut entries, key).0
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), Entry::new(value, ttl));
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
    }
}

// =============================================================================
// FILE STORAGE
// =============================================================================

/// JSON-file storage. The whole file is loaded at open and rewritten after
/// every mutation.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, Entry>>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`. A missing or
    /// unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        tracing::debug!(path = %path.display(), entries = entries.len(), "opened session storage");
        Self { path, entries: Mutex::new(entries) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &HashMap<String, Entry>) {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(error = %e, path = %parent.display(), "failed to create storage directory");
                return;
            }
        }
        let raw = match serde_json::to_string_pretty(entries) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize session storage");
                return;
            }
        };
        if let Err(e) = write_atomic(&self.path, raw.as_bytes()) {
            tracing::warn!(error = %e, path = %self.path.display(), "failed to write session storage");
        }
    }
}

/// Write `bytes` to a sibling temp file and rename it over `path`, so readers
/// see either the old contents or the new ones. The file holds tokens and is
/// owner-only on unix.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp_name = path.file_name().map(OsString::from).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    let result = write_owner_only(&tmp, bytes).and_then(|()| std::fs::rename(&tmp, path));
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

fn write_owner_only(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path)?;
    // `mode` only applies on create; a leftover temp file keeps its old bits.
    #[cfg(unix)]
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn load_entries(path: &Path) -> HashMap<String, Entry> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "failed to read session storage");
            return HashMap::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "corrupt session storage, starting empty");
            HashMap::new()
        }
    }
}

impl DurableStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let (value, pruned) = read_entry(&mut entries, key);
        if pruned {
            self.flush(&entries);
        }
        value
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), Entry::new(value, ttl));
        self.flush(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.flush(&entries);
        }
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;
