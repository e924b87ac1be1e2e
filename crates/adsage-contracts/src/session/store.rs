use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use super::context::{prefixed, SessionContext, FIELDS};

/// Same ceiling browsers put on local storage.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_TTL_SECS: i64 = 30 * 60;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store quota exceeded ({size} bytes > {limit} bytes); try a smaller image")]
    QuotaExceeded { size: usize, limit: usize },
    #[error("session store I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session store serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// File-backed string store carrying the captured input to the dashboard.
///
/// Only keys under the `adsage_` prefix are owned by this store; anything
/// else in the file is left alone. Reads are destructive and entries older
/// than the TTL read as unset.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    ttl: Duration,
    quota_bytes: usize,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces every prefixed entry with `context` in a single write.
    pub fn save(&self, context: &SessionContext) -> Result<(), StoreError> {
        let mut on_disk = read_json_object(&self.path).unwrap_or_default();
        clear_prefixed(&mut on_disk);
        for (key, value) in context.to_entries(Utc::now()) {
            on_disk.insert(key, value);
        }

        let size = stored_size(&on_disk);
        if size > self.quota_bytes {
            return Err(StoreError::QuotaExceeded {
                size,
                limit: self.quota_bytes,
            });
        }
        write_json_object(&self.path, &on_disk)?;
        log::debug!(
            "session {} saved to {} ({size} bytes)",
            context.session_id,
            self.path.display()
        );
        Ok(())
    }

    /// Reads the stored context once and clears it.
    ///
    /// Missing, unreadable or expired entries yield [`SessionContext::empty`].
    pub fn take_context(&self) -> Result<SessionContext, StoreError> {
        let Some(mut on_disk) = read_json_object(&self.path) else {
            return Ok(SessionContext::empty());
        };
        let context = SessionContext::from_entries(&on_disk);
        if clear_prefixed(&mut on_disk) {
            write_json_object(&self.path, &on_disk)?;
        }

        if let Some(saved_at) = context.saved_at {
            let age = Utc::now() - saved_at;
            if age > self.ttl {
                log::info!(
                    "discarding session {} saved {}s ago",
                    context.session_id,
                    age.num_seconds()
                );
                return Ok(SessionContext::empty());
            }
        }
        Ok(context)
    }
}

fn clear_prefixed(payload: &mut Map<String, Value>) -> bool {
    let mut removed = false;
    for field in FIELDS {
        removed |= payload.remove(&prefixed(field)).is_some();
    }
    removed
}

/// Counts keys and string values the way storage quotas do.
fn stored_size(payload: &Map<String, Value>) -> usize {
    payload
        .iter()
        .map(|(key, value)| {
            key.len()
                + match value {
                    Value::String(text) => text.len(),
                    other => other.to_string().len(),
                }
        })
        .sum()
}

fn read_json_object(path: &Path) -> Option<Map<String, Value>> {
    let raw = std::fs::read_to_string(path).ok()?;
    let parsed: Value = serde_json::from_str(&raw).ok()?;
    parsed.as_object().cloned()
}

fn write_json_object(path: &Path, payload: &Map<String, Value>) -> Result<(), StoreError> {
    let io_error = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(
        path,
        serde_json::to_string_pretty(&Value::Object(payload.clone()))?,
    )
    .map_err(io_error)?;
    Ok(())
}
