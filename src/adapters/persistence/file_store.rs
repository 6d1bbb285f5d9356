//! File Storage - Atomic One-File-Per-Key Persistence
//!
//! Implements `KeyValueStorage` on a data directory. Each key maps to
//! one `.json` file, written to a tmp file and then renamed so a crash
//! leaves either the old blob or the new one, never a partial write.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, instrument};

use crate::ports::storage::KeyValueStorage;

/// Directory-backed key-value store.
pub struct FileStorage {
    /// Directory holding one file per key.
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) the data directory.
    pub async fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = data_dir.as_ref();
        fs::create_dir_all(dir)
            .await
            .context("Failed to create data directory")?;

        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }
}

/// Map a storage key to a file stem. Alphanumerics, `.` and `-` pass
/// through; everything else becomes `_xx` so distinct keys never collide.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
            out.push(c);
        } else {
            out.push_str(&format!("_{:02x}", u32::from(c)));
        }
    }
    out
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(key, "No stored blob");
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    #[instrument(skip(self, blob), fields(bytes = blob.len()))]
    async fn set(&self, key: &str, blob: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, blob)
            .await
            .context("Failed to write tmp blob")?;

        fs::rename(&tmp, &path)
            .await
            .context("Failed to rename blob file")?;

        debug!(key, path = %path.display(), "Blob stored");
        Ok(())
    }
}
