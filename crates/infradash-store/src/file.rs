//! Flat-file seen store.

use async_trait::async_trait;
use infradash_core::{DataError, Result, SeenSet, SeenStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

/// File name used when no path is configured.
pub const DEFAULT_SEEN_FILE: &str = "last_seen_tenders.txt";

/// Seen store backed by a UTF-8 text file holding one ID per line.
///
/// The file is created on first append. Blank lines and surrounding
/// whitespace are ignored on load.
#[derive(Debug, Clone)]
pub struct FileSeenStore {
    path: PathBuf,
}

impl FileSeenStore {
    /// Creates a store at the given path. Nothing is touched until first use.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileSeenStore {
    fn default() -> Self {
        Self::new(DEFAULT_SEEN_FILE)
    }
}

#[async_trait]
impl SeenStore for FileSeenStore {
    fn name(&self) -> &str {
        "file"
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<SeenSet> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Seen file does not exist yet");
                return Ok(SeenSet::new());
            }
            Err(e) => return Err(DataError::Store(e.to_string())),
        };

        let seen: SeenSet = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        debug!(count = seen.len(), "Loaded seen IDs");
        Ok(seen)
    }

    #[instrument(skip(self, ids), fields(path = %self.path.display(), count = ids.len()))]
    async fn append(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut buf = String::new();
        for id in ids {
            buf.push_str(id.trim());
            buf.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| DataError::Store(e.to_string()))?;

        file.write_all(buf.as_bytes())
            .await
            .map_err(|e| DataError::Store(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| DataError::Store(e.to_string()))?;

        debug!("Appended seen IDs");
        Ok(())
    }
}
