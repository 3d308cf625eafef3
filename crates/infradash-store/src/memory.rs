//! In-memory seen store.

use async_trait::async_trait;
use infradash_core::{Result, SeenSet, SeenStore};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Seen store for testing and dry runs.
///
/// IDs live in an `RwLock`-protected set and are lost when the store is
/// dropped.
#[derive(Debug, Default)]
pub struct InMemorySeenStore {
    ids: RwLock<SeenSet>,
}

impl InMemorySeenStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with IDs.
    #[must_use]
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: RwLock::new(ids.into_iter().map(Into::into).collect()),
        }
    }

    /// Number of IDs currently held.
    pub async fn len(&self) -> usize {
        self.ids.read().await.len()
    }

    /// Returns true if no IDs are held.
    pub async fn is_empty(&self) -> bool {
        self.ids.read().await.is_empty()
    }
}

#[async_trait]
impl SeenStore for InMemorySeenStore {
    fn name(&self) -> &str {
        "memory"
    }

    #[instrument(skip(self))]
    async fn load(&self) -> Result<SeenSet> {
        let ids = self.ids.read().await;
        debug!(count = ids.len(), "Loaded seen IDs");
        Ok(ids.clone())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn append(&self, ids: &[String]) -> Result<()> {
        let mut guard = self.ids.write().await;
        guard.extend(ids.iter().cloned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = InMemorySeenStore::new();
        assert!(store.load().await.unwrap().is_empty());

        store
            .append(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        store.append(&["a".to_string()]).await.unwrap();

        let seen = store.load().await.unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.contains("b"));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_with_ids() {
        let store = InMemorySeenStore::with_ids(["x", "y"]);
        assert!(!store.is_empty().await);
        assert!(store.load().await.unwrap().contains("x"));
    }
}
