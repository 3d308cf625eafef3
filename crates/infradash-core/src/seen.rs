//! Seen-ID store trait.
//!
//! The tender alert remembers which opportunity IDs it has already forwarded.
//! [`SeenStore`] makes that state explicit: load the whole set once at the
//! start of a run, append the newly forwarded IDs once at the end.
//!
//! There is no locking. Two runs sharing a store may both forward the same
//! posting, and that is accepted.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::Result;

/// Set of previously forwarded identifiers.
pub type SeenSet = HashSet<String>;

/// Persistent set of identifiers with read-then-append semantics.
#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Returns a short name for logging (e.g. "file", "sqlite").
    fn name(&self) -> &str;

    /// Loads every identifier recorded so far.
    ///
    /// A store that has never been written loads as the empty set.
    async fn load(&self) -> Result<SeenSet>;

    /// Records identifiers as seen.
    ///
    /// Existing entries are never removed or rewritten.
    async fn append(&self, ids: &[String]) -> Result<()>;
}
