//! Asset Cache Abstraction
//!
//! Persists the last known full asset collection plus the sync cursor so a
//! restart can seed state without hitting the device library or the server.
//! The on-disk format and its validity check belong to the implementation;
//! the core only distinguishes "valid", "corrupt" and "absent".

use async_trait::async_trait;

use crate::asset::{Asset, SyncCursor};
use crate::error::Result;

/// Cache gateway for the canonical asset collection.
///
/// A corrupt or unreadable snapshot must surface as
/// [`BridgeError::CorruptCache`](crate::error::BridgeError::CorruptCache)
/// rather than an empty list, so the core can tell "no data" apart from
/// "error" and fall back to a full fetch.
#[async_trait]
pub trait AssetCache: Send + Sync {
    /// Whether a snapshot exists and passes the implementation's validity
    /// check. Read once per sync cycle at most.
    async fn is_valid(&self) -> bool;

    /// Load the cached collection.
    async fn load(&self) -> Result<Vec<Asset>>;

    /// Persist a full collection snapshot, replacing any previous one.
    async fn store(&self, assets: &[Asset]) -> Result<()>;

    /// The cursor persisted alongside the last stored snapshot, if any.
    async fn cursor(&self) -> Result<Option<SyncCursor>>;

    /// Persist the cursor for the next incremental remote fetch.
    async fn store_cursor(&self, cursor: &SyncCursor) -> Result<()>;
}
