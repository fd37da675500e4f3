//! Local and Remote Library Abstractions
//!
//! Source fetchers for the two asset inventories the core reconciles, plus
//! the remote mutation endpoints (batch delete, favorite update). Transport
//! details, authentication and wire formats live entirely in the
//! implementations.
//!
//! Both fetchers distinguish "no change since the last observation"
//! (`None`) from an empty inventory (`Some(vec![])`). The core relies on
//! that distinction for its short-circuit rule.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::asset::{Asset, SyncCursor};
use crate::error::Result;

/// Per-item status of a batched remote deletion.
///
/// Partial batch failure is expected; the server answers for every
/// submitted asset individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteDeleteStatus {
    Success,
    Failure,
}

/// One entry of a batched remote deletion response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDeleteOutcome {
    pub id: String,
    pub status: RemoteDeleteStatus,
}

/// Device-local photo/video inventory.
#[async_trait]
pub trait LocalLibrary: Send + Sync {
    /// Fetch the device-local asset list.
    ///
    /// `urgent` hints that the result is latency-critical because no cache
    /// backstop exists for this cycle. Returns `Ok(None)` when the device
    /// inventory is unchanged since the last fetch.
    async fn fetch_assets(&self, urgent: bool) -> Result<Option<Vec<Asset>>>;
}

/// Server-held asset inventory and remote mutations.
#[async_trait]
pub trait RemoteLibrary: Send + Sync {
    /// Fetch the remote asset list.
    ///
    /// When `cursor` is present, the server may answer `(None, new_cursor)`
    /// meaning "no change since that snapshot". Without a cursor the server
    /// returns the full inventory.
    async fn fetch_assets(
        &self,
        cursor: Option<SyncCursor>,
    ) -> Result<(Option<Vec<Asset>>, SyncCursor)>;

    /// Submit one batched deletion for the given assets.
    ///
    /// The response carries one status per submitted asset; a per-item
    /// failure never fails the batch.
    async fn delete_assets(&self, assets: &[Asset]) -> Result<Vec<RemoteDeleteOutcome>>;

    /// Update the favorite flag of one asset and return the server's copy.
    async fn set_favorite(&self, asset: &Asset, favorite: bool) -> Result<Asset>;
}
