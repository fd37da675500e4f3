//! # Asset Sync Module
//!
//! Reconciles the device-local photo/video inventory and the server-held
//! inventory into one consistent, ordered, deduplicated collection, while
//! minimizing redundant network and device I/O through an incremental cache
//! and a cursor-based change protocol.
//!
//! ## Components
//!
//! - **Reconciliation Engine** (`merge`): pure combination of the local and
//!   remote lists under the upload-dedup rule
//! - **Canonical State** (`state`): the ordered collection plus its
//!   invariant helpers (local-only assets strictly precede remote assets)
//! - **Sync Coordinator** (`coordinator`): orchestrates one single-flight
//!   sync cycle (cache check, parallel fetch, short-circuit, merge, commit)
//! - **Mutation Handlers** (`mutations`): upload confirmation, batched
//!   deletion with per-item partial success, favorite toggle
//!
//! Every external collaborator (cache gateway, source fetchers, device
//! deletion, device identity) is consumed through the `bridge-traits`
//! crate; change notifications flow through the `core-runtime` event bus.

pub mod coordinator;
pub mod error;
pub mod merge;
pub mod mutations;
pub mod state;

pub use coordinator::{AssetSyncCoordinator, SyncConfig};
pub use error::{Result, SyncError};
pub use merge::merge_asset_lists;
pub use state::AssetCollectionState;
