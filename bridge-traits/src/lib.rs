//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the reconciliation core and the
//! platform-specific collaborators it consumes. Each trait represents a
//! capability the core requires but that must be implemented differently per
//! platform (desktop, iOS, Android):
//!
//! - [`AssetCache`](cache::AssetCache) - Persistence of the last known asset
//!   collection and the incremental sync cursor
//! - [`LocalLibrary`](library::LocalLibrary) - Device photo/video inventory
//! - [`RemoteLibrary`](library::RemoteLibrary) - Server inventory, batched
//!   deletion, favorite updates
//! - [`DeviceDeleter`](device::DeviceDeleter) - Device-level asset removal
//! - [`DeviceInfo`](device::DeviceInfo) - Identity of the running device
//!
//! The shared [`Asset`](asset::Asset) domain model and the opaque
//! [`SyncCursor`](asset::SyncCursor) change-token also live here, since both
//! the core and every bridge implementation speak them.
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Implementations should convert platform-specific errors to `BridgeError`
//! and provide actionable messages. A corrupt cache snapshot must surface as
//! `BridgeError::CorruptCache`, never as an empty collection.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent
//! usage across async tasks.

pub mod asset;
pub mod cache;
pub mod device;
pub mod error;
pub mod library;

pub use error::BridgeError;

// Re-export commonly used types
pub use asset::{Asset, SyncCursor};
pub use cache::AssetCache;
pub use device::{DeviceDeleter, DeviceInfo};
pub use library::{LocalLibrary, RemoteDeleteOutcome, RemoteDeleteStatus, RemoteLibrary};
