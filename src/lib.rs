//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (e.g., `core-sync`, `core-runtime`). Host applications can
//! depend on `gallery-core-workspace` and enable the documented features
//! without needing to wire each crate individually.

#[cfg(feature = "sync")]
pub use core_runtime;
#[cfg(feature = "sync")]
pub use core_sync;
