//! # Event Bus System
//!
//! Provides an event-driven architecture for the gallery platform core using
//! `tokio::sync::broadcast`. Every committed mutation of the canonical asset
//! collection is announced here so presentation layers and other consumers
//! can react without being wired into the core.
//!
//! ## Usage
//!
//! ### Publishing Events
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, SyncEvent};
//!
//! # let event_bus = EventBus::new(100);
//! let event = CoreEvent::Sync(SyncEvent::Started { cache_valid: true });
//! event_bus.emit(event).ok();
//! ```
//!
//! ### Subscribing to Events
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent};
//! use tokio::sync::broadcast::error::RecvError;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! tokio::spawn(async move {
//!     loop {
//!         match stream.recv().await {
//!             Ok(event) => println!("Received: {:?}", event),
//!             Err(RecvError::Lagged(n)) => eprintln!("Missed {} events", n),
//!             Err(RecvError::Closed) => break,
//!         }
//!     }
//! });
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: subscriber was too slow and missed `n`
//!   events. Non-fatal; the subscriber keeps receiving new events.
//! - **`RecvError::Closed`**: all senders dropped, treat as shutdown.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that fall behind by more than this receive
/// `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Sync-cycle events
    Sync(SyncEvent),
    /// Asset collection mutation events
    Asset(AssetEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Sync(e) => e.description(),
            CoreEvent::Asset(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Sync(SyncEvent::Failed { .. }) => EventSeverity::Error,
            CoreEvent::Sync(SyncEvent::Completed { .. }) => EventSeverity::Info,
            CoreEvent::Asset(AssetEvent::Deleted { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Sync Events
// ============================================================================

/// Events emitted over the lifetime of one sync cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SyncEvent {
    /// A sync cycle started.
    Started {
        /// Whether a valid cache snapshot backs this cycle.
        cache_valid: bool,
    },
    /// The empty state was seeded from the cached collection.
    HydratedFromCache {
        /// Number of assets loaded from the cache.
        asset_count: usize,
    },
    /// Both inventories were unchanged; the cycle ended without any work.
    NoChange,
    /// The merged collection was committed.
    Completed {
        /// Size of the committed collection.
        asset_count: usize,
        /// Wall-clock duration of the cycle.
        duration_ms: u64,
    },
    /// The cycle aborted; state and cursor are untouched.
    Failed {
        /// Human-readable error message.
        message: String,
    },
}

impl SyncEvent {
    fn description(&self) -> &str {
        match self {
            SyncEvent::Started { .. } => "Sync started",
            SyncEvent::HydratedFromCache { .. } => "State hydrated from cache",
            SyncEvent::NoChange => "Sync skipped, no changes",
            SyncEvent::Completed { .. } => "Sync completed successfully",
            SyncEvent::Failed { .. } => "Sync failed",
        }
    }
}

// ============================================================================
// Asset Events
// ============================================================================

/// Events emitted on committed mutations of the asset collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AssetEvent {
    /// An upload was confirmed and the collection re-ordered accordingly.
    Uploaded {
        /// Canonical id of the uploaded asset.
        asset_id: String,
    },
    /// Confirmed deletions were removed from the collection.
    Deleted {
        /// Canonical ids confirmed deleted (device and/or server).
        asset_ids: Vec<String>,
    },
    /// A favorite update was confirmed by the server.
    FavoriteChanged {
        /// Canonical id of the updated asset.
        asset_id: String,
        /// Resulting favorite flag.
        is_favorite: bool,
    },
    /// The whole collection was replaced by a commit.
    StateReplaced {
        /// Size of the new collection.
        asset_count: usize,
    },
}

impl AssetEvent {
    fn description(&self) -> &str {
        match self {
            AssetEvent::Uploaded { .. } => "Asset upload confirmed",
            AssetEvent::Deleted { .. } => "Assets deleted",
            AssetEvent::FavoriteChanged { .. } => "Favorite flag changed",
            AssetEvent::StateReplaced { .. } => "Asset collection replaced",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received the event, or
    /// `SendError` when there are none. Emitters that don't care whether
    /// anyone listens call `.ok()` on the result.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Create a new subscription to all future events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}
