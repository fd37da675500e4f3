use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// A source fetch failed or timed out; the cycle aborts with state and
    /// cursor untouched.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// The background merge task could not be joined.
    #[error("Merge task failed: {0}")]
    MergeTask(String),

    /// A bridge fault the coordinator chose not to absorb.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
