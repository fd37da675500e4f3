//! Asset Domain Model
//!
//! Identity and provenance record for one photo or video, shared between the
//! core and every host bridge. An asset may be local-only (present on the
//! originating device, not yet confirmed on the server), remote-only, or both.
//! A local-only and a remote copy of the same physical photo are currently
//! kept as two records; they are never unified into one entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity and provenance record for one photo/video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Canonical identifier. Stable once the asset is remote-known; for
    /// local-only assets this carries the device-local identifier.
    pub id: String,

    /// Identifier as known to the originating device.
    pub device_asset_id: String,

    /// Identifier of the originating device.
    pub device_id: String,

    /// Whether the asset is backed by a device-local file.
    pub is_local: bool,

    /// Whether the asset is known to the server.
    pub is_remote: bool,

    /// Capture/creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Favorite flag as last confirmed by the server.
    pub is_favorite: bool,
}

impl Asset {
    /// Present on the originating device but not yet confirmed on the server.
    pub fn is_local_only(&self) -> bool {
        self.is_local && !self.is_remote
    }

    /// Identity key for local-only entries.
    pub fn local_key(&self) -> (&str, &str) {
        (self.device_id.as_str(), self.device_asset_id.as_str())
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Asset({}, local={}, remote={})",
            self.id, self.is_local, self.is_remote
        )
    }
}

/// Opaque change-token (ETag-like) representing the last successfully
/// observed remote snapshot. Supplied to the next remote fetch to request
/// only the delta.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncCursor(pub String);

impl SyncCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SyncCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: &str, local: bool, remote: bool) -> Asset {
        Asset {
            id: id.to_string(),
            device_asset_id: id.to_string(),
            device_id: "device-1".to_string(),
            is_local: local,
            is_remote: remote,
            created_at: Utc::now(),
            is_favorite: false,
        }
    }

    #[test]
    fn test_local_only_classification() {
        assert!(asset("a", true, false).is_local_only());
        assert!(!asset("b", true, true).is_local_only());
        assert!(!asset("c", false, true).is_local_only());
    }

    #[test]
    fn test_asset_serde_round_trip() {
        let original = asset("a1", true, false);
        let json = serde_json::to_string(&original).unwrap();
        let restored: Asset = serde_json::from_str(&json).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_cursor_is_serde_transparent() {
        let cursor = SyncCursor::new("etag-123");
        assert_eq!(serde_json::to_string(&cursor).unwrap(), "\"etag-123\"");
    }
}
