//! Device Platform Abstractions
//!
//! Device identity and the device-level deletion API. Implementations wrap
//! the platform photo-library SDK (PhotoKit, MediaStore, ...).

use async_trait::async_trait;

use crate::error::Result;

/// Identity of the currently running device.
pub trait DeviceInfo: Send + Sync {
    /// Stable identifier of this device, as it appears in the `device_id`
    /// field of assets uploaded from here.
    fn device_id(&self) -> String;
}

/// Device-level asset deletion.
#[async_trait]
pub trait DeviceDeleter: Send + Sync {
    /// Attempt to delete the given assets from the device photo library.
    ///
    /// Returns the ids the device confirms removed. A per-item failure is
    /// logged by the implementation and simply missing from the returned
    /// list; it never raises.
    async fn delete_assets(&self, ids: &[String]) -> Result<Vec<String>>;
}
