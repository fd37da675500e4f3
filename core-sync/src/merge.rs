//! # Reconciliation Engine
//!
//! Pure combination of the device-local and server-held asset lists under
//! the upload-dedup rule. Free of side effects and shared state, so the
//! coordinator can run it on the blocking pool without blocking the caller.

use std::collections::HashSet;

use bridge_traits::Asset;

/// Combine a local and a remote asset list into one canonical sequence.
///
/// A local asset is dropped when a remote asset with the same
/// `device_asset_id` originates from this device (`own_device_id`), since
/// that local copy is already confirmed present on the server. Everything
/// else survives.
///
/// The output order is a hard contract: all surviving local assets first,
/// then all remote assets, each group preserving its input relative order.
/// The split-point optimization in the coordinator relies on it.
///
/// Duplicate ids within `local` or `remote` themselves are not deduplicated
/// here; fetchers are assumed to return id-unique lists.
pub fn merge_asset_lists(
    local: Vec<Asset>,
    remote: Vec<Asset>,
    own_device_id: &str,
) -> Vec<Asset> {
    if local.is_empty() || remote.is_empty() {
        let mut combined = local;
        combined.extend(remote);
        return combined;
    }

    let uploaded: HashSet<&str> = remote
        .iter()
        .filter(|asset| asset.device_id == own_device_id)
        .map(|asset| asset.device_asset_id.as_str())
        .collect();

    let mut combined: Vec<Asset> = local
        .into_iter()
        .filter(|asset| !uploaded.contains(asset.id.as_str()))
        .collect();
    combined.extend(remote);
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const DEVICE: &str = "device-1";

    fn local_asset(id: &str) -> Asset {
        Asset {
            id: id.to_string(),
            device_asset_id: id.to_string(),
            device_id: DEVICE.to_string(),
            is_local: true,
            is_remote: false,
            created_at: Utc::now(),
            is_favorite: false,
        }
    }

    fn remote_asset(id: &str, device_asset_id: &str, device_id: &str) -> Asset {
        Asset {
            id: id.to_string(),
            device_asset_id: device_asset_id.to_string(),
            device_id: device_id.to_string(),
            is_local: false,
            is_remote: true,
            created_at: Utc::now(),
            is_favorite: false,
        }
    }

    fn ids(assets: &[Asset]) -> Vec<&str> {
        assets.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_empty_local_passes_remote_through() {
        let remote = vec![remote_asset("r1", "a1", DEVICE)];
        let merged = merge_asset_lists(Vec::new(), remote.clone(), DEVICE);
        assert_eq!(merged, remote);
    }

    #[test]
    fn test_empty_remote_passes_local_through() {
        let local = vec![local_asset("a1"), local_asset("a2")];
        let merged = merge_asset_lists(local.clone(), Vec::new(), DEVICE);
        assert_eq!(merged, local);
    }

    #[test]
    fn test_both_empty() {
        assert!(merge_asset_lists(Vec::new(), Vec::new(), DEVICE).is_empty());
    }

    #[test]
    fn test_own_upload_drops_local_copy() {
        // State [L1(a1), L2(a2)], remote returns R1 which is this device's
        // upload of a1: expected [L2, R1].
        let local = vec![local_asset("a1"), local_asset("a2")];
        let remote = vec![remote_asset("r1", "a1", DEVICE)];

        let merged = merge_asset_lists(local, remote, DEVICE);
        assert_eq!(ids(&merged), vec!["a2", "r1"]);
    }

    #[test]
    fn test_other_devices_uploads_do_not_dedup() {
        let local = vec![local_asset("a1")];
        let remote = vec![remote_asset("r1", "a1", "device-2")];

        let merged = merge_asset_lists(local, remote, DEVICE);
        assert_eq!(ids(&merged), vec!["a1", "r1"]);
    }

    #[test]
    fn test_locals_precede_remotes_preserving_order() {
        let local = vec![local_asset("a1"), local_asset("a2"), local_asset("a3")];
        let remote = vec![
            remote_asset("r1", "a2", DEVICE),
            remote_asset("r2", "b9", "device-2"),
        ];

        let merged = merge_asset_lists(local, remote, DEVICE);
        assert_eq!(ids(&merged), vec!["a1", "a3", "r1", "r2"]);

        let first_remote = merged.iter().position(|a| a.is_remote).unwrap();
        assert!(merged[..first_remote].iter().all(|a| a.is_local_only()));
        assert!(merged[first_remote..].iter().all(|a| a.is_remote));
    }

    #[test]
    fn test_dedup_property_over_many_shapes() {
        // No surviving local asset may share a device_asset_id with one of
        // this device's own remote uploads.
        let local: Vec<Asset> = (0..20).map(|i| local_asset(&format!("a{i}"))).collect();
        let remote: Vec<Asset> = (0..20)
            .map(|i| {
                let owner = if i % 3 == 0 { DEVICE } else { "device-2" };
                remote_asset(&format!("r{i}"), &format!("a{i}"), owner)
            })
            .collect();

        let own_uploads: HashSet<&str> = remote
            .iter()
            .filter(|r| r.device_id == DEVICE)
            .map(|r| r.device_asset_id.as_str())
            .collect();

        let merged = merge_asset_lists(local, remote.clone(), DEVICE);
        for asset in merged.iter().filter(|a| a.is_local_only()) {
            assert!(!own_uploads.contains(asset.device_asset_id.as_str()));
        }
        // Every remote asset survives untouched at the tail.
        assert_eq!(&merged[merged.len() - remote.len()..], remote.as_slice());
    }
}
