//! # Canonical Asset Collection State
//!
//! The ordered, deduplicated view over both inventories. Two invariants hold
//! for every reachable state:
//!
//! - **Ordering**: every local-only asset occupies a position strictly before
//!   every remote asset. The coordinator's split-point optimization depends
//!   on this.
//! - **Uniqueness**: no two remote entries share an `id`; local-only entries
//!   are keyed by `(device_id, device_asset_id)`.
//!
//! The state is created empty, replaced wholesale after each successful
//! reconciliation and patched in place by the mutation handlers. Consumers
//! always observe either the prior full state or the next full state.

use std::collections::HashSet;

use bridge_traits::Asset;

/// Canonical ordered sequence of assets.
#[derive(Debug, Default)]
pub struct AssetCollectionState {
    assets: Vec<Asset>,
}

impl AssetCollectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Index of the first remote asset, or the length if none: the split
    /// point separating local-only assets from remote assets.
    pub fn remote_begin(&self) -> usize {
        self.assets
            .iter()
            .position(|asset| asset.is_remote)
            .unwrap_or(self.assets.len())
    }

    /// The previously known local assets (everything before the split point).
    pub fn local_slice(&self) -> &[Asset] {
        &self.assets[..self.remote_begin()]
    }

    /// The previously known remote assets (everything from the split point).
    pub fn remote_slice(&self) -> &[Asset] {
        &self.assets[self.remote_begin()..]
    }

    /// Replace the whole collection.
    pub fn replace(&mut self, assets: Vec<Asset>) {
        debug_assert!(Self::is_ordered(&assets));
        self.assets = assets;
    }

    /// Ordering invariant check: once a remote asset appears, everything
    /// after it is remote too.
    pub fn is_ordered(assets: &[Asset]) -> bool {
        let split = assets
            .iter()
            .position(|asset| asset.is_remote)
            .unwrap_or(assets.len());
        assets[split..].iter().all(|asset| asset.is_remote)
    }

    /// Uniqueness invariant check: remote ids unique, local-only entries
    /// unique by `(device_id, device_asset_id)`.
    pub fn is_unique(assets: &[Asset]) -> bool {
        let mut remote_ids = HashSet::new();
        let mut local_keys = HashSet::new();
        for asset in assets {
            if asset.is_remote {
                if !remote_ids.insert(asset.id.as_str()) {
                    return false;
                }
            } else if !local_keys.insert(asset.local_key()) {
                return false;
            }
        }
        true
    }
}

/// Order-insensitive comparison of two local asset lists by local identity
/// key, used by the coordinator's short-circuit rule.
pub(crate) fn same_local_set(a: &[Asset], b: &[Asset]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let keys: HashSet<(&str, &str)> = a.iter().map(Asset::local_key).collect();
    b.iter().all(|asset| keys.contains(&asset.local_key()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

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
    fn test_remote_begin_on_mixed_state() {
        let mut state = AssetCollectionState::new();
        state.replace(vec![
            asset("l1", true, false),
            asset("l2", true, false),
            asset("r1", false, true),
        ]);
        assert_eq!(state.remote_begin(), 2);
        assert_eq!(state.local_slice().len(), 2);
        assert_eq!(state.remote_slice().len(), 1);
    }

    #[test]
    fn test_remote_begin_without_remotes_is_len() {
        let mut state = AssetCollectionState::new();
        state.replace(vec![asset("l1", true, false)]);
        assert_eq!(state.remote_begin(), 1);
        assert!(state.remote_slice().is_empty());
    }

    #[test]
    fn test_empty_state() {
        let state = AssetCollectionState::new();
        assert!(state.is_empty());
        assert_eq!(state.remote_begin(), 0);
    }

    #[test]
    fn test_ordering_check() {
        let ok = vec![asset("l1", true, false), asset("r1", false, true)];
        assert!(AssetCollectionState::is_ordered(&ok));

        let broken = vec![asset("r1", false, true), asset("l1", true, false)];
        assert!(!AssetCollectionState::is_ordered(&broken));
    }

    #[test]
    fn test_uniqueness_check() {
        let ok = vec![asset("l1", true, false), asset("r1", false, true)];
        assert!(AssetCollectionState::is_unique(&ok));

        let dup_remote = vec![asset("r1", false, true), asset("r1", false, true)];
        assert!(!AssetCollectionState::is_unique(&dup_remote));

        let dup_local = vec![asset("l1", true, false), asset("l1", true, false)];
        assert!(!AssetCollectionState::is_unique(&dup_local));
    }

    #[test]
    fn test_same_local_set_is_order_insensitive() {
        let a = vec![asset("l1", true, false), asset("l2", true, false)];
        let b = vec![asset("l2", true, false), asset("l1", true, false)];
        assert!(same_local_set(&a, &b));
        assert!(!same_local_set(&a, &b[..1]));
        assert!(!same_local_set(&a, &[asset("l3", true, false), asset("l1", true, false)]));
    }
}
