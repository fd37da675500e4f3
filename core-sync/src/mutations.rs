//! # Mutation Handlers
//!
//! Single-asset mutations applied against the canonical collection while
//! preserving its ordering and uniqueness invariants: upload confirmation,
//! batched deletion and the favorite toggle.
//!
//! Deletion shares the coordinator's single-flight guard with `run_sync`;
//! every state patch runs against the latest committed collection under one
//! write-lock acquisition, so concurrent handlers cannot lose each other's
//! commits. Partial success is the steady state for device/network-dependent
//! batches, so per-item faults are absorbed and logged rather than aborting
//! anything.

use std::collections::HashSet;

use bridge_traits::{Asset, RemoteDeleteStatus};
use core_runtime::events::{AssetEvent, CoreEvent};
use tracing::{debug, instrument, warn};

use crate::coordinator::AssetSyncCoordinator;

impl AssetSyncCoordinator {
    /// Apply an upload confirmation for one asset.
    ///
    /// The first entry that is already remote, or that matches `new_asset`
    /// by `(device_asset_id, device_id)`, anchors the update: when it
    /// carries the same `device_asset_id` it is removed as the now-confirmed
    /// local copy. The uploaded asset is appended at the tail either way, so
    /// every remote asset (including this one) keeps trailing all remaining
    /// local-only assets. The local and remote records are not unified into
    /// one entry.
    #[instrument(skip(self, new_asset), fields(asset_id = %new_asset.id))]
    pub async fn on_asset_uploaded(&self, new_asset: Asset) {
        let asset_id = new_asset.id.clone();
        self.mutate_state(move |assets| {
            let anchor = assets.iter().position(|asset| {
                asset.is_remote
                    || (asset.device_asset_id == new_asset.device_asset_id
                        && asset.device_id == new_asset.device_id)
            });
            if let Some(index) = anchor {
                if assets[index].device_asset_id == new_asset.device_asset_id {
                    assets.remove(index);
                }
            }
            assets.push(new_asset);
            true
        })
        .await;

        self.event_bus
            .emit(CoreEvent::Asset(AssetEvent::Uploaded { asset_id }))
            .ok();
    }

    /// Delete a batch of assets from the device and/or the server.
    ///
    /// Mutually exclusive with `run_sync` via the shared single-flight
    /// guard; a busy guard makes this a no-op. The two sub-deletions run
    /// concurrently and confirm independently:
    ///
    /// - device-level deletion for every target still backed by a local
    ///   file (per-item failures are logged by the bridge and simply
    ///   missing from the confirmed ids)
    /// - one batched remote deletion for every remote-flagged target,
    ///   counting only per-item `Success` statuses
    ///
    /// Only the union of confirmed ids leaves the collection; targets that
    /// failed on both sides remain present.
    #[instrument(skip(self, targets), fields(target_count = targets.len()))]
    pub async fn delete_assets(&self, targets: Vec<Asset>) {
        let Ok(_guard) = self.op_guard.try_lock() else {
            debug!("sync or deletion already in flight, skipping");
            return;
        };

        let device_ids: Vec<String> = targets
            .iter()
            .filter(|asset| asset.is_local)
            .map(|asset| asset.id.clone())
            .collect();
        let remote_targets: Vec<Asset> = targets
            .iter()
            .filter(|asset| asset.is_remote)
            .cloned()
            .collect();

        let device_deletion = async {
            if device_ids.is_empty() {
                return Vec::new();
            }
            match self.device_deleter.delete_assets(&device_ids).await {
                Ok(confirmed) => confirmed,
                Err(e) => {
                    warn!("device deletion failed, nothing confirmed: {}", e);
                    Vec::new()
                }
            }
        };
        let remote_deletion = async {
            if remote_targets.is_empty() {
                return Vec::new();
            }
            match self.remote_library.delete_assets(&remote_targets).await {
                Ok(outcomes) => outcomes
                    .into_iter()
                    .filter(|outcome| outcome.status == RemoteDeleteStatus::Success)
                    .map(|outcome| outcome.id)
                    .collect(),
                Err(e) => {
                    warn!("remote deletion failed, nothing confirmed: {}", e);
                    Vec::new()
                }
            }
        };
        let (device_confirmed, remote_confirmed) =
            tokio::join!(device_deletion, remote_deletion);

        let confirmed: HashSet<String> = device_confirmed
            .into_iter()
            .chain(remote_confirmed)
            .collect();
        if confirmed.is_empty() {
            debug!("no deletions confirmed, state unchanged");
            return;
        }

        self.mutate_state(|assets| {
            let before = assets.len();
            assets.retain(|asset| !confirmed.contains(&asset.id));
            assets.len() != before
        })
        .await;

        let mut asset_ids: Vec<String> = confirmed.into_iter().collect();
        asset_ids.sort();
        self.event_bus
            .emit(CoreEvent::Asset(AssetEvent::Deleted { asset_ids }))
            .ok();
    }

    /// Set the favorite flag of one asset through the server.
    ///
    /// On failure the state stays untouched and the prior flag is returned.
    /// On success the server's copy replaces the entry with the same id
    /// (when present) and the resulting flag is returned.
    #[instrument(skip(self, asset), fields(asset_id = %asset.id, desired))]
    pub async fn toggle_favorite(&self, asset: &Asset, desired: bool) -> bool {
        let updated = match self.remote_library.set_favorite(asset, desired).await {
            Ok(updated) => updated,
            Err(e) => {
                warn!("favorite update failed, keeping prior flag: {}", e);
                return asset.is_favorite;
            }
        };

        let committed = self
            .mutate_state(|assets| match assets.iter().position(|a| a.id == updated.id) {
                Some(index) => {
                    assets[index] = updated.clone();
                    true
                }
                None => false,
            })
            .await;
        if !committed {
            warn!(asset_id = %updated.id, "favorite updated for asset not in state");
        }

        let is_favorite = updated.is_favorite;
        self.event_bus
            .emit(CoreEvent::Asset(AssetEvent::FavoriteChanged {
                asset_id: updated.id,
                is_favorite,
            }))
            .ok();
        is_favorite
    }
}
