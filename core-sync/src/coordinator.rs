//! # Sync Coordinator
//!
//! Orchestrates one full sync cycle over the two asset inventories:
//!
//! 1. Seed the empty state from the cache when a valid snapshot exists
//! 2. Fetch the device-local and server inventories concurrently (the
//!    remote fetch is cursor-based and may answer "no change")
//! 3. Short-circuit when neither inventory changed
//! 4. Otherwise reconcile both lists on the blocking pool and commit the
//!    merged collection, the cache snapshot and the new cursor
//!
//! `run_sync` is single-flight: while a sync or a deletion is in progress,
//! another call returns immediately as a no-op instead of queuing. That is a
//! correctness requirement: the split-point computation in step 2 assumes a
//! stable state snapshot for the whole cycle. The guard is an RAII lock
//! guard, so it releases on every exit path including errors.
//!
//! A fetch failure aborts the cycle with state and cursor untouched; a cache
//! fault never does (the coordinator falls back to a full fetch instead).

use std::sync::Arc;
use std::time::{Duration, Instant};

use bridge_traits::{
    Asset, AssetCache, DeviceDeleter, DeviceInfo, LocalLibrary, RemoteLibrary, SyncCursor,
};
use core_runtime::events::{AssetEvent, CoreEvent, EventBus, Receiver, SyncEvent};
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

use crate::merge::merge_asset_lists;
use crate::state::{same_local_set, AssetCollectionState};
use crate::{Result, SyncError};

/// Sync coordinator configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Timeout applied to each source fetch (seconds). A timeout surfaces
    /// as the same error class as a fetch failure. `None` disables it.
    pub fetch_timeout_secs: Option<u64>,

    /// Event bus buffer size.
    pub event_buffer_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: Some(120),
            event_buffer_size: core_runtime::events::DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

/// Coordinator owning the canonical asset collection.
///
/// All state mutation is serialized through this owner; fetches and the pure
/// merge run concurrently but commit through one write lock. Consumers get
/// read-only snapshots via [`current_state`](Self::current_state) and change
/// notifications via [`subscribe`](Self::subscribe).
pub struct AssetSyncCoordinator {
    pub(crate) config: SyncConfig,

    /// Cache gateway for the collection snapshot and the sync cursor.
    pub(crate) cache: Arc<dyn AssetCache>,

    /// Device-local inventory fetcher.
    pub(crate) local_library: Arc<dyn LocalLibrary>,

    /// Server inventory fetcher and remote mutation endpoints.
    pub(crate) remote_library: Arc<dyn RemoteLibrary>,

    /// Device-level deletion API.
    pub(crate) device_deleter: Arc<dyn DeviceDeleter>,

    /// Identity of the running device, used by the dedup rule.
    pub(crate) device_info: Arc<dyn DeviceInfo>,

    /// Change notifications for every committed mutation.
    pub(crate) event_bus: EventBus,

    /// Canonical state. Writers hold the lock only for the swap itself, so
    /// readers see either the prior or the next full collection.
    pub(crate) state: RwLock<AssetCollectionState>,

    /// Single-flight guard shared by `run_sync` and `delete_assets`.
    pub(crate) op_guard: Mutex<()>,
}

impl AssetSyncCoordinator {
    pub fn new(
        config: SyncConfig,
        cache: Arc<dyn AssetCache>,
        local_library: Arc<dyn LocalLibrary>,
        remote_library: Arc<dyn RemoteLibrary>,
        device_deleter: Arc<dyn DeviceDeleter>,
        device_info: Arc<dyn DeviceInfo>,
    ) -> Self {
        let event_bus = EventBus::new(config.event_buffer_size);
        Self {
            config,
            cache,
            local_library,
            remote_library,
            device_deleter,
            device_info,
            event_bus,
            state: RwLock::new(AssetCollectionState::new()),
            op_guard: Mutex::new(()),
        }
    }

    /// Read-only snapshot of the canonical collection.
    pub async fn current_state(&self) -> Vec<Asset> {
        self.state.read().await.assets().to_vec()
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    /// Run one full sync cycle.
    ///
    /// Returns `Ok(())` without doing anything when a sync or a deletion is
    /// already in flight. A fetch failure propagates and leaves state and
    /// cursor untouched.
    #[instrument(skip(self))]
    pub async fn run_sync(&self) -> Result<()> {
        let Ok(_guard) = self.op_guard.try_lock() else {
            debug!("sync or deletion already in flight, skipping");
            return Ok(());
        };

        match self.run_sync_cycle().await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("sync cycle failed: {}", e);
                self.event_bus
                    .emit(CoreEvent::Sync(SyncEvent::Failed {
                        message: e.to_string(),
                    }))
                    .ok();
                Err(e)
            }
        }
    }

    async fn run_sync_cycle(&self) -> Result<()> {
        let started = Instant::now();
        let mut cache_valid = self.cache.is_valid().await;
        self.event_bus
            .emit(CoreEvent::Sync(SyncEvent::Started { cache_valid }))
            .ok();

        // Seed the empty state from the cache. A corrupt snapshot is
        // recoverable: fall through to a full fetch.
        if cache_valid && self.state.read().await.is_empty() {
            match self.cache.load().await {
                Ok(cached) => {
                    let asset_count = cached.len();
                    self.state.write().await.replace(cached);
                    info!(asset_count, "hydrated state from cache");
                    self.event_bus
                        .emit(CoreEvent::Sync(SyncEvent::HydratedFromCache { asset_count }))
                        .ok();
                }
                Err(e) => {
                    warn!("cache load failed, falling back to full fetch: {}", e);
                    cache_valid = false;
                }
            }
        }

        // Split-point snapshot for this cycle.
        let (current_local, current_remote) = {
            let state = self.state.read().await;
            (state.local_slice().to_vec(), state.remote_slice().to_vec())
        };

        // An invalid cache forces a full remote re-fetch with no cursor.
        let cursor = if cache_valid {
            match self.cache.cursor().await {
                Ok(cursor) => cursor,
                Err(e) => {
                    warn!("cursor load failed, forcing full remote fetch: {}", e);
                    None
                }
            }
        } else {
            None
        };

        // Both fetches have independent latencies; run them concurrently.
        // The local fetch is urgent when no cache backstop exists.
        let (local_result, (remote_result, new_cursor)) = tokio::try_join!(
            self.fetch_local(!cache_valid),
            self.fetch_remote(cursor)
        )?;

        let local_unchanged = match &local_result {
            None => true,
            Some(fetched) => same_local_set(fetched, &current_local),
        };
        if remote_result.is_none() && local_unchanged {
            debug!("no changes detected, skipping merge and cache write");
            self.event_bus.emit(CoreEvent::Sync(SyncEvent::NoChange)).ok();
            return Ok(());
        }

        // Substitute "no change" sides from the current state slices.
        let local = local_result.unwrap_or(current_local);
        let remote = remote_result.unwrap_or(current_remote);

        let own_device_id = self.device_info.device_id();
        let merged = tokio::task::spawn_blocking(move || {
            merge_asset_lists(local, remote, &own_device_id)
        })
        .await
        .map_err(|e| SyncError::MergeTask(e.to_string()))?;

        let asset_count = self.commit_state(merged).await;
        if let Err(e) = self.cache.store_cursor(&new_cursor).await {
            warn!("failed to persist sync cursor: {}", e);
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        info!(asset_count, duration_ms, "sync completed");
        self.event_bus
            .emit(CoreEvent::Sync(SyncEvent::Completed {
                asset_count,
                duration_ms,
            }))
            .ok();

        Ok(())
    }

    async fn fetch_local(&self, urgent: bool) -> Result<Option<Vec<Asset>>> {
        let fetch = self.local_library.fetch_assets(urgent);
        let result = match self.fetch_limit() {
            Some(limit) => timeout(limit, fetch)
                .await
                .map_err(|_| SyncError::Fetch("device library fetch timed out".to_string()))?,
            None => fetch.await,
        };
        result.map_err(|e| SyncError::Fetch(format!("device library fetch failed: {e}")))
    }

    async fn fetch_remote(
        &self,
        cursor: Option<SyncCursor>,
    ) -> Result<(Option<Vec<Asset>>, SyncCursor)> {
        let fetch = self.remote_library.fetch_assets(cursor);
        let result = match self.fetch_limit() {
            Some(limit) => timeout(limit, fetch)
                .await
                .map_err(|_| SyncError::Fetch("remote library fetch timed out".to_string()))?,
            None => fetch.await,
        };
        result.map_err(|e| SyncError::Fetch(format!("remote library fetch failed: {e}")))
    }

    fn fetch_limit(&self) -> Option<Duration> {
        self.config.fetch_timeout_secs.map(Duration::from_secs)
    }

    /// Replace the canonical state and persist the snapshot.
    ///
    /// Cache persistence failures are logged, never fatal; the in-memory
    /// commit already happened and the next successful cycle rewrites the
    /// snapshot anyway. Returns the committed collection size.
    pub(crate) async fn commit_state(&self, assets: Vec<Asset>) -> usize {
        let asset_count = assets.len();
        let snapshot = assets.clone();
        self.state.write().await.replace(assets);

        if let Err(e) = self.cache.store(&snapshot).await {
            warn!("failed to persist asset cache: {}", e);
        }
        self.event_bus
            .emit(CoreEvent::Asset(AssetEvent::StateReplaced { asset_count }))
            .ok();
        asset_count
    }

    /// Apply a patch to the canonical collection and persist the result.
    ///
    /// The patch runs against the latest committed collection under a single
    /// write-lock acquisition, so concurrent mutations never overwrite each
    /// other with stale copies. A patch that reports no change leaves the
    /// state, the cache and the subscribers untouched. Returns whether a
    /// commit happened.
    pub(crate) async fn mutate_state<F>(&self, apply: F) -> bool
    where
        F: FnOnce(&mut Vec<Asset>) -> bool + Send,
    {
        let snapshot = {
            let mut state = self.state.write().await;
            let mut assets = state.assets().to_vec();
            if !apply(&mut assets) {
                return false;
            }
            state.replace(assets);
            state.assets().to_vec()
        };

        if let Err(e) = self.cache.store(&snapshot).await {
            warn!("failed to persist asset cache: {}", e);
        }
        self.event_bus
            .emit(CoreEvent::Asset(AssetEvent::StateReplaced {
                asset_count: snapshot.len(),
            }))
            .ok();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::RemoteDeleteOutcome;
    use chrono::Utc;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        Cache {}

        #[async_trait]
        impl AssetCache for Cache {
            async fn is_valid(&self) -> bool;
            async fn load(&self) -> BridgeResult<Vec<Asset>>;
            async fn store(&self, assets: &[Asset]) -> BridgeResult<()>;
            async fn cursor(&self) -> BridgeResult<Option<SyncCursor>>;
            async fn store_cursor(&self, cursor: &SyncCursor) -> BridgeResult<()>;
        }
    }

    struct StubLocal(Option<Vec<Asset>>);

    #[async_trait]
    impl LocalLibrary for StubLocal {
        async fn fetch_assets(&self, _urgent: bool) -> BridgeResult<Option<Vec<Asset>>> {
            Ok(self.0.clone())
        }
    }

    struct StubRemote(Option<Vec<Asset>>);

    #[async_trait]
    impl RemoteLibrary for StubRemote {
        async fn fetch_assets(
            &self,
            _cursor: Option<SyncCursor>,
        ) -> BridgeResult<(Option<Vec<Asset>>, SyncCursor)> {
            Ok((self.0.clone(), SyncCursor::new("next")))
        }

        async fn delete_assets(
            &self,
            _assets: &[Asset],
        ) -> BridgeResult<Vec<RemoteDeleteOutcome>> {
            Ok(Vec::new())
        }

        async fn set_favorite(&self, _asset: &Asset, _favorite: bool) -> BridgeResult<Asset> {
            Err(BridgeError::NotAvailable("set_favorite".to_string()))
        }
    }

    struct StubDeleter;

    #[async_trait]
    impl DeviceDeleter for StubDeleter {
        async fn delete_assets(&self, _ids: &[String]) -> BridgeResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    struct StubDevice;

    impl DeviceInfo for StubDevice {
        fn device_id(&self) -> String {
            "device-1".to_string()
        }
    }

    fn local_asset(id: &str) -> Asset {
        Asset {
            id: id.to_string(),
            device_asset_id: id.to_string(),
            device_id: "device-1".to_string(),
            is_local: true,
            is_remote: false,
            created_at: Utc::now(),
            is_favorite: false,
        }
    }

    fn coordinator_with_cache(
        cache: MockCache,
        local: Option<Vec<Asset>>,
        remote: Option<Vec<Asset>>,
    ) -> AssetSyncCoordinator {
        AssetSyncCoordinator::new(
            SyncConfig::default(),
            Arc::new(cache),
            Arc::new(StubLocal(local)),
            Arc::new(StubRemote(remote)),
            Arc::new(StubDeleter),
            Arc::new(StubDevice),
        )
    }

    #[tokio::test]
    async fn test_corrupt_cache_falls_back_to_full_fetch() {
        let mut cache = MockCache::new();
        cache.expect_is_valid().return_const(true);
        cache.expect_load().returning(|| {
            Err(BridgeError::CorruptCache("bad header".to_string()))
        });
        // Invalid cache forces a cursor-less fetch; no cursor read happens.
        cache.expect_cursor().never();
        cache.expect_store().returning(|_| Ok(()));
        cache
            .expect_store_cursor()
            .with(eq(SyncCursor::new("next")))
            .returning(|_| Ok(()));

        let fetched = vec![local_asset("l1")];
        let coordinator = coordinator_with_cache(cache, Some(fetched.clone()), Some(Vec::new()));

        coordinator.run_sync().await.unwrap();
        assert_eq!(coordinator.current_state().await, fetched);
    }

    #[tokio::test]
    async fn test_valid_cursor_is_supplied_to_remote_fetch() {
        let mut cache = MockCache::new();
        cache.expect_is_valid().return_const(true);
        // State stays empty only until hydration; here the cache holds one
        // local asset.
        cache
            .expect_load()
            .returning(|| Ok(vec![local_asset("l1")]));
        cache
            .expect_cursor()
            .times(1)
            .returning(|| Ok(Some(SyncCursor::new("etag-1"))));
        cache.expect_store().returning(|_| Ok(()));
        cache.expect_store_cursor().returning(|_| Ok(()));

        let coordinator =
            coordinator_with_cache(cache, Some(vec![local_asset("l2")]), None);

        coordinator.run_sync().await.unwrap();
        let ids: Vec<String> = coordinator
            .current_state()
            .await
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["l2".to_string()]);
    }
}
