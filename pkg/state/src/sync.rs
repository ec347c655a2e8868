use pkg_constants::state::{REGISTRY_PREFIX, RELIST_BACKOFF_SECS};
use pkg_types::cloudprofile::CloudProfile;
use pkg_types::meta::GardenObject;
use pkg_types::quota::Quota;
use pkg_types::secretbinding::{CrossSecretBinding, PrivateSecretBinding};
use pkg_types::shoot::Shoot;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::cache::{CachedObject, GardenCache};
use crate::client::StateStore;
use crate::watch::{EventType, WatchEvent};

/// Keeps a `GardenCache` in step with the `StateStore`: one full list,
/// then incremental updates from the store's event log.
pub struct CacheSync {
    store: StateStore,
    cache: Arc<GardenCache>,
    relist_backoff: Duration,
}

impl CacheSync {
    pub fn new(store: StateStore, cache: Arc<GardenCache>) -> Self {
        Self {
            store,
            cache,
            relist_backoff: Duration::from_secs(RELIST_BACKOFF_SECS),
        }
    }

    /// Start the sync loop as a background task.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!("CacheSync started");
            // Subscribe before listing so no write between the two is lost.
            let mut event_rx = self.store.event_log.subscribe();

            while let Err(e) = self.relist().await {
                warn!("CacheSync initial list failed: {}", e);
                tokio::time::sleep(self.relist_backoff).await;
            }
            self.cache.mark_synced();
            info!(
                "CacheSync initial list done (shoots={}, quotas={}, cloudprofiles={})",
                self.cache.len::<Shoot>(),
                self.cache.len::<Quota>(),
                self.cache.len::<CloudProfile>()
            );

            loop {
                match event_rx.recv().await {
                    Ok(event) => self.apply(&event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("CacheSync lagged by {} events, re-listing", skipped);
                        if let Err(e) = self.relist().await {
                            warn!("CacheSync re-list failed: {}", e);
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            info!("CacheSync stopped");
        })
    }

    /// Full list of every cached kind.
    pub async fn relist(&self) -> anyhow::Result<()> {
        self.relist_kind::<CloudProfile>().await?;
        self.relist_kind::<Shoot>().await?;
        self.relist_kind::<PrivateSecretBinding>().await?;
        self.relist_kind::<CrossSecretBinding>().await?;
        self.relist_kind::<Quota>().await?;
        Ok(())
    }

    async fn relist_kind<T: CachedObject>(&self) -> anyhow::Result<()> {
        let objects: Vec<T> = self.store.list_objects(None).await?;
        debug!("CacheSync listed {} {} objects", objects.len(), T::KIND);
        self.cache.replace_all(objects);
        Ok(())
    }

    /// Route one store event to the matching kind.
    pub fn apply(&self, event: &WatchEvent) {
        let Some(rest) = event.key.strip_prefix(REGISTRY_PREFIX) else {
            return;
        };
        let Some((resource, path)) = rest.split_once('/') else {
            return;
        };
        match resource {
            r if r == CloudProfile::RESOURCE => self.apply_kind::<CloudProfile>(event, path),
            r if r == Shoot::RESOURCE => self.apply_kind::<Shoot>(event, path),
            r if r == PrivateSecretBinding::RESOURCE => {
                self.apply_kind::<PrivateSecretBinding>(event, path)
            }
            r if r == CrossSecretBinding::RESOURCE => {
                self.apply_kind::<CrossSecretBinding>(event, path)
            }
            r if r == Quota::RESOURCE => self.apply_kind::<Quota>(event, path),
            _ => {}
        }
    }

    fn apply_kind<T: CachedObject>(&self, event: &WatchEvent, path: &str) {
        match event.event_type {
            EventType::Put => {
                let Some(value) = &event.value else {
                    return;
                };
                match serde_json::from_slice::<T>(value) {
                    Ok(obj) => self.cache.upsert(obj),
                    Err(e) => warn!("CacheSync skipping undecodable {} {}: {}", T::KIND, path, e),
                }
            }
            EventType::Delete => {
                let (namespace, name) = match path.split_once('/') {
                    Some((ns, name)) if T::NAMESPACED => (ns, name),
                    _ => ("", path),
                };
                self.cache.remove::<T>(namespace, name);
            }
        }
    }
}
