use pkg_constants::state::{EVENT_LOG_CAPACITY, REGISTRY_PREFIX};
use pkg_types::meta::{GardenObject, object_key};
use slatedb::Db;
use slatedb::object_store::local::LocalFileSystem;
use slatedb::object_store::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::watch::{EventLog, EventType};

/// Persistent state store backed by SlateDB on a local filesystem.
///
/// Every successful write is recorded in `event_log` so caches can follow
/// the store without polling. Writes hold `write_lock` across the DB write
/// and the emit, so event order matches commit order.
#[derive(Clone)]
pub struct StateStore {
    db: Db,
    write_lock: Arc<Mutex<()>>,
    pub event_log: EventLog,
}

/// Store key of one object.
pub fn registry_key<T: GardenObject>(namespace: &str, name: &str) -> String {
    format!("{}{}", registry_prefix::<T>(), object_key(namespace, name))
}

/// Key prefix covering every object of one kind.
pub fn registry_prefix<T: GardenObject>() -> String {
    format!("{}{}/", REGISTRY_PREFIX, T::RESOURCE)
}

impl StateStore {
    /// Open (or create) a state store rooted at `path` on the local filesystem.
    pub async fn new(path: &str) -> anyhow::Result<Self> {
        info!("Opening SlateDB state store at {}", path);

        std::fs::create_dir_all(path)
            .map_err(|e| anyhow::anyhow!("Failed to create data directory {}: {}", path, e))?;

        let object_store = Arc::new(
            LocalFileSystem::new_with_prefix(path)
                .map_err(|e| anyhow::anyhow!("Failed to create local object store: {}", e))?,
        );
        let db = Db::open(Path::from("/"), object_store)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open SlateDB: {}", e))?;
        Ok(Self {
            db,
            write_lock: Arc::new(Mutex::new(())),
            event_log: EventLog::new(EVENT_LOG_CAPACITY),
        })
    }

    pub async fn put(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;
        self.db
            .put(key.as_bytes(), value)
            .await
            .map_err(|e| anyhow::anyhow!("SlateDB put failed: {}", e))?;
        self.event_log
            .emit(EventType::Put, key.to_string(), Some(value.to_vec()))
            .await;
        Ok(())
    }

    pub async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        match self.db.get(key.as_bytes()).await {
            Ok(Some(bytes)) => Ok(Some(bytes.to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(anyhow::anyhow!("SlateDB get failed: {}", e)),
        }
    }

    pub async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;
        self.db
            .delete(key.as_bytes())
            .await
            .map_err(|e| anyhow::anyhow!("SlateDB delete failed: {}", e))?;
        self.event_log
            .emit(EventType::Delete, key.to_string(), None)
            .await;
        Ok(())
    }

    /// List all key-value pairs whose keys start with `prefix`.
    pub async fn list_prefix(&self, prefix: &str) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
        let mut results = Vec::new();
        let mut iter = self
            .db
            .scan_prefix(prefix.as_bytes())
            .await
            .map_err(|e| anyhow::anyhow!("SlateDB scan_prefix failed: {}", e))?;

        while let Ok(Some(kv)) = iter.next().await {
            let key = String::from_utf8_lossy(&kv.key).to_string();
            results.push((key, kv.value.to_vec()));
        }
        Ok(results)
    }

    /// Encode and store a typed object under its registry key.
    pub async fn put_object<T: GardenObject>(&self, obj: &T) -> anyhow::Result<()> {
        let meta = obj.metadata();
        let key = registry_key::<T>(&meta.namespace, &meta.name);
        let data = serde_json::to_vec(obj)?;
        self.put(&key, &data).await?;
        debug!("Stored {} {}", T::KIND, key);
        Ok(())
    }

    pub async fn get_object<T: GardenObject>(
        &self,
        namespace: &str,
        name: &str,
    ) -> anyhow::Result<Option<T>> {
        let key = registry_key::<T>(namespace, name);
        match self.get(&key).await? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    /// Delete a typed object. Returns whether it existed.
    pub async fn delete_object<T: GardenObject>(
        &self,
        namespace: &str,
        name: &str,
    ) -> anyhow::Result<bool> {
        let key = registry_key::<T>(namespace, name);
        if self.get(&key).await?.is_none() {
            return Ok(false);
        }
        self.delete(&key).await?;
        Ok(true)
    }

    /// List objects of one kind, optionally restricted to a namespace.
    /// Entries that fail to decode are skipped with a warning.
    pub async fn list_objects<T: GardenObject>(
        &self,
        namespace: Option<&str>,
    ) -> anyhow::Result<Vec<T>> {
        let prefix = match namespace {
            Some(ns) if T::NAMESPACED => format!("{}{}/", registry_prefix::<T>(), ns),
            _ => registry_prefix::<T>(),
        };
        let entries = self.list_prefix(&prefix).await?;
        Ok(entries
            .into_iter()
            .filter_map(|(key, value)| match serde_json::from_slice(&value) {
                Ok(obj) => Some(obj),
                Err(e) => {
                    warn!("Skipping undecodable {} at {}: {}", T::KIND, key, e);
                    None
                }
            })
            .collect())
    }

    /// Gracefully close the state store.
    pub async fn close(self) -> anyhow::Result<()> {
        info!("Closing SlateDB state store");
        self.db
            .close()
            .await
            .map_err(|e| anyhow::anyhow!("SlateDB close failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkg_types::cloudprofile::CloudProfile;
    use pkg_types::meta::ObjectMeta;
    use pkg_types::quota::Quota;

    fn temp_dir() -> String {
        std::env::temp_dir()
            .join(format!("garden-state-{}", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .to_string()
    }

    fn quota(namespace: &str, name: &str) -> Quota {
        Quota {
            metadata: ObjectMeta::new(namespace, name),
            ..Default::default()
        }
    }

    #[test]
    fn keys_follow_resource_layout() {
        assert_eq!(
            registry_key::<Quota>("garden", "trial"),
            "/registry/quotas/garden/trial"
        );
        assert_eq!(
            registry_key::<CloudProfile>("", "aws"),
            "/registry/cloudprofiles/aws"
        );
    }

    #[tokio::test]
    async fn typed_round_trip_and_namespace_listing() {
        let dir = temp_dir();
        let store = StateStore::new(&dir).await.unwrap();

        store.put_object(&quota("garden", "trial")).await.unwrap();
        store.put_object(&quota("garden", "prod")).await.unwrap();
        store.put_object(&quota("garden-dev", "dev")).await.unwrap();

        let fetched: Option<Quota> = store.get_object("garden", "trial").await.unwrap();
        assert_eq!(fetched.unwrap().metadata.name, "trial");

        let in_garden: Vec<Quota> = store.list_objects(Some("garden")).await.unwrap();
        assert_eq!(in_garden.len(), 2);
        let all: Vec<Quota> = store.list_objects(None).await.unwrap();
        assert_eq!(all.len(), 3);

        assert!(store.delete_object::<Quota>("garden", "trial").await.unwrap());
        assert!(!store.delete_object::<Quota>("garden", "trial").await.unwrap());

        store.close().await.unwrap();
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn writes_are_recorded_in_event_log() {
        let dir = temp_dir();
        let store = StateStore::new(&dir).await.unwrap();
        let mut rx = store.event_log.subscribe();

        store.put_object(&quota("garden", "trial")).await.unwrap();
        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EventType::Put);
        assert_eq!(event.key, "/registry/quotas/garden/trial");

        store.delete_object::<Quota>("garden", "trial").await.unwrap();
        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EventType::Delete);

        store.close().await.unwrap();
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writes_emit_in_commit_order() {
        let dir = temp_dir();
        let store = StateStore::new(&dir).await.unwrap();
        let key = "/registry/shoots/garden-dev/s1";

        let writers: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let value = format!("v{}", i);
                    store.put(key, value.as_bytes()).await.unwrap();
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        let events = store.event_log.events_since(0, key).await;
        assert_eq!(events.len(), 16);
        let last = events.last().unwrap().value.clone();
        assert_eq!(store.get(key).await.unwrap(), last);

        store.close().await.unwrap();
        let _ = std::fs::remove_dir_all(dir);
    }
}
