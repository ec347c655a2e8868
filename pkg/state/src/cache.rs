use pkg_types::cloudprofile::CloudProfile;
use pkg_types::meta::GardenObject;
use pkg_types::quota::Quota;
use pkg_types::secretbinding::{CrossSecretBinding, PrivateSecretBinding};
use pkg_types::shoot::Shoot;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;

/// Objects of one kind, indexed by `(namespace, name)`.
///
/// Ordering by namespace first makes per-namespace listing a range scan.
pub struct Indexer<T> {
    items: BTreeMap<(String, String), T>,
}

impl<T: GardenObject> Indexer<T> {
    fn new() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }

    fn upsert(&mut self, obj: T) {
        let meta = obj.metadata();
        self.items
            .insert((meta.namespace.clone(), meta.name.clone()), obj);
    }

    fn remove(&mut self, namespace: &str, name: &str) -> Option<T> {
        self.items
            .remove(&(namespace.to_string(), name.to_string()))
    }

    fn get(&self, namespace: &str, name: &str) -> Option<&T> {
        self.items.get(&(namespace.to_string(), name.to_string()))
    }

    fn list_namespace(&self, namespace: &str) -> impl Iterator<Item = &T> {
        self.items
            .range((namespace.to_string(), String::new())..)
            .take_while(move |((ns, _), _)| ns == namespace)
            .map(|(_, obj)| obj)
    }

    fn list_all(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// In-memory, read-mostly view of every garden object the admission core
/// reads, plus a one-shot readiness signal set after the initial list.
pub struct GardenCache {
    cloud_profiles: RwLock<Indexer<CloudProfile>>,
    shoots: RwLock<Indexer<Shoot>>,
    private_bindings: RwLock<Indexer<PrivateSecretBinding>>,
    cross_bindings: RwLock<Indexer<CrossSecretBinding>>,
    quotas: RwLock<Indexer<Quota>>,
    synced: AtomicBool,
    ready_tx: watch::Sender<bool>,
}

/// Kinds the cache holds. Maps a type to its indexer.
pub trait CachedObject: GardenObject {
    fn indexer(cache: &GardenCache) -> &RwLock<Indexer<Self>>;
}

macro_rules! cached_object {
    ($ty:ty, $field:ident) => {
        impl CachedObject for $ty {
            fn indexer(cache: &GardenCache) -> &RwLock<Indexer<Self>> {
                &cache.$field
            }
        }
    };
}

cached_object!(CloudProfile, cloud_profiles);
cached_object!(Shoot, shoots);
cached_object!(PrivateSecretBinding, private_bindings);
cached_object!(CrossSecretBinding, cross_bindings);
cached_object!(Quota, quotas);

fn read<T>(lock: &RwLock<Indexer<T>>) -> RwLockReadGuard<'_, Indexer<T>> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<Indexer<T>>) -> RwLockWriteGuard<'_, Indexer<T>> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl GardenCache {
    pub fn new() -> Self {
        let (ready_tx, _) = watch::channel(false);
        Self {
            cloud_profiles: RwLock::new(Indexer::new()),
            shoots: RwLock::new(Indexer::new()),
            private_bindings: RwLock::new(Indexer::new()),
            cross_bindings: RwLock::new(Indexer::new()),
            quotas: RwLock::new(Indexer::new()),
            synced: AtomicBool::new(false),
            ready_tx,
        }
    }

    pub fn upsert<T: CachedObject>(&self, obj: T) {
        write(T::indexer(self)).upsert(obj);
    }

    pub fn remove<T: CachedObject>(&self, namespace: &str, name: &str) -> Option<T> {
        write(T::indexer(self)).remove(namespace, name)
    }

    /// Swap the full contents of one kind, as after a (re-)list.
    pub fn replace_all<T: CachedObject>(&self, objects: Vec<T>) {
        let mut fresh = Indexer::new();
        for obj in objects {
            fresh.upsert(obj);
        }
        *write(T::indexer(self)) = fresh;
    }

    pub fn get<T: CachedObject>(&self, namespace: &str, name: &str) -> Option<T> {
        read(T::indexer(self)).get(namespace, name).cloned()
    }

    /// Objects in `namespace`, or in every namespace when `None`.
    pub fn list<T: CachedObject>(&self, namespace: Option<&str>) -> Vec<T> {
        let indexer = read(T::indexer(self));
        match namespace {
            Some(ns) => indexer.list_namespace(ns).cloned().collect(),
            None => indexer.list_all().cloned().collect(),
        }
    }

    pub fn len<T: CachedObject>(&self) -> usize {
        read(T::indexer(self)).len()
    }

    /// Flip the readiness signal. Idempotent.
    pub fn mark_synced(&self) {
        self.synced.store(true, Ordering::Release);
        self.ready_tx.send_replace(true);
    }

    pub fn has_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    /// Resolve once the initial sync has completed.
    pub async fn wait_synced(&self) {
        let mut rx = self.ready_tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

impl Default for GardenCache {
    fn default() -> Self {
        Self::new()
    }
}
