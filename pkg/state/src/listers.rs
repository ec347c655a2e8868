use pkg_types::cloudprofile::CloudProfile;
use pkg_types::meta::{GardenObject, object_key};
use pkg_types::quota::Quota;
use pkg_types::secretbinding::{CrossSecretBinding, PrivateSecretBinding};
use pkg_types::shoot::Shoot;

use crate::cache::{CachedObject, GardenCache};
use crate::error::StoreError;

/// Read-only lookups the admission core performs. Implementations must be
/// safe to call concurrently from many admission requests.
pub trait GardenListers: Send + Sync {
    fn cloud_profile(&self, name: &str) -> Result<CloudProfile, StoreError>;

    fn private_secret_binding(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<PrivateSecretBinding, StoreError>;

    fn cross_secret_binding(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<CrossSecretBinding, StoreError>;

    /// Private bindings across all namespaces.
    fn private_secret_bindings(&self) -> Result<Vec<PrivateSecretBinding>, StoreError>;

    /// Cross bindings across all namespaces.
    fn cross_secret_bindings(&self) -> Result<Vec<CrossSecretBinding>, StoreError>;

    fn shoots(&self, namespace: &str) -> Result<Vec<Shoot>, StoreError>;

    fn quota(&self, namespace: &str, name: &str) -> Result<Quota, StoreError>;

    /// True once the backing data reflects at least one full list.
    fn has_synced(&self) -> bool;
}

impl GardenCache {
    fn lookup<T: CachedObject>(&self, namespace: &str, name: &str) -> Result<T, StoreError> {
        self.get(namespace, name)
            .ok_or_else(|| StoreError::not_found(T::KIND, object_key(namespace, name)))
    }
}

impl GardenListers for GardenCache {
    fn cloud_profile(&self, name: &str) -> Result<CloudProfile, StoreError> {
        self.lookup("", name)
    }

    fn private_secret_binding(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<PrivateSecretBinding, StoreError> {
        self.lookup(namespace, name)
    }

    fn cross_secret_binding(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<CrossSecretBinding, StoreError> {
        self.lookup(namespace, name)
    }

    fn private_secret_bindings(&self) -> Result<Vec<PrivateSecretBinding>, StoreError> {
        Ok(self.list(None))
    }

    fn cross_secret_bindings(&self) -> Result<Vec<CrossSecretBinding>, StoreError> {
        Ok(self.list(None))
    }

    fn shoots(&self, namespace: &str) -> Result<Vec<Shoot>, StoreError> {
        Ok(self.list(Some(namespace)))
    }

    fn quota(&self, namespace: &str, name: &str) -> Result<Quota, StoreError> {
        self.lookup(namespace, name)
    }

    fn has_synced(&self) -> bool {
        GardenCache::has_synced(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkg_types::meta::ObjectMeta;

    #[test]
    fn missing_objects_are_not_found_errors() {
        let cache = GardenCache::new();
        let err = cache.quota("garden", "trial").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Quota \"garden/trial\" not found");

        let err = cache.cloud_profile("aws").unwrap_err();
        assert_eq!(err.to_string(), "CloudProfile \"aws\" not found");
    }

    #[test]
    fn cluster_scoped_profiles_resolve_by_name() {
        let cache = GardenCache::new();
        cache.upsert(CloudProfile {
            metadata: ObjectMeta::new("", "aws"),
            ..Default::default()
        });
        assert_eq!(cache.cloud_profile("aws").unwrap().metadata.name, "aws");
    }

    #[test]
    fn binding_lists_span_namespaces() {
        let cache = GardenCache::new();
        for ns in ["garden-a", "garden-b"] {
            cache.upsert(PrivateSecretBinding {
                metadata: ObjectMeta::new(ns, "secret"),
                ..Default::default()
            });
        }
        assert_eq!(cache.private_secret_bindings().unwrap().len(), 2);
        assert!(cache.cross_secret_bindings().unwrap().is_empty());
    }

    #[test]
    fn readiness_follows_cache() {
        let cache = GardenCache::new();
        assert!(!GardenListers::has_synced(&cache));
        cache.mark_synced();
        assert!(GardenListers::has_synced(&cache));
    }
}
