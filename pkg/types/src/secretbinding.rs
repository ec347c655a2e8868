use pkg_constants::garden::{KIND_CROSS_SECRET_BINDING, KIND_PRIVATE_SECRET_BINDING};
use serde::{Deserialize, Serialize};

use crate::meta::{GardenObject, ObjectMeta, ObjectReference};

/// Binds a secret in the binding's own namespace to a set of quotas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateSecretBinding {
    pub metadata: ObjectMeta,
    pub secret_ref: LocalReference,
    #[serde(default)]
    pub quotas: Vec<ObjectReference>,
}

/// Binds a secret from another namespace to a set of quotas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossSecretBinding {
    pub metadata: ObjectMeta,
    pub secret_ref: ObjectReference,
    #[serde(default)]
    pub quotas: Vec<ObjectReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalReference {
    pub name: String,
}

/// The two binding kinds a shoot's `secretBindingRef` may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Private,
    Cross,
}

impl BindingKind {
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            KIND_PRIVATE_SECRET_BINDING => Some(BindingKind::Private),
            KIND_CROSS_SECRET_BINDING => Some(BindingKind::Cross),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BindingKind::Private => KIND_PRIVATE_SECRET_BINDING,
            BindingKind::Cross => KIND_CROSS_SECRET_BINDING,
        }
    }
}

impl std::fmt::Display for BindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform view over both binding kinds once they are resolved.
pub trait SecretBinding: GardenObject {
    const BINDING_KIND: BindingKind;

    fn quotas(&self) -> &[ObjectReference];

    fn references_quota(&self, quota: &ObjectMeta) -> bool {
        self.quotas().iter().any(|r| r.points_to(quota))
    }
}

impl GardenObject for PrivateSecretBinding {
    const KIND: &'static str = KIND_PRIVATE_SECRET_BINDING;
    const RESOURCE: &'static str = "privatesecretbindings";
    const NAMESPACED: bool = true;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl SecretBinding for PrivateSecretBinding {
    const BINDING_KIND: BindingKind = BindingKind::Private;

    fn quotas(&self) -> &[ObjectReference] {
        &self.quotas
    }
}

impl GardenObject for CrossSecretBinding {
    const KIND: &'static str = KIND_CROSS_SECRET_BINDING;
    const RESOURCE: &'static str = "crosssecretbindings";
    const NAMESPACED: bool = true;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl SecretBinding for CrossSecretBinding {
    const BINDING_KIND: BindingKind = BindingKind::Cross;

    fn quotas(&self) -> &[ObjectReference] {
        &self.quotas
    }
}
