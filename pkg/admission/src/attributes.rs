use pkg_types::GardenObject;
use pkg_types::shoot::Shoot;
use pkg_constants::garden::{GROUP, KIND_SHOOT, RESOURCE_SHOOTS, VERSION};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{AdmissionError, AdmissionResult};
use crate::interfaces::Operation;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupVersionResource {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    pub resource: String,
}

impl GroupVersionResource {
    pub fn new(group: &str, version: &str, resource: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupVersionKind {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Same group and kind, any version.
    pub fn is(&self, group: &str, kind: &str) -> bool {
        self.group == group && self.kind == kind
    }
}

/// What a plugin sees of an admission request.
pub trait Attributes {
    fn name(&self) -> &str;
    fn namespace(&self) -> &str;
    fn resource(&self) -> &GroupVersionResource;
    /// Empty unless the request targets a sub-resource such as `status`.
    fn subresource(&self) -> &str;
    fn operation(&self) -> Operation;
    fn kind(&self) -> &GroupVersionKind;
    /// The incoming object, undecoded.
    fn object(&self) -> Option<&Value>;
    /// The stored object an update replaces.
    fn old_object(&self) -> Option<&Value>;
}

#[derive(Debug, Clone)]
pub struct AttributesRecord {
    pub name: String,
    pub namespace: String,
    pub resource: GroupVersionResource,
    pub subresource: String,
    pub operation: Operation,
    pub kind: GroupVersionKind,
    pub object: Option<Value>,
    pub old_object: Option<Value>,
}

impl AttributesRecord {
    /// Attributes of a shoot create or update issued through the garden API.
    pub fn for_shoot(
        operation: Operation,
        shoot: &Shoot,
        old: Option<&Shoot>,
    ) -> AdmissionResult<Self> {
        let encode = |s: &Shoot| {
            serde_json::to_value(s).map_err(|e| AdmissionError::internal_error(e.to_string()))
        };
        Ok(Self {
            name: shoot.metadata().name.clone(),
            namespace: shoot.metadata().namespace.clone(),
            resource: GroupVersionResource::new(GROUP, VERSION, RESOURCE_SHOOTS),
            subresource: String::new(),
            operation,
            kind: GroupVersionKind::new(GROUP, VERSION, KIND_SHOOT),
            object: Some(encode(shoot)?),
            old_object: old.map(encode).transpose()?,
        })
    }
}

impl Attributes for AttributesRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn resource(&self) -> &GroupVersionResource {
        &self.resource
    }

    fn subresource(&self) -> &str {
        &self.subresource
    }

    fn operation(&self) -> Operation {
        self.operation
    }

    fn kind(&self) -> &GroupVersionKind {
        &self.kind
    }

    fn object(&self) -> Option<&Value> {
        self.object.as_ref()
    }

    fn old_object(&self) -> Option<&Value> {
        self.old_object.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkg_types::ObjectMeta;

    #[test]
    fn shoot_attributes_carry_both_versions() {
        let mut shoot = Shoot::default();
        shoot.metadata = ObjectMeta::new("garden-dev", "s1");
        let old = shoot.clone();

        let attrs = AttributesRecord::for_shoot(Operation::Update, &shoot, Some(&old)).unwrap();
        assert_eq!(attrs.name(), "s1");
        assert_eq!(attrs.namespace(), "garden-dev");
        assert!(attrs.kind().is(GROUP, KIND_SHOOT));
        assert_eq!(attrs.resource().resource, "shoots");
        assert!(attrs.subresource().is_empty());
        assert_eq!(attrs.object().unwrap()["metadata"]["name"], "s1");
        assert!(attrs.old_object().is_some());
    }
}
