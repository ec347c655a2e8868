use pkg_constants::garden::KIND_CLOUD_PROFILE;
use serde::{Deserialize, Serialize};

use crate::meta::{GardenObject, ObjectMeta};
use crate::quantity::Quantity;

/// Cluster-scoped catalog of machine and volume types per provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudProfile {
    pub metadata: ObjectMeta,
    pub spec: CloudProfileSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudProfileSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<ProviderProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure: Option<ProviderProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp: Option<ProviderProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openstack: Option<OpenStackProfile>,
}

/// AWS, Azure and GCP profiles share one constraint layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfile {
    pub constraints: ProviderConstraints,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConstraints {
    #[serde(default)]
    pub machine_types: Vec<MachineType>,
    #[serde(default)]
    pub volume_types: Vec<VolumeType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenStackProfile {
    pub constraints: OpenStackConstraints,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenStackConstraints {
    #[serde(default)]
    pub machine_types: Vec<OpenStackMachineType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineType {
    pub name: String,
    pub cpu: Quantity,
    #[serde(default)]
    pub gpu: Quantity,
    pub memory: Quantity,
    #[serde(default = "default_usable")]
    pub usable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeType {
    pub name: String,
    /// Storage class tag: `standard` or `premium`.
    pub class: String,
    #[serde(default = "default_usable")]
    pub usable: bool,
}

/// OpenStack machine types pin their root volume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenStackMachineType {
    #[serde(flatten)]
    pub machine_type: MachineType,
    /// Storage class of the root volume.
    pub volume_type: String,
    pub volume_size: Quantity,
}

fn default_usable() -> bool {
    true
}

impl GardenObject for CloudProfile {
    const KIND: &'static str = KIND_CLOUD_PROFILE;
    const RESOURCE: &'static str = "cloudprofiles";
    const NAMESPACED: bool = false;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_openstack_profile() {
        let json = r#"{
            "metadata": {"name": "openstack"},
            "spec": {
                "openstack": {
                    "constraints": {
                        "machineTypes": [{
                            "name": "medium_2_4",
                            "cpu": "2",
                            "gpu": "0",
                            "memory": "4Gi",
                            "volumeType": "standard",
                            "volumeSize": "20Gi"
                        }]
                    }
                }
            }
        }"#;
        let profile: CloudProfile = serde_json::from_str(json).unwrap();
        let machine = &profile.spec.openstack.unwrap().constraints.machine_types[0];
        assert_eq!(machine.machine_type.name, "medium_2_4");
        assert_eq!(machine.machine_type.cpu, "2".parse::<Quantity>().unwrap());
        assert!(machine.machine_type.usable);
        assert_eq!(machine.volume_type, "standard");
        assert_eq!(machine.volume_size, "20Gi".parse::<Quantity>().unwrap());
    }

    #[test]
    fn gpu_defaults_to_zero() {
        let json = r#"{"name": "m4.large", "cpu": 2, "memory": "8Gi"}"#;
        let machine: MachineType = serde_json::from_str(json).unwrap();
        assert!(machine.gpu.is_zero());
    }
}
