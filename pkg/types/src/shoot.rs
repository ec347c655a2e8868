use pkg_constants::garden::{
    CONFIRMATION_DELETION_TIMESTAMP, KIND_SHOOT, RESOURCE_SHOOTS, SHOOT_EXPIRATION_TIMESTAMP,
};
use serde::{Deserialize, Serialize};

use crate::meta::{GardenObject, ObjectMeta, ObjectReference};

/// A user-requested managed cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shoot {
    pub metadata: ObjectMeta,
    pub spec: ShootSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShootSpec {
    pub cloud: Cloud,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addons: Option<Addons>,
}

/// Cloud section of a shoot. Exactly one provider block is expected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cloud {
    /// Name of the cloud profile the machine and volume types come from.
    pub profile: String,
    #[serde(default)]
    pub region: String,
    /// Kind + name of the secret binding in the shoot's namespace.
    pub secret_binding_ref: ObjectReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsCloud>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure: Option<AzureCloud>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp: Option<GcpCloud>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openstack: Option<OpenStackCloud>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudProvider {
    Aws,
    Azure,
    Gcp,
    OpenStack,
}

impl std::fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloudProvider::Aws => write!(f, "aws"),
            CloudProvider::Azure => write!(f, "azure"),
            CloudProvider::Gcp => write!(f, "gcp"),
            CloudProvider::OpenStack => write!(f, "openstack"),
        }
    }
}

impl Cloud {
    /// The provider of this cloud section, or `None` when zero or several
    /// provider blocks are set.
    pub fn provider(&self) -> Option<CloudProvider> {
        let present = [
            (self.aws.is_some(), CloudProvider::Aws),
            (self.azure.is_some(), CloudProvider::Azure),
            (self.gcp.is_some(), CloudProvider::Gcp),
            (self.openstack.is_some(), CloudProvider::OpenStack),
        ];
        let mut found = present.iter().filter(|(set, _)| *set).map(|(_, p)| *p);
        match (found.next(), found.next()) {
            (Some(provider), None) => Some(provider),
            _ => None,
        }
    }
}

/// Fields shared by every provider's worker pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub name: String,
    pub machine_type: String,
    #[serde(default)]
    pub auto_scaler_min: u32,
    pub auto_scaler_max: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsCloud {
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub workers: Vec<AwsWorker>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsWorker {
    #[serde(flatten)]
    pub worker: Worker,
    pub volume_type: String,
    pub volume_size: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureCloud {
    #[serde(default)]
    pub workers: Vec<AzureWorker>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureWorker {
    #[serde(flatten)]
    pub worker: Worker,
    pub volume_type: String,
    pub volume_size: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcpCloud {
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub workers: Vec<GcpWorker>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcpWorker {
    #[serde(flatten)]
    pub worker: Worker,
    pub volume_type: String,
    pub volume_size: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenStackCloud {
    #[serde(default)]
    pub floating_pool_name: String,
    #[serde(default)]
    pub load_balancer_provider: String,
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub workers: Vec<OpenStackWorker>,
}

/// OpenStack workers carry no volume settings; those come from the cloud
/// profile's machine type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenStackWorker {
    #[serde(flatten)]
    pub worker: Worker,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Addons {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nginx_ingress: Option<NginxIngress>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NginxIngress {
    #[serde(default)]
    pub enabled: bool,
}

impl Shoot {
    pub fn binding_ref(&self) -> &ObjectReference {
        &self.spec.cloud.secret_binding_ref
    }

    /// Raw value of the expiration annotation, if any.
    pub fn expiration_timestamp(&self) -> Option<&str> {
        self.metadata.annotation(SHOOT_EXPIRATION_TIMESTAMP)
    }

    /// Marked for deletion and the deletion was confirmed by annotation.
    pub fn is_deletion_confirmed(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
            && self
                .metadata
                .annotation(CONFIRMATION_DELETION_TIMESTAMP)
                .is_some_and(|v| !v.is_empty())
    }

    pub fn nginx_ingress_enabled(&self) -> bool {
        self.spec
            .addons
            .as_ref()
            .and_then(|a| a.nginx_ingress.as_ref())
            .is_some_and(|n| n.enabled)
    }
}

impl GardenObject for Shoot {
    const KIND: &'static str = KIND_SHOOT;
    const RESOURCE: &'static str = RESOURCE_SHOOTS;
    const NAMESPACED: bool = true;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}
