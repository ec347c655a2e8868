use pkg_types::Quantity;
use pkg_types::cloudprofile::{CloudProfile, MachineType, VolumeType};
use pkg_types::shoot::{Cloud, CloudProvider, Worker};

use crate::error::QuotaError;

/// Provider-neutral view of one worker pool.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotaWorker {
    pub name: String,
    pub machine_type: String,
    pub volume_type: String,
    pub volume_size: Quantity,
    /// Upper autoscaler bound; quota accounting assumes full scale-out.
    pub max_replicas: u32,
}

impl QuotaWorker {
    fn with_volume(worker: &Worker, volume_type: &str, volume_size: &str) -> Result<Self, QuotaError> {
        Ok(Self {
            name: worker.name.clone(),
            machine_type: worker.machine_type.clone(),
            volume_type: volume_type.to_string(),
            volume_size: volume_size.parse()?,
            max_replicas: worker.auto_scaler_max,
        })
    }
}

/// Normalize the worker pools of `provider` into `QuotaWorker`s.
///
/// OpenStack pools carry no volume settings. Their volume type is named
/// after the machine type and their size is the one the profile pins for it.
pub fn normalize_workers(
    cloud: &Cloud,
    provider: CloudProvider,
    profile: &CloudProfile,
) -> Result<Vec<QuotaWorker>, QuotaError> {
    match provider {
        CloudProvider::Aws => cloud
            .aws
            .iter()
            .flat_map(|aws| &aws.workers)
            .map(|w| QuotaWorker::with_volume(&w.worker, &w.volume_type, &w.volume_size))
            .collect(),
        CloudProvider::Azure => cloud
            .azure
            .iter()
            .flat_map(|azure| &azure.workers)
            .map(|w| QuotaWorker::with_volume(&w.worker, &w.volume_type, &w.volume_size))
            .collect(),
        CloudProvider::Gcp => cloud
            .gcp
            .iter()
            .flat_map(|gcp| &gcp.workers)
            .map(|w| QuotaWorker::with_volume(&w.worker, &w.volume_type, &w.volume_size))
            .collect(),
        CloudProvider::OpenStack => {
            let machine_types = profile
                .spec
                .openstack
                .as_ref()
                .map(|p| p.constraints.machine_types.as_slice())
                .unwrap_or_default();
            cloud
                .openstack
                .iter()
                .flat_map(|openstack| &openstack.workers)
                .map(|w| -> Result<QuotaWorker, QuotaError> {
                    let machine = machine_types
                        .iter()
                        .find(|m| m.machine_type.name == w.worker.machine_type)
                        .ok_or_else(|| QuotaError::MachineTypeNotFound {
                            machine_type: w.worker.machine_type.clone(),
                            cloud_profile: profile.metadata.name.clone(),
                        })?;
                    Ok(QuotaWorker {
                        name: w.worker.name.clone(),
                        machine_type: w.worker.machine_type.clone(),
                        volume_type: machine.machine_type.name.clone(),
                        volume_size: machine.volume_size,
                        max_replicas: w.worker.auto_scaler_max,
                    })
                })
                .collect()
        }
    }
}

/// Machine and volume types one provider offers in a cloud profile.
#[derive(Debug, Default)]
pub struct Catalog {
    pub machine_types: Vec<MachineType>,
    pub volume_types: Vec<VolumeType>,
}

impl Catalog {
    pub fn for_provider(profile: &CloudProfile, provider: CloudProvider) -> Self {
        let spec = &profile.spec;
        let shared = match provider {
            CloudProvider::Aws => spec.aws.as_ref(),
            CloudProvider::Azure => spec.azure.as_ref(),
            CloudProvider::Gcp => spec.gcp.as_ref(),
            CloudProvider::OpenStack => None,
        };
        if let Some(p) = shared {
            return Self {
                machine_types: p.constraints.machine_types.clone(),
                volume_types: p.constraints.volume_types.clone(),
            };
        }

        let Some(openstack) = spec.openstack.as_ref().filter(|_| provider == CloudProvider::OpenStack)
        else {
            return Self::default();
        };
        let mut catalog = Self::default();
        for m in &openstack.constraints.machine_types {
            catalog.machine_types.push(m.machine_type.clone());
            if catalog.volume_type(&m.machine_type.name).is_none() {
                catalog.volume_types.push(VolumeType {
                    name: m.machine_type.name.clone(),
                    class: m.volume_type.clone(),
                    usable: m.machine_type.usable,
                });
            }
        }
        catalog
    }

    pub fn machine_type(&self, name: &str) -> Option<&MachineType> {
        self.machine_types.iter().find(|m| m.name == name)
    }

    pub fn volume_type(&self, name: &str) -> Option<&VolumeType> {
        self.volume_types.iter().find(|v| v.name == name)
    }
}
