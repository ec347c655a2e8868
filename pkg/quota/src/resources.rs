use pkg_constants::garden::{VOLUME_CLASS_PREMIUM, VOLUME_CLASS_STANDARD};
use pkg_state::GardenListers;
use pkg_types::cloudprofile::CloudProfile;
use pkg_types::shoot::Shoot;
use pkg_types::{GardenObject, Quantity, QuotaMetric, ResourceVector};

use crate::error::QuotaError;
use crate::workers::{Catalog, normalize_workers};

/// Resources `shoot` consumes when every worker pool is scaled out to its
/// maximum, priced against `profile`.
pub fn shoot_resources(shoot: &Shoot, profile: &CloudProfile) -> Result<ResourceVector, QuotaError> {
    let cloud = &shoot.spec.cloud;
    let provider = cloud
        .provider()
        .ok_or_else(|| QuotaError::CloudProviderUndetermined {
            shoot: shoot.object_key(),
        })?;
    let workers = normalize_workers(cloud, provider, profile)?;
    let catalog = Catalog::for_provider(profile, provider);

    let mut resources = ResourceVector::new();
    for worker in &workers {
        let machine = catalog.machine_type(&worker.machine_type).ok_or_else(|| {
            QuotaError::MachineTypeNotFound {
                machine_type: worker.machine_type.clone(),
                cloud_profile: profile.metadata.name.clone(),
            }
        })?;
        let volume = catalog.volume_type(&worker.volume_type).ok_or_else(|| {
            QuotaError::VolumeTypeNotFound {
                volume_type: worker.volume_type.clone(),
                cloud_profile: profile.metadata.name.clone(),
            }
        })?;
        let storage = match volume.class.as_str() {
            VOLUME_CLASS_STANDARD => QuotaMetric::StorageStandard,
            VOLUME_CLASS_PREMIUM => QuotaMetric::StoragePremium,
            other => {
                return Err(QuotaError::UnknownVolumeClass {
                    volume_type: volume.name.clone(),
                    class: other.to_string(),
                });
            }
        };

        let replicas = worker.max_replicas;
        resources.add_metric(QuotaMetric::Cpu, machine.cpu * replicas);
        resources.add_metric(QuotaMetric::Gpu, machine.gpu * replicas);
        resources.add_metric(QuotaMetric::Memory, machine.memory * replicas);
        resources.add_metric(storage, worker.volume_size * replicas);
    }

    // Every shoot gets one load balancer for its API server, the nginx
    // ingress addon another.
    let load_balancers = if shoot.nginx_ingress_enabled() { 2 } else { 1 };
    resources.set(QuotaMetric::Loadbalancer, Quantity::from_units(load_balancers));

    Ok(resources)
}

/// Look up the shoot's cloud profile and compute its resources.
pub fn resources_for_shoot(
    listers: &dyn GardenListers,
    shoot: &Shoot,
) -> Result<ResourceVector, QuotaError> {
    let profile = listers.cloud_profile(&shoot.spec.cloud.profile)?;
    shoot_resources(shoot, &profile)
}
