//! Object builders shared by the tests of this crate.

use pkg_constants::garden::{KIND_CROSS_SECRET_BINDING, KIND_PRIVATE_SECRET_BINDING};
use pkg_state::GardenCache;
use pkg_types::cloudprofile::{
    CloudProfile, CloudProfileSpec, MachineType, OpenStackConstraints, OpenStackMachineType,
    OpenStackProfile, ProviderConstraints, ProviderProfile, VolumeType,
};
use pkg_types::quota::{Quota, QuotaSpec};
use pkg_types::secretbinding::{CrossSecretBinding, PrivateSecretBinding};
use pkg_types::shoot::{
    AwsCloud, AwsWorker, AzureCloud, AzureWorker, Cloud, CloudProvider, GcpCloud, GcpWorker,
    OpenStackCloud, OpenStackWorker, Shoot, Worker,
};
use pkg_types::{ObjectMeta, ObjectReference, Quantity, QuotaMetric};

pub const PROFILE: &str = "profile";

pub fn q(value: &str) -> Quantity {
    value.parse().unwrap()
}

fn machine(name: &str, cpu: &str, gpu: &str, memory: &str) -> MachineType {
    MachineType {
        name: name.to_string(),
        cpu: q(cpu),
        gpu: q(gpu),
        memory: q(memory),
        usable: true,
    }
}

fn volume(name: &str, class: &str) -> VolumeType {
    VolumeType {
        name: name.to_string(),
        class: class.to_string(),
        usable: true,
    }
}

/// Profile offering, for every provider, machine type `m` (2 cpu, 4 memory)
/// and `g` (4 cpu, 1 gpu, 16 memory). The shared providers also offer volume
/// types `v` (standard), `p` (premium) and `x` (unknown class).
pub fn profile() -> CloudProfile {
    let shared = ProviderProfile {
        constraints: ProviderConstraints {
            machine_types: vec![machine("m", "2", "0", "4"), machine("g", "4", "1", "16")],
            volume_types: vec![
                volume("v", "standard"),
                volume("p", "premium"),
                volume("x", "exotic"),
            ],
        },
    };
    let openstack = OpenStackProfile {
        constraints: OpenStackConstraints {
            machine_types: vec![
                OpenStackMachineType {
                    machine_type: machine("m", "2", "0", "4"),
                    volume_type: "standard".to_string(),
                    volume_size: q("50Gi"),
                },
                OpenStackMachineType {
                    machine_type: machine("g", "4", "1", "16"),
                    volume_type: "premium".to_string(),
                    volume_size: q("100Gi"),
                },
            ],
        },
    };
    CloudProfile {
        metadata: ObjectMeta::new("", PROFILE),
        spec: CloudProfileSpec {
            aws: Some(shared.clone()),
            azure: Some(shared.clone()),
            gcp: Some(shared),
            openstack: Some(openstack),
        },
    }
}

/// `(pool, machine type, volume type, volume size, max replicas)`
pub type Pool<'a> = (&'a str, &'a str, &'a str, &'a str, u32);

pub fn shoot_with_workers(
    namespace: &str,
    name: &str,
    provider: CloudProvider,
    pools: &[Pool<'_>],
) -> Shoot {
    let mut cloud = Cloud {
        profile: PROFILE.to_string(),
        secret_binding_ref: ObjectReference::with_kind(KIND_PRIVATE_SECRET_BINDING, "secret"),
        ..Default::default()
    };
    let worker = |(pool, machine_type, _, _, max): &Pool<'_>| Worker {
        name: pool.to_string(),
        machine_type: machine_type.to_string(),
        auto_scaler_min: 1,
        auto_scaler_max: *max,
    };
    match provider {
        CloudProvider::Aws => {
            cloud.aws = Some(AwsCloud {
                zones: vec!["eu-west-1a".to_string()],
                workers: pools
                    .iter()
                    .map(|p| AwsWorker {
                        worker: worker(p),
                        volume_type: p.2.to_string(),
                        volume_size: p.3.to_string(),
                    })
                    .collect(),
            })
        }
        CloudProvider::Azure => {
            cloud.azure = Some(AzureCloud {
                workers: pools
                    .iter()
                    .map(|p| AzureWorker {
                        worker: worker(p),
                        volume_type: p.2.to_string(),
                        volume_size: p.3.to_string(),
                    })
                    .collect(),
            })
        }
        CloudProvider::Gcp => {
            cloud.gcp = Some(GcpCloud {
                zones: vec!["europe-west1-b".to_string()],
                workers: pools
                    .iter()
                    .map(|p| GcpWorker {
                        worker: worker(p),
                        volume_type: p.2.to_string(),
                        volume_size: p.3.to_string(),
                    })
                    .collect(),
            })
        }
        CloudProvider::OpenStack => {
            cloud.openstack = Some(OpenStackCloud {
                workers: pools
                    .iter()
                    .map(|p| OpenStackWorker { worker: worker(p) })
                    .collect(),
                ..Default::default()
            })
        }
    }

    let mut shoot = Shoot::default();
    shoot.metadata = ObjectMeta::new(namespace, name);
    shoot.spec.cloud = cloud;
    shoot
}

/// AWS shoot with one pool of 3 x `m` on 10-unit standard volumes:
/// cpu 6, memory 12, storage.standard 30, one load balancer.
pub fn shoot(namespace: &str, name: &str) -> Shoot {
    shoot_with_workers(namespace, name, CloudProvider::Aws, &[("pool", "m", "v", "10", 3)])
}

pub fn bound_to(mut shoot: Shoot, kind: &str, binding: &str) -> Shoot {
    shoot.spec.cloud.secret_binding_ref = ObjectReference::with_kind(kind, binding);
    shoot
}

fn quota_refs(quotas: &[(&str, &str)]) -> Vec<ObjectReference> {
    quotas
        .iter()
        .map(|(ns, name)| ObjectReference::new(ns, name))
        .collect()
}

pub fn private_binding(namespace: &str, name: &str, quotas: &[(&str, &str)]) -> PrivateSecretBinding {
    PrivateSecretBinding {
        metadata: ObjectMeta::new(namespace, name),
        quotas: quota_refs(quotas),
        ..Default::default()
    }
}

pub fn cross_binding(namespace: &str, name: &str, quotas: &[(&str, &str)]) -> CrossSecretBinding {
    CrossSecretBinding {
        metadata: ObjectMeta::new(namespace, name),
        secret_ref: ObjectReference::new("garden-secrets", name),
        quotas: quota_refs(quotas),
    }
}

pub fn quota(namespace: &str, name: &str, limits: &[(QuotaMetric, &str)]) -> Quota {
    Quota {
        metadata: ObjectMeta::new(namespace, name),
        spec: QuotaSpec {
            metrics: limits.iter().map(|(m, v)| (*m, q(v))).collect(),
            ..Default::default()
        },
    }
}

/// Synced cache holding the fixture profile.
pub fn cache() -> GardenCache {
    let cache = GardenCache::new();
    cache.upsert(profile());
    cache.mark_synced();
    cache
}

pub const PRIVATE: &str = KIND_PRIVATE_SECRET_BINDING;
pub const CROSS: &str = KIND_CROSS_SECRET_BINDING;
