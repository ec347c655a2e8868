use pkg_state::GardenListers;
use pkg_types::quota::Quota;
use pkg_types::secretbinding::{BindingKind, SecretBinding};
use pkg_types::shoot::Shoot;
use pkg_types::{GardenObject, ObjectReference};

use crate::error::QuotaError;

/// Quotas governing `shoot`, read from the secret binding it references.
pub fn quota_refs_for_shoot(
    listers: &dyn GardenListers,
    shoot: &Shoot,
) -> Result<Vec<ObjectReference>, QuotaError> {
    let binding_ref = shoot.binding_ref();
    let namespace = &shoot.metadata.namespace;
    match BindingKind::from_kind(&binding_ref.kind) {
        Some(BindingKind::Private) => Ok(listers
            .private_secret_binding(namespace, &binding_ref.name)?
            .quotas),
        Some(BindingKind::Cross) => Ok(listers
            .cross_secret_binding(namespace, &binding_ref.name)?
            .quotas),
        None => Err(QuotaError::UnsupportedBindingKind {
            kind: binding_ref.kind.clone(),
        }),
    }
}

/// Every shoot other than `candidate` that is bound to `quota` through a
/// binding of either kind.
pub fn shoots_referencing_quota(
    listers: &dyn GardenListers,
    quota: &Quota,
    candidate: &Shoot,
) -> Result<Vec<Shoot>, QuotaError> {
    let mut shoots = Vec::new();
    for binding in listers.private_secret_bindings()? {
        collect_bound_shoots(listers, &binding, quota, candidate, &mut shoots)?;
    }
    for binding in listers.cross_secret_bindings()? {
        collect_bound_shoots(listers, &binding, quota, candidate, &mut shoots)?;
    }
    Ok(shoots)
}

fn collect_bound_shoots<B: SecretBinding>(
    listers: &dyn GardenListers,
    binding: &B,
    quota: &Quota,
    candidate: &Shoot,
    out: &mut Vec<Shoot>,
) -> Result<(), QuotaError> {
    if !binding.references_quota(&quota.metadata) {
        return Ok(());
    }
    let binding_meta = binding.metadata();
    let bound = listers
        .shoots(&binding_meta.namespace)?
        .into_iter()
        .filter(|s| {
            let r = s.binding_ref();
            r.kind == B::BINDING_KIND.as_str() && r.name == binding_meta.name
        })
        .filter(|s| !s.metadata.same_identity(&candidate.metadata));
    out.extend(bound);
    Ok(())
}
