use pkg_state::GardenListers;
use pkg_types::ResourceVector;
use pkg_types::quota::Quota;
use pkg_types::shoot::Shoot;
use tracing::debug;

use crate::error::QuotaError;
use crate::references::shoots_referencing_quota;
use crate::resources::resources_for_shoot;

/// Resources already claimed against `quota` by shoots other than `candidate`.
pub fn allocated_resources(
    listers: &dyn GardenListers,
    quota: &Quota,
    candidate: &Shoot,
) -> Result<ResourceVector, QuotaError> {
    let shoots = shoots_referencing_quota(listers, quota, candidate)?;
    let allocated = shoots
        .iter()
        .map(|shoot| resources_for_shoot(listers, shoot))
        .sum::<Result<ResourceVector, QuotaError>>()?;
    debug!(
        quota = %quota.metadata.name,
        namespace = %quota.metadata.namespace,
        shoots = shoots.len(),
        "Computed allocated quota resources"
    );
    Ok(allocated)
}

/// Allocated resources plus what `candidate` itself would consume.
pub fn required_resources(
    listers: &dyn GardenListers,
    quota: &Quota,
    candidate: &Shoot,
) -> Result<ResourceVector, QuotaError> {
    let allocated = allocated_resources(listers, quota, candidate)?;
    Ok(allocated + resources_for_shoot(listers, candidate)?)
}
