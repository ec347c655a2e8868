use pkg_state::StoreError;
use pkg_types::QuantityError;
use thiserror::Error;

/// Failures while computing a quota decision. None of these is a denial:
/// they mean the stored objects are inconsistent or malformed.
#[derive(Debug, Error)]
pub enum QuotaError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("shoot {shoot} must configure exactly one cloud provider")]
    CloudProviderUndetermined { shoot: String },

    #[error("machine type {machine_type:?} not found in cloud profile {cloud_profile:?}")]
    MachineTypeNotFound {
        machine_type: String,
        cloud_profile: String,
    },

    #[error("volume type {volume_type:?} not found in cloud profile {cloud_profile:?}")]
    VolumeTypeNotFound {
        volume_type: String,
        cloud_profile: String,
    },

    #[error("unknown volume class {class:?} on volume type {volume_type:?}")]
    UnknownVolumeClass { volume_type: String, class: String },

    #[error("Unknown binding type {kind:?}")]
    UnsupportedBindingKind { kind: String },

    #[error("invalid timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid quantity: {0}")]
    Quantity(#[from] QuantityError),
}
