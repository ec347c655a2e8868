//! Garden API group, kinds and well-known annotations.

/// API group of the garden resources.
pub const GROUP: &str = "garden.sapcloud.io";

/// API version served for the garden resources.
pub const VERSION: &str = "v1beta1";

pub const KIND_SHOOT: &str = "Shoot";
pub const KIND_CLOUD_PROFILE: &str = "CloudProfile";
pub const KIND_PRIVATE_SECRET_BINDING: &str = "PrivateSecretBinding";
pub const KIND_CROSS_SECRET_BINDING: &str = "CrossSecretBinding";
pub const KIND_QUOTA: &str = "Quota";

/// Plural resource name of shoots.
pub const RESOURCE_SHOOTS: &str = "shoots";

/// Annotation carrying the requested expiration time (RFC3339) of a shoot.
pub const SHOOT_EXPIRATION_TIMESTAMP: &str = "shoot.garden.sapcloud.io/expirationTimestamp";

/// Annotation that must be set before a shoot deletion is carried out.
pub const CONFIRMATION_DELETION_TIMESTAMP: &str =
    "confirmation.garden.sapcloud.io/deletionTimestamp";

/// Volume class counted against `storage.standard`.
pub const VOLUME_CLASS_STANDARD: &str = "standard";

/// Volume class counted against `storage.premium`.
pub const VOLUME_CLASS_PREMIUM: &str = "premium";
