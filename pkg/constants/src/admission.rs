//! Admission plugin constants.

/// Registered name of the shoot quota admission plugin.
pub const SHOOT_QUOTA_VALIDATOR: &str = "ShootQuotaValidator";

/// How long an admission call waits for the cache's initial sync.
pub const READY_TIMEOUT_SECS: u64 = 10;

/// Poll interval while waiting for the cache's initial sync.
pub const READY_POLL_INTERVAL_MILLIS: u64 = 100;

/// Message returned while the cache has not synced yet.
pub const NOT_READY_MESSAGE: &str = "not yet ready to handle request";
