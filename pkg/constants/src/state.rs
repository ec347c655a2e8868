//! State store / cache constants.

/// Root of every object key in the store.
/// Object keys are `<prefix><resource>/<namespace>/<name>`, or
/// `<prefix><resource>/<name>` for cluster-scoped kinds.
pub const REGISTRY_PREFIX: &str = "/registry/";

/// Number of recent watch events kept in memory for replay.
pub const EVENT_LOG_CAPACITY: usize = 4096;

/// Capacity of the live watch broadcast channel.
pub const EVENT_BROADCAST_CAPACITY: usize = 1024;

/// Delay before retrying a failed initial list.
pub const RELIST_BACKOFF_SECS: u64 = 2;
