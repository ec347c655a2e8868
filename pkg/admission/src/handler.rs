use pkg_constants::admission::{READY_POLL_INTERVAL_MILLIS, READY_TIMEOUT_SECS};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::interfaces::{Interface, Operation};

pub type ReadyFunc = Arc<dyn Fn() -> bool + Send + Sync>;

/// Shared plugin plumbing: the verbs a plugin handles and an optional
/// readiness probe it waits on before deciding anything.
#[derive(Clone)]
pub struct Handler {
    operations: HashSet<Operation>,
    ready_func: Option<ReadyFunc>,
    ready_timeout: Duration,
}

impl Handler {
    pub fn new(operations: &[Operation]) -> Self {
        Self {
            operations: operations.iter().copied().collect(),
            ready_func: None,
            ready_timeout: Duration::from_secs(READY_TIMEOUT_SECS),
        }
    }

    pub fn new_create_update() -> Self {
        Self::new(&[Operation::Create, Operation::Update])
    }

    pub fn set_ready_func(&mut self, ready: ReadyFunc) {
        self.ready_func = Some(ready);
    }

    pub fn set_ready_timeout(&mut self, timeout: Duration) {
        self.ready_timeout = timeout;
    }

    /// Block until the readiness probe passes or the timeout elapses.
    /// Without a probe the handler is always ready.
    pub fn wait_for_ready(&self) -> bool {
        let Some(ready) = &self.ready_func else {
            return true;
        };
        let deadline = Instant::now() + self.ready_timeout;
        let interval = Duration::from_millis(READY_POLL_INTERVAL_MILLIS);
        loop {
            if ready() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            std::thread::sleep(interval.min(deadline - now));
        }
    }
}

impl Interface for Handler {
    fn handles(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }
}
