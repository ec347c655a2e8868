pub mod handlers;
pub mod server;

use std::sync::Arc;

use pkg_admission::ValidationChain;
use pkg_state::{GardenCache, StateStore};

/// Shared application state injected into all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: StateStore,
    pub cache: Arc<GardenCache>,
    pub admission: Arc<ValidationChain>,
}
