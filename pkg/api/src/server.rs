use axum::{
    Router,
    routing::{get, post, put},
};
use pkg_types::cloudprofile::CloudProfile;
use pkg_types::quota::Quota;
use pkg_types::secretbinding::{CrossSecretBinding, PrivateSecretBinding};
use pkg_types::shoot::Shoot;
use pkg_admission::{PluginContext, all_plugins};
use pkg_state::{CacheSync, GardenCache, StateStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

use crate::AppState;
use crate::handlers::{admission, health, resources, watch};

/// Server configuration passed from the binary's CLI.
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub data_dir: String,
    /// Upper bound an admission call waits for the cache's initial sync.
    pub ready_timeout: Duration,
    pub enabled_plugins: Vec<String>,
}

const API_ROOT: &str = "/apis/garden.sapcloud.io/v1beta1";

/// All routes, without a listener. Split out so tests can drive the router.
pub fn router(state: AppState) -> Router {
    let ns = |resource: &str| format!("{}/namespaces/{{ns}}/{}", API_ROOT, resource);
    let item = |resource: &str| format!("{}/namespaces/{{ns}}/{}/{{name}}", API_ROOT, resource);
    let all = |resource: &str| format!("{}/{}", API_ROOT, resource);

    let api = Router::new()
        // Cloud profiles (cluster-scoped)
        .route(&all("cloudprofiles"), get(resources::list_all::<CloudProfile>))
        .route(
            &format!("{}/cloudprofiles/{{name}}", API_ROOT),
            put(resources::put_cluster::<CloudProfile>)
                .get(resources::get_cluster::<CloudProfile>)
                .delete(resources::delete_cluster::<CloudProfile>),
        )
        // Quotas
        .route(&all("quotas"), get(resources::list_all::<Quota>))
        .route(&ns("quotas"), get(resources::list_namespaced::<Quota>))
        .route(
            &item("quotas"),
            put(resources::put_namespaced::<Quota>)
                .get(resources::get_namespaced::<Quota>)
                .delete(resources::delete_namespaced::<Quota>),
        )
        // Secret bindings
        .route(
            &all("privatesecretbindings"),
            get(resources::list_all::<PrivateSecretBinding>),
        )
        .route(
            &ns("privatesecretbindings"),
            get(resources::list_namespaced::<PrivateSecretBinding>),
        )
        .route(
            &item("privatesecretbindings"),
            put(resources::put_namespaced::<PrivateSecretBinding>)
                .get(resources::get_namespaced::<PrivateSecretBinding>)
                .delete(resources::delete_namespaced::<PrivateSecretBinding>),
        )
        .route(
            &all("crosssecretbindings"),
            get(resources::list_all::<CrossSecretBinding>),
        )
        .route(
            &ns("crosssecretbindings"),
            get(resources::list_namespaced::<CrossSecretBinding>),
        )
        .route(
            &item("crosssecretbindings"),
            put(resources::put_namespaced::<CrossSecretBinding>)
                .get(resources::get_namespaced::<CrossSecretBinding>)
                .delete(resources::delete_namespaced::<CrossSecretBinding>),
        )
        // Shoots: writes go through admission
        .route(&all("shoots"), get(resources::list_all::<Shoot>))
        .route(&ns("shoots"), get(resources::list_namespaced::<Shoot>))
        .route(
            &item("shoots"),
            put(resources::put_shoot)
                .get(resources::get_namespaced::<Shoot>)
                .delete(resources::delete_namespaced::<Shoot>),
        )
        // Watch stream
        .route(&all("watch"), get(watch::watch_events));

    Router::new()
        .route("/validate", post(admission::validate))
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .merge(api)
        .with_state(state)
}

pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize core subsystems
    let store = StateStore::new(&config.data_dir).await?;
    let cache = Arc::new(GardenCache::new());

    // Keep the admission cache in step with the store
    CacheSync::new(store.clone(), cache.clone()).start();
    let ready = cache.clone();
    tokio::spawn(async move {
        ready.wait_synced().await;
        info!("Garden cache synced, admission is ready");
    });

    let ctx = PluginContext::new(cache.clone()).with_ready_timeout(config.ready_timeout);
    let chain = all_plugins()
        .new_chain(&config.enabled_plugins, &ctx)
        .map_err(|e| anyhow::anyhow!("failed to initialize admission plugins: {}", e))?;
    info!("Admission plugins enabled: {:?}", chain.names());

    let state = AppState {
        store,
        cache,
        admission: Arc::new(chain),
    };
    let app = router(state);

    info!("Starting admission server on {}", config.addr);
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
