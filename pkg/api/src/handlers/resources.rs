use axum::{
    Json,
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use pkg_admission::{AttributesRecord, Operation};
use pkg_types::GardenObject;
use pkg_types::shoot::Shoot;
use pkg_types::validate::validate_metadata;
use tracing::{info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::handlers::admission::{rejection, run_admission};

/// Carry server-owned metadata over from the stored version, or stamp it
/// on first write.
fn prepare<T: GardenObject>(obj: &mut T, namespace: &str, name: &str, old: Option<&T>) {
    let meta = obj.metadata_mut();
    meta.name = name.to_string();
    meta.namespace = namespace.to_string();
    match old {
        Some(old) => {
            meta.uid = old.metadata().uid.clone();
            meta.creation_timestamp = old.metadata().creation_timestamp;
        }
        None => {
            meta.uid = Uuid::new_v4().to_string();
            meta.creation_timestamp = Some(Utc::now());
        }
    }
}

async fn load<T: GardenObject>(
    state: &AppState,
    namespace: &str,
    name: &str,
) -> Result<Option<T>, Response> {
    state.store.get_object(namespace, name).await.map_err(|e| {
        warn!("Failed to read {} {}/{}: {}", T::KIND, namespace, name, e);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

async fn store<T: GardenObject>(state: &AppState, obj: T, created: bool) -> Response {
    if let Err(e) = state.store.put_object(&obj).await {
        warn!("Failed to store {} {}: {}", T::KIND, obj.object_key(), e);
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to store {}", T::KIND))
            .into_response();
    }
    let status = if created {
        info!("Created {} {}", T::KIND, obj.object_key());
        StatusCode::CREATED
    } else {
        info!("Updated {} {}", T::KIND, obj.object_key());
        StatusCode::OK
    };
    (status, Json(obj)).into_response()
}

async fn put_object<T: GardenObject>(
    state: AppState,
    namespace: String,
    name: String,
    mut obj: T,
) -> Response {
    let old = match load::<T>(&state, &namespace, &name).await {
        Ok(old) => old,
        Err(resp) => return resp,
    };
    prepare(&mut obj, &namespace, &name, old.as_ref());
    if let Err(e) = validate_metadata(&obj) {
        return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
    }
    store(&state, obj, old.is_none()).await
}

async fn get_object<T: GardenObject>(state: AppState, namespace: String, name: String) -> Response {
    match load::<T>(&state, &namespace, &name).await {
        Ok(Some(obj)) => (StatusCode::OK, Json(obj)).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(resp) => resp,
    }
}

async fn list_objects<T: GardenObject>(state: AppState, namespace: Option<&str>) -> Response {
    match state.store.list_objects::<T>(namespace).await {
        Ok(objects) => (StatusCode::OK, Json(objects)).into_response(),
        Err(e) => {
            warn!("Failed to list {}: {}", T::RESOURCE, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn delete_object<T: GardenObject>(state: AppState, namespace: String, name: String) -> Response {
    match state.store.delete_object::<T>(&namespace, &name).await {
        Ok(true) => {
            info!("Deleted {} {}/{}", T::KIND, namespace, name);
            StatusCode::OK.into_response()
        }
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!("Failed to delete {} {}/{}: {}", T::KIND, namespace, name, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// ============================================================
// Namespaced resources
// ============================================================

/// PUT /apis/garden.sapcloud.io/v1beta1/namespaces/{ns}/{resource}/{name}
pub async fn put_namespaced<T: GardenObject>(
    State(state): State<AppState>,
    AxumPath((ns, name)): AxumPath<(String, String)>,
    Json(obj): Json<T>,
) -> impl IntoResponse {
    put_object(state, ns, name, obj).await
}

pub async fn get_namespaced<T: GardenObject>(
    State(state): State<AppState>,
    AxumPath((ns, name)): AxumPath<(String, String)>,
) -> impl IntoResponse {
    get_object::<T>(state, ns, name).await
}

pub async fn list_namespaced<T: GardenObject>(
    State(state): State<AppState>,
    AxumPath(ns): AxumPath<String>,
) -> impl IntoResponse {
    list_objects::<T>(state, Some(&ns)).await
}

/// List across all namespaces.
pub async fn list_all<T: GardenObject>(State(state): State<AppState>) -> impl IntoResponse {
    list_objects::<T>(state, None).await
}

pub async fn delete_namespaced<T: GardenObject>(
    State(state): State<AppState>,
    AxumPath((ns, name)): AxumPath<(String, String)>,
) -> impl IntoResponse {
    delete_object::<T>(state, ns, name).await
}

// ============================================================
// Cluster-scoped resources
// ============================================================

pub async fn put_cluster<T: GardenObject>(
    State(state): State<AppState>,
    AxumPath(name): AxumPath<String>,
    Json(obj): Json<T>,
) -> impl IntoResponse {
    put_object(state, String::new(), name, obj).await
}

pub async fn get_cluster<T: GardenObject>(
    State(state): State<AppState>,
    AxumPath(name): AxumPath<String>,
) -> impl IntoResponse {
    get_object::<T>(state, String::new(), name).await
}

pub async fn delete_cluster<T: GardenObject>(
    State(state): State<AppState>,
    AxumPath(name): AxumPath<String>,
) -> impl IntoResponse {
    delete_object::<T>(state, String::new(), name).await
}

// ============================================================
// Shoots
// ============================================================

/// PUT /apis/garden.sapcloud.io/v1beta1/namespaces/{ns}/shoots/{name}
///
/// Creates and updates pass the admission chain before anything is written.
pub async fn put_shoot(
    State(state): State<AppState>,
    AxumPath((ns, name)): AxumPath<(String, String)>,
    Json(mut shoot): Json<Shoot>,
) -> impl IntoResponse {
    let old = match load::<Shoot>(&state, &ns, &name).await {
        Ok(old) => old,
        Err(resp) => return resp,
    };
    prepare(&mut shoot, &ns, &name, old.as_ref());
    if let Err(e) = validate_metadata(&shoot) {
        return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
    }

    let operation = if old.is_some() {
        Operation::Update
    } else {
        Operation::Create
    };
    let attributes = match AttributesRecord::for_shoot(operation, &shoot, old.as_ref()) {
        Ok(attributes) => attributes,
        Err(e) => return rejection(&e),
    };
    if let Err(e) = run_admission(&state, attributes).await {
        warn!("Shoot {}/{} rejected: {}", ns, name, e);
        return rejection(&e);
    }

    store(&state, shoot, old.is_none()).await
}
