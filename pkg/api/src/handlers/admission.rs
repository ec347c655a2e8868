use axum::{Json, extract::State, http::StatusCode, response::IntoResponse, response::Response};
use pkg_admission::errors::AdmissionError;
use pkg_admission::review::{AdmissionResponse, AdmissionReview, Status};
use pkg_admission::{AdmissionResult, Attributes};
use tracing::{info, warn};

use crate::AppState;

/// Run the admission chain off the async runtime; plugins may block while
/// waiting for the cache to warm.
pub async fn run_admission<A>(state: &AppState, attributes: A) -> AdmissionResult<()>
where
    A: Attributes + Send + 'static,
{
    let chain = state.admission.clone();
    match tokio::task::spawn_blocking(move || chain.validate(&attributes)).await {
        Ok(result) => result,
        Err(e) => Err(AdmissionError::internal_error(format!(
            "admission task failed: {}",
            e
        ))),
    }
}

/// Map an admission rejection onto an HTTP response.
pub fn rejection(err: &AdmissionError) -> Response {
    let code = StatusCode::from_u16(err.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (code, Json(Status::from(err))).into_response()
}

/// POST /validate: validating webhook endpoint.
pub async fn validate(
    State(state): State<AppState>,
    Json(review): Json<AdmissionReview>,
) -> impl IntoResponse {
    let Some(request) = review.request else {
        return (StatusCode::BAD_REQUEST, "AdmissionReview carries no request").into_response();
    };
    let uid = request.uid.clone();

    let result = match request.to_attributes() {
        Ok(attributes) => run_admission(&state, attributes).await,
        Err(e) => Err(e),
    };
    match &result {
        Ok(()) => info!(
            "Admitted {} {}/{} (uid={})",
            request.operation, request.namespace, request.name, uid
        ),
        Err(e) => warn!(
            "Rejected {} {}/{} (uid={}): {}",
            request.operation, request.namespace, request.name, uid, e
        ),
    }

    let response = AdmissionResponse::from_result(&uid, &result);
    (StatusCode::OK, Json(AdmissionReview::response(response))).into_response()
}
