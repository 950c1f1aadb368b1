use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::{
    exercise,
    metrics::track_metrics,
    middleware::{create_cors_layer, request_id_middleware},
    state::ApiState,
};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .merge(exercise::routes())
        .fallback(handler_404)
}

/// The router with state and the request layers applied.
pub fn app(state: ApiState, allowed_origins: &[String]) -> Router {
    router()
        .with_state(state)
        .layer(middleware::from_fn(track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(create_cors_layer(allowed_origins))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}
