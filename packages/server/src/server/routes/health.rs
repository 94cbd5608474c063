use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::domains::announcements::ANNOUNCEMENT_SENT;
use crate::server::app::AxumAppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    announcement_subscribers: usize,
}

/// Health check endpoint
pub async fn health_handler(Extension(state): Extension<AxumAppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        announcement_subscribers: state
            .deps
            .stream_hub
            .subscriber_count(ANNOUNCEMENT_SENT)
            .await,
    })
}
