//! Page routes handed to the render bridge.

use axum::{
    extract::{Extension, Query},
    http::{Method, Uri},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;

use crate::server::app::AxumAppState;
use crate::server::error::AppError;
use crate::server::middleware::CurrentUser;
use crate::server::render::PageRequest;

/// GET /admin, /admin/* - guarded by `ensure_logged_in`
pub async fn admin_page(
    Extension(state): Extension<AxumAppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<HashMap<String, String>>,
    uri: Uri,
) -> Response {
    state
        .renderer
        .render(PageRequest {
            path: uri.path().to_string(),
            query,
            user: current_user.0,
            flash: Vec::new(),
        })
        .await
}

/// Fallback: unmatched GETs go to the page renderer, anything else is a 404
pub async fn fallback_handler(
    Extension(state): Extension<AxumAppState>,
    Extension(current_user): Extension<CurrentUser>,
    method: Method,
    uri: Uri,
    query: Option<Query<HashMap<String, String>>>,
) -> Response {
    if method != Method::GET {
        return AppError::NotFound.into_response();
    }

    state
        .renderer
        .render(PageRequest {
            path: uri.path().to_string(),
            query: query.map(|Query(q)| q).unwrap_or_default(),
            user: current_user.0,
            flash: Vec::new(),
        })
        .await
}
