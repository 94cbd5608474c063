//! Browser and device login endpoints.

use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tower_sessions::Session;
use tracing::{error, info, warn};

use crate::common::AuthError;
use crate::domains::auth::authenticate;
use crate::server::app::AxumAppState;
use crate::server::auth::{log_in, push_flash, take_flash, take_return_to};
use crate::server::render::PageRequest;

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeviceLoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceLoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /login - render the login page with any pending flash messages
pub async fn login_page(
    Extension(state): Extension<AxumAppState>,
    session: Session,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let flash = take_flash(&session).await;
    state
        .renderer
        .render(PageRequest {
            path: "/login".to_string(),
            query,
            user: None,
            flash,
        })
        .await
}

/// POST /login - form login establishing a browser session
///
/// Success redirects to the page that sent the user to login (or `/`);
/// any failure flashes a message and redirects back to `/login`.
pub async fn login_handler(
    Extension(state): Extension<AxumAppState>,
    session: Session,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    let LoginForm { email, password } = form.map(|Form(f)| f).unwrap_or_default();
    let email = email.unwrap_or_default();
    let password = password.unwrap_or_default();

    let user = match authenticate(&email, &password, state.deps.store.as_ref()).await {
        Ok(user) => user,
        Err(e) => {
            if e.is_client_error() {
                info!(reason = %e, "Login rejected");
            } else {
                error!(error = %e, "Login failed");
            }
            push_flash(&session, e.flash_message()).await;
            return Redirect::to("/login").into_response();
        }
    };

    let return_to = take_return_to(&session).await;
    if let Err(e) = log_in(&session, user.id).await {
        error!(error = %e, "Failed to store session login");
        push_flash(&session, AuthError::InternalError(e.into()).flash_message()).await;
        return Redirect::to("/login").into_response();
    }

    info!(user_id = %user.id, "User logged in");
    Redirect::to(return_to.as_deref().unwrap_or("/")).into_response()
}

/// POST /device-login - exchange credentials for a bearer token
pub async fn device_login_handler(
    Extension(state): Extension<AxumAppState>,
    body: Result<Json<DeviceLoginRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection, "Malformed device login body");
            return device_login_error(&AuthError::InvalidRequest);
        }
    };

    let (email, password) = match (request.email, request.password) {
        (Some(email), Some(password)) => (email, password),
        _ => return device_login_error(&AuthError::InvalidRequest),
    };

    let user = match authenticate(&email, &password, state.deps.store.as_ref()).await {
        Ok(user) => user,
        Err(e) => return device_login_error(&e),
    };

    match state.deps.tokens.issue(user.id) {
        Ok(token) => {
            info!(user_id = %user.id, "Issued device token");
            (StatusCode::OK, Json(DeviceLoginResponse { token })).into_response()
        }
        Err(e) => device_login_error(&AuthError::InternalError(e)),
    }
}

fn device_login_error(e: &AuthError) -> Response {
    let status = if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        error!(error = %e, "Device login failed");
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(MessageResponse {
            message: e.device_message().to_string(),
        }),
    )
        .into_response()
}

/// GET /logout - destroy the session
pub async fn logout_handler(session: Session) -> Redirect {
    if let Err(e) = session.flush().await {
        warn!(error = %e, "Failed to destroy session on logout");
    }
    Redirect::to("/login")
}
