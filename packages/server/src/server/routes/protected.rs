use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::server::middleware::CurrentUser;

/// GET /protected - reports whether the request carries an identity
pub async fn protected_handler(Extension(current_user): Extension<CurrentUser>) -> Response {
    if current_user.is_authenticated() {
        (StatusCode::OK, Json("Authenticated User")).into_response()
    } else {
        (StatusCode::BAD_REQUEST, Json("You are not authenticated")).into_response()
    }
}
