use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::CurrentUser;
use crate::server::auth::set_return_to;

/// Route guard for browser pages
///
/// Anonymous requests are redirected to `/login`; the requested path is kept
/// in the session so a successful login can send the user back.
pub async fn ensure_logged_in(session: Session, request: Request, next: Next) -> Response {
    let authenticated = request
        .extensions()
        .get::<CurrentUser>()
        .is_some_and(CurrentUser::is_authenticated);

    if authenticated {
        return next.run(request).await;
    }

    let return_to = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    set_return_to(&session, &return_to).await;

    Redirect::to("/login").into_response()
}
