use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;
use tracing::debug;

use crate::domains::auth::CredentialResolver;
use crate::domains::users::User;
use crate::server::auth::session_user_id;

/// Identity resolved for the current request (None = anonymous)
#[derive(Clone, Debug, Default)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

/// Auth gateway middleware
///
/// Runs once per request before any handler. Collects the session user and
/// the bearer token, resolves them (session first) and stores `CurrentUser`
/// in request extensions.
///
/// Note: This middleware never rejects a request. Every failure degrades to
/// anonymous; guards and resolvers make the authorization decisions.
pub async fn auth_gateway_middleware(
    resolver: CredentialResolver,
    mut request: Request,
    next: Next,
) -> Response {
    // Owned copies: the request body is not Sync, so no borrow of the
    // request may be held across an await.
    let session = request.extensions().get::<Session>().cloned();
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let current_user = resolve_current_user(&resolver, session, authorization).await;

    match current_user.user() {
        Some(user) => debug!(user_id = %user.id, "Authenticated request"),
        None => debug!("Anonymous request"),
    }

    request.extensions_mut().insert(current_user);
    next.run(request).await
}

/// Resolve the identity from the request's session and `Authorization` value
async fn resolve_current_user(
    resolver: &CredentialResolver,
    session: Option<Session>,
    authorization: Option<String>,
) -> CurrentUser {
    let session_user = match &session {
        Some(session) => session_user_id(session).await,
        None => None,
    };

    CurrentUser(resolver.resolve(session_user, authorization.as_deref()).await)
}
