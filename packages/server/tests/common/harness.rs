//! In-process test harness.
//!
//! Builds the full router (session layer, auth gateway, routes) over an
//! in-memory user store and a temporary session directory, then drives it
//! with `tower::ServiceExt::oneshot`. No network or database needed.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use gateway_core::domains::auth::{hash_password, TokenService};
use gateway_core::domains::users::{InMemoryUserStore, NewUser, User, UserStore};
use gateway_core::kernel::{ServerDeps, StreamHub};
use gateway_core::server::render::HtmlShellRenderer;
use gateway_core::server::{build_app, SESSION_COOKIE};
use gateway_core::Config;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "nooneknows";
pub const BLOCKED_EMAIL: &str = "blocked@example.com";
pub const BLOCKED_PASSWORD: &str = "letmein";

pub struct TestApp {
    pub router: Router,
    pub config: Config,
    pub deps: ServerDeps,
    pub store: InMemoryUserStore,
    pub admin: User,
    pub blocked: User,
    // Keep the session directory alive for the test
    _session_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let session_dir = tempfile::tempdir().expect("Failed to create session dir");
        let config = Config::for_tests(session_dir.path().to_path_buf());

        let store = InMemoryUserStore::new();
        let admin = store
            .create_user(new_user(ADMIN_EMAIL, "Admin", ADMIN_PASSWORD, false))
            .await
            .expect("Failed to create admin");
        let blocked = store
            .create_user(new_user(BLOCKED_EMAIL, "Blocked", BLOCKED_PASSWORD, true))
            .await
            .expect("Failed to create blocked user");

        let tokens = Arc::new(TokenService::new(
            &config.jwt_auth_secret,
            config.jwt_ttl_hours,
        ));
        let deps = ServerDeps::new(Arc::new(store.clone()), tokens, StreamHub::new());

        let (router, _) = build_app(&config, deps.clone(), Arc::new(HtmlShellRenderer))
            .await
            .expect("Failed to build app");

        Self {
            router,
            config,
            deps,
            store,
            admin,
            blocked,
            _session_dir: session_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }

    /// A valid device token for a user
    pub fn token_for(&self, user: &User) -> String {
        self.deps.tokens.issue(user.id).expect("Failed to issue token")
    }

    /// POST /login with form credentials, optionally carrying a session cookie
    pub async fn login_form(
        &self,
        email: &str,
        password: &str,
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = format!(
            "email={}&password={}",
            urlencoding::encode(email),
            urlencoding::encode(password)
        );
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    /// Log the admin in through the form and return the session cookie
    pub async fn admin_session(&self) -> String {
        let response = self.login_form(ADMIN_EMAIL, ADMIN_PASSWORD, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response).expect("Login did not set a session cookie")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn get_with_auth(&self, uri: &str, authorization: &str) -> Response<Body> {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::AUTHORIZATION, authorization)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        body: Value,
        headers: &[(header::HeaderName, &str)],
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        for (name, value) in headers {
            builder = builder.header(name, *value);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Execute a GraphQL document over HTTP
    pub async fn graphql(
        &self,
        query: &str,
        headers: &[(header::HeaderName, &str)],
    ) -> (StatusCode, Value) {
        let response = self
            .post_json("/api/graphql", serde_json::json!({ "query": query }), headers)
            .await;
        let status = response.status();
        (status, body_json(response).await)
    }
}

fn new_user(email: &str, name: &str, password: &str, blocked: bool) -> NewUser {
    NewUser {
        email: email.to_string(),
        name: name.to_string(),
        password_hash: hash_password(password).expect("Failed to hash password"),
        blocked,
        contact_number: None,
        roles: vec!["Super Admin".to_string()],
        groups: vec!["Admins".to_string()],
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body")
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Body is not JSON")
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).expect("Body is not UTF-8")
}

/// The `name=value` pair of the session cookie set by a response, if any
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    let prefix = format!("{}=", SESSION_COOKIE);
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&prefix))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}
