//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{Extension, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use sha2::{Digest, Sha512};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::{Config, Environment};
use crate::kernel::ServerDeps;
use crate::server::auth::FileSessionStore;
use crate::server::graphql::{create_schema, GraphQLContext};
use crate::server::middleware::{auth_gateway_middleware, ensure_logged_in, CurrentUser};
use crate::server::render::RenderBridge;
use crate::server::routes::{
    admin_page, device_login_handler, fallback_handler, graphql_handler, graphql_playground,
    health_handler, login_handler, login_page, logout_handler, protected_handler,
    subscriptions_handler,
};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "merida.sid";

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub deps: ServerDeps,
    pub renderer: Arc<dyn RenderBridge>,
    pub environment: Environment,
}

/// Middleware to create GraphQLContext per-request
async fn create_graphql_context(
    Extension(state): Extension<AxumAppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Identity was resolved by auth_gateway_middleware
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .and_then(|current| current.0.clone());

    let context = GraphQLContext::from_deps(&state.deps, user);
    request.extensions_mut().insert(context);

    next.run(request).await
}

/// Derive the 64-byte cookie signing key from the configured secret
fn cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

/// Build the Axum application router
///
/// Returns the router and the session store (for the expiry sweeper).
pub async fn build_app(
    config: &Config,
    deps: ServerDeps,
    renderer: Arc<dyn RenderBridge>,
) -> Result<(Router, FileSessionStore)> {
    // Create GraphQL schema (singleton)
    let schema = Arc::new(create_schema());

    let session_store = FileSessionStore::open(&config.session_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to open session directory {}",
                config.session_dir.display()
            )
        })?;

    let session_layer = SessionManagerLayer::new(session_store.clone())
        .with_name(SESSION_COOKIE)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(config.environment.is_production())
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(
            config.session_ttl_hours,
        )))
        // Re-save non-empty sessions on every request so activity slides the expiry
        .with_always_save(true)
        .with_signed(cookie_key(&config.session_secret));

    let app_state = AxumAppState {
        deps: deps.clone(),
        renderer,
        environment: config.environment,
    };

    let resolver = deps.resolver.clone();

    // Browser pages that require a logged-in user
    let admin_routes = Router::new()
        .route("/admin", get(admin_page))
        .route("/admin/*path", get(admin_page))
        .route_layer(middleware::from_fn(ensure_logged_in));

    let mut graphql_route = post(graphql_handler);
    if !config.environment.is_production() {
        graphql_route = graphql_route.get(graphql_playground);
    }

    let app = Router::new()
        .route("/login", get(login_page).post(login_handler))
        .route("/device-login", post(device_login_handler))
        .route("/logout", get(logout_handler))
        .route("/protected", get(protected_handler))
        .route("/api/graphql", graphql_route)
        .route("/api/subscriptions", get(subscriptions_handler))
        .route("/health", get(health_handler))
        .merge(admin_routes)
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .fallback(fallback_handler)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(create_graphql_context)) // Create GraphQL context
        .layer(middleware::from_fn(move |req: Request, next: Next| {
            auth_gateway_middleware(resolver.clone(), req, next)
        })) // Session + token identity
        .layer(session_layer)
        .layer(Extension(app_state)) // Add shared state (must be after middlewares that need it)
        .layer(TraceLayer::new_for_http())
        // State (schema for GraphQL handlers)
        .with_state(schema);

    Ok((app, session_store))
}

/// Spawn periodic housekeeping: expired session files and idle hub topics
pub fn spawn_maintenance_tasks(config: &Config, session_store: FileSessionStore, deps: &ServerDeps) {
    let sweep_period = Duration::from_secs(config.session_sweep_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_period);
        loop {
            interval.tick().await;
            if let Err(e) = session_store.delete_expired().await {
                tracing::warn!(error = %e, "Expired session sweep failed");
            }
        }
    });

    let hub = deps.stream_hub.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            hub.cleanup().await;
        }
    });
}
