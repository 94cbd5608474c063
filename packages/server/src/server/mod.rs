// HTTP server setup (Axum + GraphQL + sessions)
pub mod app;
pub mod auth;
pub mod error;
pub mod graphql;
pub mod middleware;
pub mod render;
pub mod routes;

pub use app::*;
pub use graphql::*;
