// Common types and utilities shared across the application

pub mod auth;

pub use auth::AuthError;
