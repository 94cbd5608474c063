// Merida Gateway - API Core
//
// Authenticated GraphQL gateway: browser sessions and device tokens are merged
// into one request identity before GraphQL, page and API handlers run.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
