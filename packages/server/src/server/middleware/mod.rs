// HTTP middleware
pub mod auth_gateway;
pub mod guards;

pub use auth_gateway::*;
pub use guards::*;
