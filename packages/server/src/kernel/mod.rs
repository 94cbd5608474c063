//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod stream_hub;

pub use deps::ServerDeps;
pub use stream_hub::StreamHub;
