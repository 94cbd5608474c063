//! Server dependencies
//!
//! Central container for the long-lived services. Everything is constructed
//! explicitly at startup (or in tests) and passed in; nothing is a global.

use std::sync::Arc;

use crate::domains::auth::{CredentialResolver, TokenService};
use crate::domains::users::UserStore;
use crate::kernel::stream_hub::StreamHub;

/// Server dependencies shared by HTTP handlers and GraphQL resolvers
#[derive(Clone)]
pub struct ServerDeps {
    /// Credential store
    pub store: Arc<dyn UserStore>,
    /// Device token issuance/verification
    pub tokens: Arc<TokenService>,
    /// Session + token identity resolution
    pub resolver: CredentialResolver,
    /// In-process pub/sub hub for subscriptions
    pub stream_hub: StreamHub,
}

impl ServerDeps {
    pub fn new(store: Arc<dyn UserStore>, tokens: Arc<TokenService>, stream_hub: StreamHub) -> Self {
        let resolver = CredentialResolver::new(store.clone(), tokens.clone());
        Self {
            store,
            tokens,
            resolver,
            stream_hub,
        }
    }
}
