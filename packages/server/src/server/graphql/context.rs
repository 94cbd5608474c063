use std::sync::Arc;

use crate::domains::users::{User, UserStore};
use crate::kernel::{ServerDeps, StreamHub};

/// GraphQL request context
///
/// Built per HTTP request, or once per WebSocket connection. The identity is
/// fixed for the context's lifetime; an open subscription keeps the user it
/// connected with.
#[derive(Clone)]
pub struct GraphQLContext {
    pub user: Option<User>,
    pub store: Arc<dyn UserStore>,
    pub stream_hub: StreamHub,
}

impl juniper::Context for GraphQLContext {}

impl GraphQLContext {
    pub fn new(user: Option<User>, store: Arc<dyn UserStore>, stream_hub: StreamHub) -> Self {
        Self {
            user,
            store,
            stream_hub,
        }
    }

    /// Context for the given identity sharing the server's store and hub
    pub fn from_deps(deps: &ServerDeps, user: Option<User>) -> Self {
        Self::new(user, deps.store.clone(), deps.stream_hub.clone())
    }
}
