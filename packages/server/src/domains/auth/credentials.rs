//! Unified credential resolution.
//!
//! Browser sessions and device bearer tokens are collected into one ordered
//! list of credentials and resolved to at most one user. Session credentials
//! come first, so a session identity wins over a token.

use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::jwt::{TokenClaims, TokenService};
use crate::domains::users::{User, UserStore};

/// A credential presented by a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// User reference stored in the server-side session
    Session(Uuid),
    /// Verified bearer token claims
    Token(TokenClaims),
}

impl Credential {
    pub fn user_id(&self) -> Uuid {
        match self {
            Self::Session(id) => *id,
            Self::Token(claims) => claims.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Session(_) => "session",
            Self::Token(_) => "token",
        }
    }
}

/// Resolves request credentials to a user
#[derive(Clone)]
pub struct CredentialResolver {
    store: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn UserStore>, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }

    /// Collect credentials in precedence order (session, then token)
    pub fn credentials(
        &self,
        session_user: Option<Uuid>,
        authorization: Option<&str>,
    ) -> Vec<Credential> {
        let mut credentials = Vec::with_capacity(2);

        if let Some(id) = session_user {
            credentials.push(Credential::Session(id));
        }

        if let Some(claims) = authorization.and_then(|value| self.tokens.verify(value)) {
            credentials.push(Credential::Token(claims));
        }

        credentials
    }

    /// Resolve to the first credential naming an existing, unblocked user
    ///
    /// Every failure degrades to anonymous; nothing is returned to the caller
    /// except the absence of a user.
    pub async fn resolve(
        &self,
        session_user: Option<Uuid>,
        authorization: Option<&str>,
    ) -> Option<User> {
        for credential in self.credentials(session_user, authorization) {
            let user_id = credential.user_id();
            match self.store.find_by_id(user_id).await {
                Ok(Some(user)) if !user.blocked => {
                    debug!(user_id = %user.id, via = credential.kind(), "Resolved identity");
                    return Some(user);
                }
                Ok(Some(_)) => {
                    debug!(%user_id, via = credential.kind(), "Credential names a blocked user");
                }
                Ok(None) => {
                    debug!(%user_id, via = credential.kind(), "Credential names an unknown user");
                }
                Err(e) => {
                    warn!(error = %e, %user_id, via = credential.kind(), "User lookup failed");
                }
            }
        }

        None
    }
}
