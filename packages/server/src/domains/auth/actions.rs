//! Password login shared by the browser and device endpoints.

use tracing::{debug, info};

use super::password::verify_password;
use crate::common::AuthError;
use crate::domains::users::{User, UserStore};

/// Check email/password credentials against the store
///
/// Blocked users are rejected even with a correct password.
pub async fn authenticate(
    email: &str,
    password: &str,
    store: &dyn UserStore,
) -> Result<User, AuthError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::InvalidRequest);
    }

    let user = store
        .find_by_email(email)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    if !verify_password(&user.password_hash, password) {
        debug!(user_id = %user.id, "Password mismatch");
        return Err(AuthError::IncorrectPassword);
    }

    if user.blocked {
        info!(user_id = %user.id, "Blocked user attempted login");
        return Err(AuthError::Blocked);
    }

    Ok(user)
}
