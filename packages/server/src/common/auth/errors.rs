use thiserror::Error;

use crate::domains::users::StoreError;

/// Credential check failures for the login endpoints
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid request")]
    InvalidRequest,

    #[error("User not found")]
    UserNotFound,

    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("Account is blocked")]
    Blocked,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl AuthError {
    /// Message flashed to the browser login page.
    pub fn flash_message(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "Email and password are required!",
            Self::UserNotFound => "User not found!",
            Self::IncorrectPassword => "Incorrect password!",
            Self::Blocked => "Account is blocked!",
            Self::Store(_) | Self::InternalError(_) => "Login failed, please try again.",
        }
    }

    /// Message returned in the `/device-login` JSON body.
    pub fn device_message(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "Invalid request.",
            Self::UserNotFound => "Incorrect email.",
            Self::IncorrectPassword => "Incorrect password.",
            Self::Blocked => "Account is blocked.",
            Self::Store(_) | Self::InternalError(_) => "Login failed.",
        }
    }

    /// Whether the failure is the caller's fault (bad credentials) rather than ours.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Store(_) | Self::InternalError(_))
    }
}
