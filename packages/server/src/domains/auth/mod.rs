//! Auth domain - password login, device tokens and credential resolution
//!
//! Responsibilities:
//! - Argon2 password hashing and verification
//! - JWT issuance/verification for device clients
//! - Merging session and token credentials into one identity

pub mod actions;
pub mod credentials;
pub mod jwt;
pub mod password;

pub use actions::authenticate;
pub use credentials::{Credential, CredentialResolver};
pub use jwt::{bearer_token, TokenClaims, TokenService};
pub use password::{hash_password, verify_password};
