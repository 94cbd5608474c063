use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named role attached to a user (e.g. "Super Admin")
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
}

/// A named group a user belongs to (e.g. "Admins")
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
}

/// User identity as stored in the credential store
///
/// Users are never hard-deleted; `blocked` disables every credential path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub blocked: bool,
    pub contact_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub roles: Vec<Role>,
    pub groups: Vec<Group>,
}

impl User {
    /// Whether the user carries a role with the given name.
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|role| role.name == name)
    }

    /// Whether the user belongs to a group with the given name.
    pub fn in_group(&self, name: &str) -> bool {
        self.groups.iter().any(|group| group.name == name)
    }
}

/// Input for creating a user; the password must already be hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub blocked: bool,
    pub contact_number: Option<String>,
    pub roles: Vec<String>,
    pub groups: Vec<String>,
}

/// Normalize an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
