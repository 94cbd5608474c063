//! GraphQL representations of users.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::models::{Group, Role, User};

/// A named role
#[derive(Debug, Clone, juniper::GraphQLObject)]
#[graphql(name = "Role")]
pub struct RoleData {
    pub id: Uuid,
    pub name: String,
}

/// A named group
#[derive(Debug, Clone, juniper::GraphQLObject)]
#[graphql(name = "Group")]
pub struct GroupData {
    pub id: Uuid,
    pub name: String,
}

/// A user, as exposed through GraphQL (no password hash)
#[derive(Debug, Clone, juniper::GraphQLObject)]
#[graphql(name = "User")]
pub struct UserData {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub blocked: bool,
    pub contact_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub roles: Vec<RoleData>,
    pub groups: Vec<GroupData>,
}

impl From<&Role> for RoleData {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id,
            name: role.name.clone(),
        }
    }
}

impl From<&Group> for GroupData {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
        }
    }
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            blocked: user.blocked,
            contact_number: user.contact_number.clone(),
            created_at: user.created_at,
            roles: user.roles.iter().map(RoleData::from).collect(),
            groups: user.groups.iter().map(GroupData::from).collect(),
        }
    }
}
