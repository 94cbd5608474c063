//! Users domain - the credential store
//!
//! Responsibilities:
//! - User, role and group records
//! - Lookup by id (session and token resolution) and by email (login)
//! - User creation for the seed/admin flow

pub mod data;
pub mod models;
pub mod postgres;
pub mod store;

pub use data::{GroupData, RoleData, UserData};
pub use models::{Group, NewUser, Role, User};
pub use postgres::PgUserStore;
pub use store::{InMemoryUserStore, StoreError, UserStore};
