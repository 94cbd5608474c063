pub mod user;

pub use user::{normalize_email, Group, NewUser, Role, User};
