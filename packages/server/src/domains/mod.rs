// Domain modules
pub mod announcements;
pub mod auth;
pub mod users;
