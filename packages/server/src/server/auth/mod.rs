// Browser session plumbing
pub mod session;

pub use session::*;
