// HTTP routes
pub mod graphql;
pub mod health;
pub mod login;
pub mod pages;
pub mod protected;
pub mod subscriptions;

pub use graphql::*;
pub use health::*;
pub use login::*;
pub use pages::*;
pub use protected::*;
pub use subscriptions::*;
