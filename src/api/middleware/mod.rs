pub mod auth;

pub use auth::{AuthMethod, CurrentUser, MaybeUser, UserAuth};
