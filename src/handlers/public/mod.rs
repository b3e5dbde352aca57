// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and account creation.

pub mod login;
pub mod users;

pub use login::{login_post, TokenResponse};
pub use users::users_post;
