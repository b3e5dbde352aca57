// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every handler here runs behind `jwt_auth_middleware` and reads the caller
// from the `AuthUser` extension. All store access is scoped to that user id.

pub mod folders;
pub mod notes;
pub mod session;
pub mod tags;

pub use session::{refresh_post, whoami_get};
