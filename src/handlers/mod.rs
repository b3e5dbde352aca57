// handlers/mod.rs - Public (no auth) and protected (JWT auth) handlers
pub mod protected;
pub mod public;
pub mod utils;
