//! services/api/src/web/mod.rs

pub mod admin;
pub mod middleware;
pub mod rest;
pub mod state;

pub use middleware::{rate_limit, require_admin_key};
pub use state::AppState;
