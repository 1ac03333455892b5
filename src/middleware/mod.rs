pub mod auth;

pub use auth::{admin_gate_middleware, is_admin_path};
