// handlers/mod.rs - HTTP route handlers
//
// admin   /admin/*      shared-secret gated (see middleware::auth)
// auth    /auth/*       Spotify login, callback and token refresh
// health  /health /ping open to any origin

pub mod admin;
pub mod auth;
pub mod health;
