// handlers/auth/mod.rs - Spotify authorization code flow
//
// GET  /auth/login     302 to Spotify, state token kept in a cookie
// GET  /auth/callback  verify state, exchange code, keep refresh token in a cookie
// POST /auth/refresh   trade the refresh cookie for a fresh access token

pub mod callback;
pub mod login;
pub mod refresh;
pub mod utils;

pub use callback::get as callback_get;
pub use login::get as login_get;
pub use refresh::post as refresh_post;
