use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

/// Scopes requested from Spotify on login. The web player needs `streaming`
/// plus the playback-state scopes to drive the device.
pub const SPOTIFY_SCOPES: &[&str] = &[
    "streaming",
    "user-read-email",
    "user-read-private",
    "user-read-playback-state",
    "user-modify-playback-state",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub moderation: ModerationConfig,
    pub security: SecurityConfig,
    pub spotify: SpotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    /// Retry a listing once when the failure looks like a dropped connection.
    pub retry_transient: bool,
    pub decisions_view: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub admin_prefix: String,
    pub admin_header: String,
    /// Shared secret for the admin panel. `None` rejects every admin request.
    #[serde(skip_serializing)]
    pub admin_secret: Option<String>,
    pub cors_origins: Vec<String>,
    pub secure_cookies: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub authorize_url: String,
    pub token_url: String,
    /// Where the browser lands after a successful login.
    pub app_url: String,
    pub state_ttl_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("PATOU_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("PATOU_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = non_empty(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RETRY_TRANSIENT") {
            self.database.retry_transient = v.parse().unwrap_or(self.database.retry_transient);
        }
        if let Ok(v) = env::var("DATABASE_DECISIONS_VIEW") {
            self.database.decisions_view = v;
        }

        // Moderation overrides
        if let Ok(v) = env::var("MODERATION_DEFAULT_PAGE_SIZE") {
            self.moderation.default_page_size = v.parse().unwrap_or(self.moderation.default_page_size);
        }
        if let Ok(v) = env::var("MODERATION_MAX_PAGE_SIZE") {
            self.moderation.max_page_size = v.parse().unwrap_or(self.moderation.max_page_size);
        }

        // Security overrides
        if let Ok(v) = env::var("ADMIN_SECRET") {
            self.security.admin_secret = non_empty(v);
        }
        if let Ok(v) = env::var("ADMIN_HEADER") {
            self.security.admin_header = v.to_ascii_lowercase();
        }
        if let Ok(v) = env::var("ADMIN_PREFIX") {
            self.security.admin_prefix = v;
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SECURITY_SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }

        // Spotify overrides
        if let Ok(v) = env::var("SPOTIFY_CLIENT_ID") {
            self.spotify.client_id = non_empty(v);
        }
        if let Ok(v) = env::var("SPOTIFY_CLIENT_SECRET") {
            self.spotify.client_secret = non_empty(v);
        }
        if let Ok(v) = env::var("SPOTIFY_REDIRECT_URI") {
            self.spotify.redirect_uri = non_empty(v);
        }
        if let Ok(v) = env::var("SPOTIFY_AUTHORIZE_URL") {
            self.spotify.authorize_url = v;
        }
        if let Ok(v) = env::var("SPOTIFY_TOKEN_URL") {
            self.spotify.token_url = v;
        }
        if let Ok(v) = env::var("PATOU_APP_URL") {
            self.spotify.app_url = v;
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8888,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
                retry_transient: true,
                decisions_view: "latest_track_decisions".to_string(),
            },
            moderation: ModerationConfig {
                default_page_size: 50,
                max_page_size: 200,
            },
            security: SecurityConfig {
                admin_prefix: "/admin".to_string(),
                admin_header: "x-admin-token".to_string(),
                admin_secret: None,
                cors_origins: vec!["http://localhost:5173".to_string(), "http://localhost:8888".to_string()],
                secure_cookies: false,
            },
            spotify: SpotifyConfig::defaults("http://localhost:5173/"),
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8888,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 10,
                retry_transient: true,
                decisions_view: "latest_track_decisions".to_string(),
            },
            moderation: ModerationConfig {
                default_page_size: 50,
                max_page_size: 200,
            },
            security: SecurityConfig {
                admin_prefix: "/admin".to_string(),
                admin_header: "x-admin-token".to_string(),
                admin_secret: None,
                cors_origins: vec!["https://staging.patou.app".to_string()],
                secure_cookies: true,
            },
            spotify: SpotifyConfig::defaults("https://staging.patou.app/"),
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8888,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
                retry_transient: true,
                decisions_view: "latest_track_decisions".to_string(),
            },
            moderation: ModerationConfig {
                default_page_size: 50,
                max_page_size: 100,
            },
            security: SecurityConfig {
                admin_prefix: "/admin".to_string(),
                admin_header: "x-admin-token".to_string(),
                admin_secret: None,
                cors_origins: vec!["https://patou.app".to_string()],
                secure_cookies: true,
            },
            spotify: SpotifyConfig::defaults("https://patou.app/"),
        }
    }
}

impl SpotifyConfig {
    fn defaults(app_url: &str) -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            authorize_url: "https://accounts.spotify.com/authorize".to_string(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            app_url: app_url.to_string(),
            state_ttl_secs: 600,
        }
    }
}

/// Blank means unset. Anything else is kept exactly as given.
fn non_empty(v: String) -> Option<String> {
    if v.trim().is_empty() {
        None
    } else {
        Some(v)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
