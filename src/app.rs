use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{Authorizer, SharedSecretAuthorizer};
use crate::config::{AppConfig, SecurityConfig};
use crate::database::repository::DecisionStore;
use crate::handlers;
use crate::middleware::admin_gate_middleware;
use crate::services::ModerationService;

/// Shared, read-only per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub moderation: ModerationService,
    pub authorizer: Arc<dyn Authorizer>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DecisionStore>) -> Self {
        let moderation = ModerationService::new(store, config.moderation.clone(), config.database.retry_transient);
        let authorizer = Arc::new(SharedSecretAuthorizer::from_config(&config.security));

        Self {
            config: Arc::new(config),
            moderation,
            authorizer,
            http: reqwest::Client::new(),
        }
    }

    /// Replace the default shared-secret check
    pub fn with_authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }
}

pub fn build_router(state: AppState) -> Router {
    // Health probes are hit by anything, from anywhere
    let health_routes = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ping", get(handlers::health::ping))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods([Method::GET]));

    let admin_routes = Router::new().route("/songs", get(handlers::admin::songs_get));

    let app_routes = Router::new()
        .nest(&state.config.security.admin_prefix, admin_routes)
        .route("/auth/login", get(handlers::auth::login_get))
        .route("/auth/callback", get(handlers::auth::callback_get))
        .route("/auth/refresh", post(handlers::auth::refresh_post))
        // CORS wraps the gate so preflights are answered before the secret is checked
        .layer(middleware::from_fn_with_state(state.clone(), admin_gate_middleware))
        .layer(cors_layer(&state.config.security));

    Router::new()
        .merge(health_routes)
        .merge(app_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let mut allowed_headers = vec![header::CONTENT_TYPE];
    if let Ok(name) = HeaderName::from_bytes(security.admin_header.as_bytes()) {
        allowed_headers.push(name);
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::list(allowed_headers))
        .allow_credentials(true)
}
