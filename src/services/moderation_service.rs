use std::sync::Arc;

use serde::Deserialize;

use crate::config::ModerationConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::{Decision, DecisionFilter, PageResult, Pagination};
use crate::database::repository::DecisionStore;

/// Raw admin listing parameters as they arrive in the query string.
///
/// Everything is optional text so that a malformed `page=abc` falls back to a
/// default instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub q: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

impl ListParams {
    /// Turn raw parameters into a filter and a bounded page window.
    ///
    /// - unknown or missing `status` lists allowed tracks
    /// - `page` below 1 or unparseable becomes 1
    /// - `pageSize` below 1 or unparseable becomes the configured default, and is
    ///   clamped to the configured maximum
    pub fn normalize(&self, config: &ModerationConfig) -> (DecisionFilter, Pagination) {
        let decision = match self.status.as_deref().map(str::trim) {
            None | Some("") => Decision::Allowed,
            Some(raw) => raw.parse::<Decision>().unwrap_or_else(|_| {
                tracing::debug!("Unrecognized status '{}', listing allowed tracks", raw);
                Decision::Allowed
            }),
        };

        let page = parse_positive(self.page.as_deref()).unwrap_or(1);
        let page_size = parse_positive(self.page_size.as_deref())
            .unwrap_or(config.default_page_size)
            .min(config.max_page_size.max(1));

        (
            DecisionFilter::new(decision, self.q.as_deref()),
            Pagination { page, page_size },
        )
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n >= 1)
        .map(|n| n.min(u32::MAX as i64) as u32)
}

/// Lists moderation decisions for the admin panel
#[derive(Clone)]
pub struct ModerationService {
    store: Arc<dyn DecisionStore>,
    config: ModerationConfig,
    retry_transient: bool,
}

impl ModerationService {
    pub fn new(store: Arc<dyn DecisionStore>, config: ModerationConfig, retry_transient: bool) -> Self {
        Self {
            store,
            config,
            retry_transient,
        }
    }

    pub async fn list(&self, params: &ListParams) -> Result<PageResult, DatabaseError> {
        let (filter, pagination) = params.normalize(&self.config);

        let result = match self.store.query_latest_decisions(&filter, &pagination).await {
            Err(e) if self.retry_transient && e.is_transient() => {
                tracing::warn!("Transient decision store error, retrying once: {}", e);
                self.store.query_latest_decisions(&filter, &pagination).await
            }
            other => other,
        };
        let (items, total) = result?;

        Ok(PageResult {
            items,
            total,
            page: pagination.page,
            page_size: pagination.page_size,
        })
    }

    pub fn store(&self) -> &Arc<dyn DecisionStore> {
        &self.store
    }
}
