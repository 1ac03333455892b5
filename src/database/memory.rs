use std::path::Path;

use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{DecisionFilter, Pagination, TrackDecision};
use crate::database::repository::DecisionStore;

/// Fixed set of decisions held in memory. Used for local development without a
/// database (`patou-api --fixtures decisions.json`) and as a test fixture.
#[derive(Debug, Clone, Default)]
pub struct MemoryDecisionStore {
    records: Vec<TrackDecision>,
}

impl MemoryDecisionStore {
    pub fn new(records: Vec<TrackDecision>) -> Self {
        Self { records }
    }

    /// Load a JSON array of decision records
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DatabaseError::QueryError(format!("reading {}: {}", path.display(), e)))?;
        let records: Vec<TrackDecision> = serde_json::from_str(&raw)
            .map_err(|e| DatabaseError::QueryError(format!("parsing {}: {}", path.display(), e)))?;
        tracing::info!("Loaded {} fixture decisions from {}", records.len(), path.display());
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl DecisionStore for MemoryDecisionStore {
    async fn query_latest_decisions(
        &self,
        filter: &DecisionFilter,
        pagination: &Pagination,
    ) -> Result<(Vec<TrackDecision>, i64), DatabaseError> {
        let mut matching: Vec<&TrackDecision> = self.records.iter().filter(|t| filter.matches(t)).collect();
        matching.sort_by(|a, b| b.decided_at.cmp(&a.decided_at).then_with(|| a.id.cmp(&b.id)));

        let total = matching.len() as i64;
        let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(pagination.page_size as usize)
            .cloned()
            .collect();

        Ok((items, total))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
