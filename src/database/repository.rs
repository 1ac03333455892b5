use async_trait::async_trait;
use sqlx::{
    self,
    postgres::{PgArguments, PgRow},
    FromRow, PgPool, Postgres, Row,
};

use crate::database::manager::DatabaseError;
use crate::database::models::{DecisionFilter, Pagination, TrackDecision};
use crate::database::query_builder::{quote_view_name, QueryBuilder, SqlParam};

/// Read-only access to the "latest decision per track" view.
///
/// Implementations return one page of matching rows, ordered by `decided_at`
/// descending then `id` ascending, together with the total number of matching
/// rows ignoring pagination.
#[async_trait]
pub trait DecisionStore: Send + Sync {
    async fn query_latest_decisions(
        &self,
        filter: &DecisionFilter,
        pagination: &Pagination,
    ) -> Result<(Vec<TrackDecision>, i64), DatabaseError>;

    /// Cheap connectivity probe used by `/health`
    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// `DecisionStore` over a Postgres view with the columns
/// `id, name, artist, decision, decided_at`.
pub struct PgDecisionStore {
    pool: PgPool,
    view: String,
}

impl PgDecisionStore {
    /// Fails when `view` is not a plain (optionally schema-qualified) identifier
    pub fn new(pool: PgPool, view: impl Into<String>) -> Result<Self, DatabaseError> {
        let view = view.into();
        quote_view_name(&view)?;
        Ok(Self { pool, view })
    }
}

#[async_trait]
impl DecisionStore for PgDecisionStore {
    async fn query_latest_decisions(
        &self,
        filter: &DecisionFilter,
        pagination: &Pagination,
    ) -> Result<(Vec<TrackDecision>, i64), DatabaseError> {
        let builder = QueryBuilder::new(&self.view, filter.clone())?;
        let page_sql = builder.to_sql(pagination);
        let count_sql = builder.to_count_sql();

        let mut page_query = sqlx::query_as::<_, TrackDecision>(&page_sql.query);
        for p in page_sql.params.iter() {
            page_query = bind_param_query_as(page_query, p);
        }

        let mut count_query = sqlx::query(&count_sql.query);
        for p in count_sql.params.iter() {
            count_query = bind_param_query(count_query, p);
        }

        let (items, count_row) = tokio::try_join!(
            page_query.fetch_all(&self.pool),
            count_query.fetch_one(&self.pool),
        )?;
        let total: i64 = count_row.try_get("count")?;

        tracing::debug!(
            "Listed {} of {} {} decisions (page {}, size {})",
            items.len(),
            total,
            filter.decision,
            pagination.page,
            pagination.page_size
        );
        Ok((items, total))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Stands in when the database is not configured. Every call fails with a
/// configuration error, so the process still serves `/ping` and `/auth/*`.
pub struct UnconfiguredStore {
    setting: &'static str,
}

impl UnconfiguredStore {
    pub fn new(setting: &'static str) -> Self {
        Self { setting }
    }
}

#[async_trait]
impl DecisionStore for UnconfiguredStore {
    async fn query_latest_decisions(
        &self,
        _filter: &DecisionFilter,
        _pagination: &Pagination,
    ) -> Result<(Vec<TrackDecision>, i64), DatabaseError> {
        Err(DatabaseError::ConfigMissing(self.setting))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Err(DatabaseError::ConfigMissing(self.setting))
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match v {
        SqlParam::Text(s) => q.bind(s),
        SqlParam::Int(i) => q.bind(*i),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        SqlParam::Text(s) => q.bind(s),
        SqlParam::Int(i) => q.bind(*i),
    }
}
