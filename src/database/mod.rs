pub mod manager;
pub mod memory;
pub mod models;
pub mod query_builder;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryDecisionStore;
pub use models::{Decision, DecisionFilter, PageResult, Pagination, TrackDecision};
pub use repository::{DecisionStore, PgDecisionStore, UnconfiguredStore};
