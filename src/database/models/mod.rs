pub mod track_decision;

pub use track_decision::{Decision, DecisionFilter, PageResult, Pagination, TrackDecision};
