use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};

/// Latest moderation outcome for a track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    #[default]
    Allowed,
    Blocked,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allowed => "allowed",
            Decision::Blocked => "blocked",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allowed" => Ok(Decision::Allowed),
            "blocked" => Ok(Decision::Blocked),
            other => Err(format!("unknown decision '{}'", other)),
        }
    }
}

/// One row of the `latest_track_decisions` view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDecision {
    /// Spotify track id
    pub id: String,
    pub name: String,
    pub artist: String,
    pub decision: Decision,
    pub decided_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for TrackDecision {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let raw: String = row.try_get("decision")?;
        let decision = raw.parse::<Decision>().map_err(|e| sqlx::Error::ColumnDecode {
            index: "decision".to_string(),
            source: e.into(),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            artist: row.try_get("artist")?,
            decision,
            decided_at: row.try_get("decided_at")?,
        })
    }
}

/// Which decisions to return
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionFilter {
    pub decision: Decision,
    /// Trimmed, non-empty search text. Matched case-insensitively as a substring
    /// of the track name or the artist.
    pub search: Option<String>,
}

impl DecisionFilter {
    pub fn new(decision: Decision, search: Option<&str>) -> Self {
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self { decision, search }
    }

    pub fn matches(&self, track: &TrackDecision) -> bool {
        if track.decision != self.decision {
            return false;
        }
        match &self.search {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                track.name.to_lowercase().contains(&needle) || track.artist.to_lowercase().contains(&needle)
            }
        }
    }
}

/// Offset-based page window. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        (self.page.max(1) as i64 - 1) * self.page_size as i64
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

/// One page of decisions plus the unpaginated match count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub items: Vec<TrackDecision>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}
