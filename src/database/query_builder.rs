use crate::database::manager::DatabaseError;
use crate::database::models::{DecisionFilter, Pagination};

/// SQL text plus the positional parameters it expects, in order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
}

/// Builds the listing and count statements over the latest-decision view
pub struct QueryBuilder {
    view: String,
    filter: DecisionFilter,
}

impl QueryBuilder {
    pub fn new(view: &str, filter: DecisionFilter) -> Result<Self, DatabaseError> {
        Ok(Self {
            view: quote_view_name(view)?,
            filter,
        })
    }

    /// Page of rows, newest decision first. `id` breaks ties so pages are stable.
    pub fn to_sql(&self, pagination: &Pagination) -> SqlResult {
        let (where_sql, mut params) = self.where_clause();
        let limit_idx = params.len() + 1;
        let offset_idx = params.len() + 2;
        params.push(SqlParam::Int(pagination.limit()));
        params.push(SqlParam::Int(pagination.offset()));

        SqlResult {
            query: format!(
                "SELECT id, name, artist, decision, decided_at FROM {} {} ORDER BY decided_at DESC, id ASC LIMIT ${} OFFSET ${}",
                self.view, where_sql, limit_idx, offset_idx
            ),
            params,
        }
    }

    /// Count of every matching row, ignoring pagination
    pub fn to_count_sql(&self) -> SqlResult {
        let (where_sql, params) = self.where_clause();
        SqlResult {
            query: format!("SELECT COUNT(*) AS count FROM {} {}", self.view, where_sql),
            params,
        }
    }

    fn where_clause(&self) -> (String, Vec<SqlParam>) {
        let mut params = vec![SqlParam::Text(self.filter.decision.as_str().to_string())];
        let mut sql = "WHERE decision = $1".to_string();

        if let Some(search) = &self.filter.search {
            params.push(SqlParam::Text(format!("%{}%", escape_like(search))));
            sql.push_str(" AND (name ILIKE $2 ESCAPE '\\' OR artist ILIKE $2 ESCAPE '\\')");
        }

        (sql, params)
    }
}

/// Escape LIKE metacharacters so user text matches literally
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Accepts `view` or `schema.view` made of lowercase letters, digits and underscores.
pub fn quote_view_name(name: &str) -> Result<String, DatabaseError> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        return Err(DatabaseError::InvalidViewName(name.to_string()));
    }

    let valid = parts.iter().all(|part| {
        let mut chars = part.chars();
        match chars.next() {
            Some(first) if first.is_ascii_lowercase() || first == '_' => {
                chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            }
            _ => false,
        }
    });
    if !valid {
        return Err(DatabaseError::InvalidViewName(name.to_string()));
    }

    Ok(parts
        .iter()
        .map(|p| format!("\"{}\"", p))
        .collect::<Vec<_>>()
        .join("."))
}
