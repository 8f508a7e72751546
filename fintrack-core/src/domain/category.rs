//! Category domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-defined label for grouping transactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// CSS-style color, e.g. "#22c55e"
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Case-insensitive substring match on the name
    pub fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.trim().to_lowercase())
    }
}
