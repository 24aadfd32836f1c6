use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-tenant summary record (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub summary: Option<String>,
    pub reflection_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            summary: None,
            reflection_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
