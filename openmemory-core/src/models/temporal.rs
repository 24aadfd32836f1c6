use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tenant::TenantId;

/// A time-bound `(subject, predicate, object)` triple (spec.md §3, §4.H).
///
/// The interval is half-open `[valid_from, valid_to)` when `valid_to` is
/// present; `valid_to = None` means the fact is currently open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalFact {
    pub id: String,
    pub user_id: TenantId,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub valid_from: DateTime<Utc>,
    pub valid_to: Option<DateTime<Utc>>,
    /// Confidence in [0,1].
    pub confidence: f64,
    pub metadata: serde_json::Value,
    pub last_updated: DateTime<Utc>,
}

impl TemporalFact {
    pub fn is_open(&self) -> bool {
        self.valid_to.is_none()
    }

    /// Whether this fact's interval contains `at` (half-open `[from, to)`).
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        if at < self.valid_from {
            return false;
        }
        match self.valid_to {
            Some(to) => at < to,
            None => true,
        }
    }
}

/// A directed edge between two temporal facts (spec.md §3, §4.H).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalEdge {
    pub id: String,
    pub user_id: TenantId,
    pub source_fact_id: String,
    pub target_fact_id: String,
    pub relation: String,
    pub weight: f64,
    pub valid_from: DateTime<Utc>,
    pub valid_to: Option<DateTime<Utc>>,
}

impl TemporalEdge {
    pub fn is_open(&self) -> bool {
        self.valid_to.is_none()
    }
}

/// Query parameters for `get_facts` (spec.md §4.H).
#[derive(Debug, Clone, Default)]
pub struct FactQuery {
    pub subject: Option<String>,
    pub predicate: Option<String>,
    pub object: Option<String>,
    pub valid_at: Option<DateTime<Utc>>,
}

/// One entry in `get_subject_timeline`'s merged event stream (spec.md §4.H).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub fact_id: String,
    pub predicate: String,
    pub object: String,
    pub kind: TimelineEventKind,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventKind {
    Created,
    Invalidated,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn fact(from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> TemporalFact {
        TemporalFact {
            id: "f1".into(),
            user_id: TenantId::user("u1"),
            subject: "OpenAI".into(),
            predicate: "has_CEO".into(),
            object: "Sam Altman".into(),
            valid_from: from,
            valid_to: to,
            confidence: 1.0,
            metadata: serde_json::Value::Null,
            last_updated: from,
        }
    }

    #[test]
    fn half_open_interval_excludes_valid_to() {
        let from = Utc::now();
        let to = from + Duration::days(1);
        let f = fact(from, Some(to));
        assert!(f.contains(from));
        assert!(f.contains(to - Duration::milliseconds(1)));
        assert!(!f.contains(to));
    }

    #[test]
    fn open_fact_contains_everything_after_from() {
        let from = Utc::now();
        let f = fact(from, None);
        assert!(f.is_open());
        assert!(f.contains(from + Duration::days(3650)));
        assert!(!f.contains(from - Duration::milliseconds(1)));
    }
}
