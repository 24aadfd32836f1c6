//! Subject timelines and point-in-time comparisons (spec.md §4.H
//! `get_subject_timeline`, `compare`).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use openmemory_core::errors::OpenMemoryResult;
use openmemory_core::models::{FactQuery, TimelineEvent, TimelineEventKind};
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::TemporalStore;

/// Merged `created`/`invalidated` event stream for a subject, sorted
/// ascending by time (spec.md §4.H).
pub fn get_subject_timeline(
    store: &dyn TemporalStore,
    user_id: &TenantId,
    subject: &str,
    predicate: Option<&str>,
) -> OpenMemoryResult<Vec<TimelineEvent>> {
    let facts = store.list_facts_for_subject(user_id, subject, predicate)?;
    let mut events = Vec::with_capacity(facts.len() * 2);
    for fact in &facts {
        events.push(TimelineEvent {
            fact_id: fact.id.clone(),
            predicate: fact.predicate.clone(),
            object: fact.object.clone(),
            kind: TimelineEventKind::Created,
            at: fact.valid_from,
        });
        if let Some(to) = fact.valid_to {
            events.push(TimelineEvent {
                fact_id: fact.id.clone(),
                predicate: fact.predicate.clone(),
                object: fact.object.clone(),
                kind: TimelineEventKind::Invalidated,
                at: to,
            });
        }
    }
    events.sort_by(|a, b| a.at.cmp(&b.at).then_with(|| a.fact_id.cmp(&b.fact_id)));
    Ok(events)
}

/// Per-predicate delta between the state of `subject` at two points in
/// time (spec.md §4.H `compare`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompareResult {
    /// Predicates present at `t2` but not `t1`, with their `t2` object.
    pub added: BTreeMap<String, String>,
    /// Predicates present at `t1` but not `t2`, with their `t1` object.
    pub removed: BTreeMap<String, String>,
    /// Predicates present at both with a different object: `(t1, t2)`.
    pub changed: BTreeMap<String, (String, String)>,
    /// Predicates present at both with the same object.
    pub unchanged: BTreeMap<String, String>,
}

fn state_at(
    store: &dyn TemporalStore,
    user_id: &TenantId,
    subject: &str,
    at: DateTime<Utc>,
) -> OpenMemoryResult<BTreeMap<String, String>> {
    let facts = store.query_facts(
        user_id,
        &FactQuery {
            subject: Some(subject.to_string()),
            valid_at: Some(at),
            ..Default::default()
        },
    )?;
    Ok(facts.into_iter().map(|f| (f.predicate, f.object)).collect())
}

pub fn compare(
    store: &dyn TemporalStore,
    user_id: &TenantId,
    subject: &str,
    t1: DateTime<Utc>,
    t2: DateTime<Utc>,
) -> OpenMemoryResult<CompareResult> {
    let state1 = state_at(store, user_id, subject, t1)?;
    let state2 = state_at(store, user_id, subject, t2)?;

    let mut result = CompareResult::default();
    for (predicate, object1) in &state1 {
        match state2.get(predicate) {
            Some(object2) if object2 == object1 => {
                result.unchanged.insert(predicate.clone(), object1.clone());
            }
            Some(object2) => {
                result
                    .changed
                    .insert(predicate.clone(), (object1.clone(), object2.clone()));
            }
            None => {
                result.removed.insert(predicate.clone(), object1.clone());
            }
        }
    }
    for (predicate, object2) in &state2 {
        if !state1.contains_key(predicate) {
            result.added.insert(predicate.clone(), object2.clone());
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::insert_fact;
    use chrono::Duration;
    use openmemory_core::config::StorageConfig;
    use openmemory_storage::engine::SqliteStore;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory(&StorageConfig::default()).unwrap()
    }

    #[test]
    fn timeline_merges_created_and_invalidated_events_ascending() {
        let s = store();
        let user = TenantId::user("u1");
        let t0 = Utc::now();
        insert_fact(&s, "A", "p", "v1", Some(t0), None, 1.0, serde_json::Value::Null, &user).unwrap();
        insert_fact(
            &s,
            "A",
            "p",
            "v2",
            Some(t0 + Duration::days(10)),
            None,
            1.0,
            serde_json::Value::Null,
            &user,
        )
        .unwrap();

        let timeline = get_subject_timeline(&s, &user, "A", None).unwrap();
        assert_eq!(timeline.len(), 3);
        for w in timeline.windows(2) {
            assert!(w[0].at <= w[1].at);
        }
        assert_eq!(timeline[0].kind, TimelineEventKind::Created);
    }

    #[test]
    fn compare_classifies_added_removed_changed_unchanged() {
        let s = store();
        let user = TenantId::user("u1");
        let t0 = Utc::now();
        insert_fact(&s, "A", "stable", "x", Some(t0), None, 1.0, serde_json::Value::Null, &user).unwrap();
        insert_fact(&s, "A", "mutable", "v1", Some(t0), None, 1.0, serde_json::Value::Null, &user).unwrap();

        let t1 = t0 + Duration::days(1);
        insert_fact(
            &s,
            "A",
            "mutable",
            "v2",
            Some(t0 + Duration::days(5)),
            None,
            1.0,
            serde_json::Value::Null,
            &user,
        )
        .unwrap();
        insert_fact(
            &s,
            "A",
            "new_pred",
            "y",
            Some(t0 + Duration::days(5)),
            None,
            1.0,
            serde_json::Value::Null,
            &user,
        )
        .unwrap();
        let t2 = t0 + Duration::days(10);

        let result = compare(&s, &user, "A", t1, t2).unwrap();
        assert_eq!(result.unchanged.get("stable"), Some(&"x".to_string()));
        assert_eq!(result.changed.get("mutable"), Some(&("v1".to_string(), "v2".to_string())));
        assert_eq!(result.added.get("new_pred"), Some(&"y".to_string()));
        assert!(result.removed.is_empty());
    }
}
