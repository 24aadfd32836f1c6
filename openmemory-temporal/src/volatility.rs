//! `get_volatile` (spec.md §4.H): the `(subject, predicate)` pairs that
//! have changed the most, as a proxy for "this is actively in flux."

use std::collections::BTreeMap;

use openmemory_core::errors::OpenMemoryResult;
use openmemory_core::models::FactQuery;
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::TemporalStore;

/// One `(subject, predicate)` pair and how many fact versions it has
/// accumulated — each superseding `insert_fact` call adds one version, so
/// this count is a direct proxy for "number of times this changed."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolatileEntry {
    pub subject: String,
    pub predicate: String,
    pub change_count: u64,
}

/// Top-`limit` `(subject, predicate)` pairs by change count, optionally
/// restricted to one `subject` (spec.md §4.H `get_volatile`).
pub fn get_volatile(
    store: &dyn TemporalStore,
    user_id: &TenantId,
    subject: Option<&str>,
    limit: usize,
) -> OpenMemoryResult<Vec<VolatileEntry>> {
    let facts = store.query_facts(
        user_id,
        &FactQuery {
            subject: subject.map(str::to_string),
            ..Default::default()
        },
    )?;

    let mut counts: BTreeMap<(String, String), u64> = BTreeMap::new();
    for fact in facts {
        *counts.entry((fact.subject, fact.predicate)).or_insert(0) += 1;
    }

    let mut entries: Vec<VolatileEntry> = counts
        .into_iter()
        .map(|((subject, predicate), change_count)| VolatileEntry {
            subject,
            predicate,
            change_count,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.change_count
            .cmp(&a.change_count)
            .then_with(|| a.subject.cmp(&b.subject))
            .then_with(|| a.predicate.cmp(&b.predicate))
    });
    entries.truncate(limit);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::insert_fact;
    use chrono::{Duration, Utc};
    use openmemory_core::config::StorageConfig;
    use openmemory_storage::engine::SqliteStore;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory(&StorageConfig::default()).unwrap()
    }

    #[test]
    fn most_changed_predicate_ranks_first() {
        let s = store();
        let user = TenantId::user("u1");
        let t0 = Utc::now();
        insert_fact(&s, "A", "stable", "x", Some(t0), None, 1.0, serde_json::Value::Null, &user).unwrap();
        for i in 0..3 {
            insert_fact(
                &s,
                "A",
                "mutable",
                &format!("v{i}"),
                Some(t0 + Duration::days(i as i64)),
                None,
                1.0,
                serde_json::Value::Null,
                &user,
            )
            .unwrap();
        }

        let volatile = get_volatile(&s, &user, None, 1).unwrap();
        assert_eq!(volatile.len(), 1);
        assert_eq!(volatile[0].predicate, "mutable");
        assert_eq!(volatile[0].change_count, 3);
    }

    #[test]
    fn subject_filter_narrows_scope() {
        let s = store();
        let user = TenantId::user("u1");
        let t0 = Utc::now();
        insert_fact(&s, "A", "p", "x", Some(t0), None, 1.0, serde_json::Value::Null, &user).unwrap();
        insert_fact(&s, "B", "p", "y", Some(t0), None, 1.0, serde_json::Value::Null, &user).unwrap();

        let volatile = get_volatile(&s, &user, Some("A"), 10).unwrap();
        assert_eq!(volatile.len(), 1);
        assert_eq!(volatile[0].subject, "A");
    }
}
