//! Fact insertion and invalidation (spec.md §4.H). `TemporalStore` is
//! pure persistence; this module owns the overlap-invalidation rule that
//! keeps at most one open fact per `(user_id, subject, predicate)` and
//! guarantees disjoint `[valid_from, valid_to)` intervals.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use openmemory_core::errors::{OpenMemoryError, OpenMemoryResult};
use openmemory_core::models::TemporalFact;
use openmemory_core::tenant::TenantId;
use openmemory_core::traits::TemporalStore;

/// Insert a new fact, applying spec.md §4.H's overlap-invalidation rule
/// against any existing open fact for the same `(user_id, subject,
/// predicate)`, and return the new fact's id.
#[allow(clippy::too_many_arguments)]
pub fn insert_fact(
    store: &dyn TemporalStore,
    subject: &str,
    predicate: &str,
    object: &str,
    valid_from: Option<DateTime<Utc>>,
    valid_to: Option<DateTime<Utc>>,
    confidence: f64,
    metadata: serde_json::Value,
    user_id: &TenantId,
) -> OpenMemoryResult<String> {
    if !(0.0..=1.0).contains(&confidence) {
        return Err(OpenMemoryError::invalid_input(format!(
            "temporal fact confidence must be in [0,1], got {confidence}"
        )));
    }

    let now = Utc::now();
    let mut new_valid_from = valid_from.unwrap_or(now);

    if let Some(to) = valid_to {
        if to < new_valid_from {
            return Err(OpenMemoryError::invalid_input(
                "temporal fact interval invalid: valid_to precedes valid_from",
            ));
        }
    }

    if let Some(mut existing) = store.get_open_fact(user_id, subject, predicate)? {
        if existing.valid_from == new_valid_from {
            // Identical valid_from: bump the new fact forward and close
            // the older one a millisecond before the original timestamp,
            // guaranteeing disjoint intervals (spec.md §4.H).
            existing.valid_to = Some(new_valid_from - Duration::milliseconds(1));
            existing.last_updated = now;
            store.update_fact(&existing)?;
            new_valid_from += Duration::milliseconds(1);
        } else if existing.valid_from < new_valid_from {
            existing.valid_to = Some(new_valid_from - Duration::milliseconds(1));
            existing.last_updated = now;
            store.update_fact(&existing)?;
        }
        // If the existing open fact starts later than the new one, leave
        // it untouched — it isn't this insert's job to reorder history.
    }

    let fact = TemporalFact {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.clone(),
        subject: subject.to_string(),
        predicate: predicate.to_string(),
        object: object.to_string(),
        valid_from: new_valid_from,
        valid_to,
        confidence,
        metadata,
        last_updated: now,
    };
    store.insert_fact(&fact)?;
    Ok(fact.id)
}

/// Close an open fact at `valid_to` (spec.md §4.H `invalidate_fact`).
pub fn invalidate_fact(
    store: &dyn TemporalStore,
    id: &str,
    valid_to: DateTime<Utc>,
    user_id: &TenantId,
) -> OpenMemoryResult<()> {
    let mut fact = store
        .get_fact(id, user_id)?
        .ok_or_else(|| OpenMemoryError::not_found("temporal_fact", id))?;
    if valid_to < fact.valid_from {
        return Err(OpenMemoryError::invalid_input(
            "invalidate_fact: valid_to precedes valid_from",
        ));
    }
    fact.valid_to = Some(valid_to);
    fact.last_updated = Utc::now();
    store.update_fact(&fact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use openmemory_core::config::StorageConfig;
    use openmemory_core::models::FactQuery;
    use openmemory_storage::engine::SqliteStore;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory(&StorageConfig::default()).unwrap()
    }

    #[test]
    fn superseding_fact_closes_the_older_open_one() {
        let s = store();
        let user = TenantId::user("u1");
        let t0 = Utc::now();
        insert_fact(
            &s,
            "OpenAI",
            "has_CEO",
            "Sam Altman",
            Some(t0),
            None,
            1.0,
            serde_json::Value::Null,
            &user,
        )
        .unwrap();

        let t1 = t0 + Duration::days(30);
        insert_fact(
            &s,
            "OpenAI",
            "has_CEO",
            "Someone Else",
            Some(t1),
            None,
            1.0,
            serde_json::Value::Null,
            &user,
        )
        .unwrap();

        let old = s.get_open_fact(&user, "OpenAI", "has_CEO");
        // The old fact is no longer open; only the new one is.
        let open = old.unwrap();
        assert!(open.is_some());
        assert_eq!(open.unwrap().object, "Someone Else");

        let facts = s
            .query_facts(&user, &FactQuery { subject: Some("OpenAI".into()), ..Default::default() })
            .unwrap();
        let closed = facts.iter().find(|f| f.object == "Sam Altman").unwrap();
        assert_eq!(closed.valid_to, Some(t1 - Duration::milliseconds(1)));
    }

    #[test]
    fn identical_valid_from_bumps_new_fact_and_closes_old_one_earlier() {
        let s = store();
        let user = TenantId::user("u1");
        let t0 = Utc::now();
        insert_fact(
            &s, "A", "p", "v1", Some(t0), None, 1.0, serde_json::Value::Null, &user,
        )
        .unwrap();
        insert_fact(
            &s, "A", "p", "v2", Some(t0), None, 1.0, serde_json::Value::Null, &user,
        )
        .unwrap();

        let facts = s
            .query_facts(&user, &FactQuery { subject: Some("A".into()), ..Default::default() })
            .unwrap();
        let old = facts.iter().find(|f| f.object == "v1").unwrap();
        let new = facts.iter().find(|f| f.object == "v2").unwrap();
        assert_eq!(old.valid_to, Some(t0 - Duration::milliseconds(1)));
        assert_eq!(new.valid_from, t0 + Duration::milliseconds(1));
        assert!(old.valid_to.unwrap() < new.valid_from);
    }

    #[test]
    fn confidence_out_of_range_is_rejected() {
        let s = store();
        let user = TenantId::user("u1");
        let err = insert_fact(&s, "A", "p", "v", None, None, 1.5, serde_json::Value::Null, &user).unwrap_err();
        assert!(matches!(err, OpenMemoryError::InvalidInput { .. }));

        let err = insert_fact(&s, "A", "p", "v", None, None, -0.2, serde_json::Value::Null, &user).unwrap_err();
        assert!(matches!(err, OpenMemoryError::InvalidInput { .. }));
    }

    #[test]
    fn valid_to_before_valid_from_is_rejected() {
        let s = store();
        let user = TenantId::user("u1");
        let t0 = Utc::now();
        let err = insert_fact(
            &s,
            "A",
            "p",
            "v",
            Some(t0),
            Some(t0 - Duration::days(1)),
            1.0,
            serde_json::Value::Null,
            &user,
        )
        .unwrap_err();
        assert!(matches!(err, OpenMemoryError::InvalidInput { .. }));
    }

    #[test]
    fn invalidate_fact_sets_closing_time() {
        let s = store();
        let user = TenantId::user("u1");
        let t0 = Utc::now();
        let id = insert_fact(
            &s, "A", "p", "v", Some(t0), None, 1.0, serde_json::Value::Null, &user,
        )
        .unwrap();
        let t1 = t0 + Duration::days(1);
        invalidate_fact(&s, &id, t1, &user).unwrap();
        let fact = s.get_fact(&id, &user).unwrap().unwrap();
        assert_eq!(fact.valid_to, Some(t1));
    }
}
