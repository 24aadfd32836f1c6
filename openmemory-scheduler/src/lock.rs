//! Per-tenant, per-job advisory locks (spec.md §4.I: "each guarded by a
//! single-runner lock per tenant"; spec.md §5: "the maintenance scheduler
//! holds a per-tenant, per-job advisory lock to prevent overlap"). A
//! `DashMap`-backed registry, the same concurrent-map idiom the sibling
//! system's session manager uses for its own per-key state.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// One of the five periodic jobs (spec.md §4.I).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Decay,
    Consolidate,
    UserSummary,
    ClassifierRetrain,
    TemporalDecay,
}

/// Registry of currently-running `(tenant, job)` pairs. `try_acquire`
/// returns `None` if the pair is already locked; otherwise a guard that
/// releases the lock on drop, so a panicking or early-returning job body
/// never leaves a stale lock behind.
#[derive(Default)]
pub struct JobLocks {
    held: DashMap<(String, JobKind), ()>,
}

impl JobLocks {
    pub fn new() -> Self {
        Self { held: DashMap::new() }
    }

    pub fn try_acquire(&self, tenant: &str, job: JobKind) -> Option<JobLockGuard<'_>> {
        let key = (tenant.to_string(), job);
        match self.held.entry(key.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(v) => {
                v.insert(());
                Some(JobLockGuard { locks: self, key })
            }
        }
    }

    pub fn is_locked(&self, tenant: &str, job: JobKind) -> bool {
        self.held.contains_key(&(tenant.to_string(), job))
    }
}

pub struct JobLockGuard<'a> {
    locks: &'a JobLocks,
    key: (String, JobKind),
}

impl Drop for JobLockGuard<'_> {
    fn drop(&mut self) {
        self.locks.held.remove(&self.key);
    }
}
