//! Tenant Guard (spec.md §4.J): the cross-cutting policy that every
//! user-owned read/write path enforces before it reaches a subsystem
//! trait. `None` is system scope and only legal from maintenance/admin
//! paths, never from a request carrying a bare missing `user_id` under
//! strict mode.

use openmemory_core::errors::{OpenMemoryError, OpenMemoryResult};
use openmemory_core::tenant::TenantId;

/// Resolve a request-supplied `user_id` into a `TenantId`, rejecting a
/// missing id under strict mode (spec.md §4.J: "strict mode ... rejects
/// calls that omit the explicit `user_id` argument for tenant-scoped
/// ops. Violations fail with `TenantScopeMissing`").
pub fn resolve_request_tenant(
    user_id: Option<&str>,
    strict: bool,
    operation: &str,
) -> OpenMemoryResult<TenantId> {
    match user_id {
        Some(id) if !id.is_empty() => Ok(TenantId::user(id)),
        _ if strict => Err(OpenMemoryError::tenant_scope_missing(operation)),
        _ => Ok(TenantId::SYSTEM),
    }
}

/// System-scope resolution for maintenance/admin paths, bypassing the
/// strict-mode check entirely — the only callers permitted a `None`
/// `user_id` regardless of `strict_tenant` (spec.md §4.J).
pub fn system_scope() -> TenantId {
    TenantId::SYSTEM
}

/// Verify that a resource actually owned by `owner` is being accessed
/// under `requested`'s scope. Storage queries already filter by
/// `user_id` so a straight `get` naturally yields `NotFound` on
/// cross-tenant access (spec.md §8 S5); this check exists for paths that
/// load a resource by some other key first (e.g. a waypoint target
/// resolved from a different tenant's edge table) and must not leak its
/// existence across tenants.
pub fn check_owner(owner: &TenantId, requested: &TenantId) -> OpenMemoryResult<()> {
    if owner == requested {
        Ok(())
    } else {
        Err(OpenMemoryError::Forbidden {
            requested: requested.to_string(),
            owner: owner.to_string(),
        })
    }
}
