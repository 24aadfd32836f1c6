use serde::{Deserialize, Serialize};

/// Tenant guard policy (spec.md §4.J). `strict_tenant` forbids any
/// request from omitting `user_id` outside of system-scope maintenance
/// paths; disabling it is only meant for single-tenant deployments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TenantConfig {
    pub strict_tenant: bool,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            strict_tenant: true,
        }
    }
}
