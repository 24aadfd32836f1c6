use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical owner of a subset of rows. `None` (serialized as the JSON `null`
/// sentinel) is "system" scope — legal only from the maintenance scheduler
/// or explicit admin paths, per spec.md §4.J.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub Option<String>);

impl TenantId {
    /// The system tenant — `None`.
    pub const SYSTEM: TenantId = TenantId(None);

    pub fn user(id: impl Into<String>) -> Self {
        Self(Some(id.into()))
    }

    pub fn is_system(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(id) => write!(f, "{id}"),
            None => write!(f, "<system>"),
        }
    }
}

impl From<Option<String>> for TenantId {
    fn from(value: Option<String>) -> Self {
        Self(value)
    }
}

impl From<&str> for TenantId {
    fn from(value: &str) -> Self {
        Self(Some(value.to_string()))
    }
}
