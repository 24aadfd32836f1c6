//! Error taxonomy (spec.md §7), aggregated from every subsystem crate into
//! one `OpenMemoryError` so callers match on a single enum regardless of
//! which layer produced the failure.

mod http_status;

pub use http_status::HttpStatus;

/// Top-level result alias used across the workspace.
pub type OpenMemoryResult<T> = Result<T, OpenMemoryError>;

/// The full error taxonomy from spec.md §7, by kind rather than by
/// originating subsystem.
#[derive(Debug, thiserror::Error)]
pub enum OpenMemoryError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("not found: {kind} {id}")]
    NotFound { kind: String, id: String },

    #[error("tenant scope missing for operation {operation}")]
    TenantScopeMissing { operation: String },

    #[error("forbidden: tenant {requested} may not access resource owned by {owner}")]
    Forbidden { requested: String, owner: String },

    #[error("conflict: {reason}")]
    Conflict { reason: String },

    #[error("embedder unavailable: {reason} (fallback used: {fallback_used})")]
    EmbedderUnavailable { reason: String, fallback_used: bool },

    #[error("store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    #[error("timeout after {deadline_ms}ms during {operation}")]
    Timeout { operation: String, deadline_ms: u64 },

    #[error("busy: {queue} queue saturated, retry with jitter")]
    Busy { queue: String },

    #[error("integrity error: {details}")]
    IntegrityError { details: String },
}

impl OpenMemoryError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    pub fn tenant_scope_missing(operation: impl Into<String>) -> Self {
        Self::TenantScopeMissing {
            operation: operation.into(),
        }
    }

    /// Stable error code surfaced in `{error: code, message, details?}`
    /// response bodies per spec.md §7.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::NotFound { .. } => "not_found",
            Self::TenantScopeMissing { .. } => "tenant_scope_missing",
            Self::Forbidden { .. } => "forbidden",
            Self::Conflict { .. } => "conflict",
            Self::EmbedderUnavailable { .. } => "embedder_unavailable",
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::Timeout { .. } => "timeout",
            Self::Busy { .. } => "busy",
            Self::IntegrityError { .. } => "integrity_error",
        }
    }

    /// HTTP status the (out-of-scope) server surface should map this to.
    pub fn http_status(&self) -> HttpStatus {
        match self {
            Self::InvalidInput { .. } => HttpStatus::BadRequest,
            Self::NotFound { .. } => HttpStatus::NotFound,
            Self::TenantScopeMissing { .. } | Self::Forbidden { .. } => HttpStatus::Forbidden,
            Self::Conflict { .. } => HttpStatus::Conflict,
            Self::EmbedderUnavailable { .. } => HttpStatus::InternalServerError,
            Self::StoreUnavailable { .. } => HttpStatus::ServiceUnavailable,
            Self::Timeout { .. } => HttpStatus::GatewayTimeout,
            Self::Busy { .. } => HttpStatus::TooManyRequests,
            Self::IntegrityError { .. } => HttpStatus::InternalServerError,
        }
    }

    /// Whether internal retry-with-backoff (spec.md §7) applies to this error.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Busy { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable_strings() {
        assert_eq!(OpenMemoryError::invalid_input("x").code(), "invalid_input");
        assert_eq!(
            OpenMemoryError::not_found("memory", "abc").code(),
            "not_found"
        );
    }

    #[test]
    fn status_mapping_matches_spec() {
        assert_eq!(
            OpenMemoryError::invalid_input("x").http_status(),
            HttpStatus::BadRequest
        );
        assert_eq!(
            OpenMemoryError::Busy {
                queue: "embedder".into()
            }
            .http_status(),
            HttpStatus::TooManyRequests
        );
        assert_eq!(
            OpenMemoryError::StoreUnavailable {
                reason: "x".into()
            }
            .http_status(),
            HttpStatus::ServiceUnavailable
        );
    }

    #[test]
    fn only_timeout_and_busy_are_retriable() {
        assert!(OpenMemoryError::Busy {
            queue: "x".into()
        }
        .is_retriable());
        assert!(OpenMemoryError::Timeout {
            operation: "x".into(),
            deadline_ms: 10
        }
        .is_retriable());
        assert!(!OpenMemoryError::invalid_input("x").is_retriable());
    }
}
