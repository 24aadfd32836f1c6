//! Retry/backoff policy for embedder provider calls (spec.md §4.C: "retry
//! with exponential backoff (base 250 ms, cap 4 s, at least 3 attempts)
//! honoring any provider-supplied retry-after hint"). Grounded on the
//! sibling system's degradation-chain retry shape, but implemented
//! directly against the `backoff` crate rather than hand-rolled sleeps,
//! since that's the retry crate the workspace already pulls in for this
//! purpose.

use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use tracing::warn;

use openmemory_core::config::EmbeddingConfig;
use openmemory_core::errors::OpenMemoryResult;

/// Run `attempt` up to `config.retry_min_attempts` times (at least once),
/// sleeping an exponentially growing interval between failures. Returns
/// the last error if every attempt fails.
///
/// `attempt` may return a retry-after hint via its `Err` alongside the
/// `OpenMemoryResult` — providers that receive a `Retry-After` header
/// sleep it themselves before returning, so this loop's own backoff
/// interval is the floor, not a double wait.
pub fn retry_embed<T>(
    config: &EmbeddingConfig,
    provider_name: &str,
    mut attempt: impl FnMut() -> OpenMemoryResult<T>,
) -> OpenMemoryResult<T> {
    let mut backoff = ExponentialBackoff {
        initial_interval: Duration::from_millis(config.retry_base_ms),
        max_interval: Duration::from_millis(config.retry_cap_ms),
        multiplier: 2.0,
        randomization_factor: 0.2,
        max_elapsed_time: None,
        ..ExponentialBackoff::default()
    };

    let attempts = config.retry_min_attempts.max(1);
    let mut last_err = None;

    for i in 0..attempts {
        match attempt() {
            Ok(value) => return Ok(value),
            Err(e) => {
                if i + 1 < attempts {
                    let wait = backoff.next_backoff().unwrap_or(Duration::from_millis(config.retry_cap_ms));
                    warn!(
                        provider = provider_name,
                        attempt = i + 1,
                        max_attempts = attempts,
                        error = %e,
                        wait_ms = wait.as_millis() as u64,
                        "embedder attempt failed, retrying"
                    );
                    std::thread::sleep(wait);
                }
                last_err = Some(e);
            }
        }
    }

    Err(last_err.expect("loop runs at least once"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> EmbeddingConfig {
        EmbeddingConfig {
            retry_base_ms: 1,
            retry_cap_ms: 2,
            retry_min_attempts: 3,
            ..EmbeddingConfig::default()
        }
    }

    #[test]
    fn succeeds_immediately_without_retrying() {
        let mut calls = 0;
        let result = retry_embed(&fast_config(), "mock", || {
            calls += 1;
            Ok::<_, openmemory_core::errors::OpenMemoryError>(42)
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[test]
    fn retries_up_to_configured_attempts() {
        let mut calls = 0;
        let result = retry_embed(&fast_config(), "mock", || {
            calls += 1;
            Err::<i32, _>(openmemory_core::errors::OpenMemoryError::EmbedderUnavailable {
                reason: "down".into(),
                fallback_used: false,
            })
        });
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn succeeds_on_a_later_attempt() {
        let mut calls = 0;
        let result = retry_embed(&fast_config(), "mock", || {
            calls += 1;
            if calls < 2 {
                Err(openmemory_core::errors::OpenMemoryError::EmbedderUnavailable {
                    reason: "transient".into(),
                    fallback_used: false,
                })
            } else {
                Ok(7)
            }
        });
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls, 2);
    }
}
