//! Per-attempt deadlines
//!
//! Every attempt gets its own deadline. Dropping the timed-out future cancels
//! the in-flight request without touching later attempts.

use nerbixa_core::WebhookError;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::warn;

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

/// Runs `future` under `deadline`, mapping expiry to `TIMEOUT_ERROR`.
pub async fn with_deadline<F, T>(
    operation: &str,
    deadline: Duration,
    started: Instant,
    future: F,
) -> Result<T, WebhookError>
where
    F: Future<Output = Result<T, WebhookError>>,
{
    match tokio::time::timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                operation = %operation,
                timeout_ms = deadline.as_millis() as u64,
                "Operation timed out"
            );
            Err(WebhookError::timeout(
                deadline.as_millis() as u64,
                elapsed_ms(started),
            ))
        }
    }
}

/// Maps a transport failure onto the error-code taxonomy.
pub(crate) fn classify_transport_error(
    error: &reqwest::Error,
    deadline: Duration,
    started: Instant,
) -> WebhookError {
    if error.is_timeout() {
        WebhookError::timeout(deadline.as_millis() as u64, elapsed_ms(started))
    } else if error.is_connect() {
        WebhookError::connection(error)
    } else if error.is_decode() {
        WebhookError::response_format(error)
    } else {
        WebhookError::network(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nerbixa_core::ErrorCode;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result = with_deadline("fast", Duration::from_secs(1), Instant::now(), async {
            Ok::<_, WebhookError>(42)
        })
        .await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_deadline_is_timeout_error() {
        let result = with_deadline("slow", Duration::from_millis(100), Instant::now(), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, WebhookError>(())
        })
        .await;

        let error = result.unwrap_err();
        assert_eq!(error.code, ErrorCode::TimeoutError);
        assert_eq!(error.details.unwrap()["timeoutMs"], 100);
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let result: Result<(), _> =
            with_deadline("failing", Duration::from_secs(1), Instant::now(), async {
                Err(WebhookError::network("reset"))
            })
            .await;

        assert_eq!(result.unwrap_err().code, ErrorCode::NetworkError);
    }
}
