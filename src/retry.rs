//! Polling until a condition holds, with a deadline.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

pub const FIVE_SECOND_INTERVAL: Duration = Duration::from_secs(5);
pub const TEN_SECOND_INTERVAL: Duration = Duration::from_secs(10);
pub const FIVE_MINUTE_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const THIRTY_MINUTE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Error)]
#[error("timed out after {timeout:?} waiting for {operation}")]
pub struct PollTimeout {
    pub operation: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: TEN_SECOND_INTERVAL,
            timeout: THIRTY_MINUTE_TIMEOUT,
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

/// Calls `check` every `interval` until it yields `Some`, returns an error,
/// or `timeout` elapses. The first check runs immediately.
pub async fn poll_until<F, Fut, T, E>(
    config: &PollConfig,
    operation: &str,
    mut check: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
    E: From<PollTimeout>,
{
    let deadline = Instant::now() + config.timeout;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        if let Some(value) = check().await? {
            tracing::debug!(operation, attempt, "condition met");
            return Ok(value);
        }

        if Instant::now() + config.interval > deadline {
            tracing::error!(operation, attempt, timeout = ?config.timeout, "gave up waiting");
            return Err(PollTimeout {
                operation: operation.to_string(),
                timeout: config.timeout,
            }
            .into());
        }

        tracing::debug!(operation, attempt, "condition not met, waiting");
        tokio::time::sleep(config.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, PartialEq)]
    enum TestError {
        Timeout,
        Failed,
    }

    impl From<PollTimeout> for TestError {
        fn from(_: PollTimeout) -> Self {
            TestError::Timeout
        }
    }

    fn fast() -> PollConfig {
        PollConfig::new(Duration::from_millis(1), Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_returns_when_condition_met() {
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();

        let result: Result<u32, TestError> = poll_until(&fast(), "third call", || {
            let c = c.clone();
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst) + 1;
                Ok((n == 3).then_some(n))
            }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_times_out() {
        let result: Result<(), TestError> =
            poll_until(&fast(), "never", || async { Ok(None) }).await;
        assert_eq!(result, Err(TestError::Timeout));
    }

    #[tokio::test]
    async fn test_error_stops_polling() {
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();

        let result: Result<(), TestError> = poll_until(&fast(), "fails", || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Failed)
            }
        })
        .await;

        assert_eq!(result, Err(TestError::Failed));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_timeout_message() {
        let err = PollTimeout {
            operation: "cluster active".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "timed out after 5s waiting for cluster active");
    }
}
