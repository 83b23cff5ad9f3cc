//! Bounded retry wrapper.
//!
//! Unlike a blocking retry loop, a [`Retrier`] never sleeps: a call made
//! before the retry delay has elapsed returns [`KubeletError::RetryLater`]
//! immediately, so periodic callers can poll it from their own schedule.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::KubeletError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStatus {
    /// No attempt made yet
    Idle,
    /// At least one attempt failed, more are allowed
    Retrying,
    /// The last attempt succeeded
    Succeeded,
    /// The retry budget is exhausted
    PermanentFail,
}

#[derive(Debug)]
struct RetryState {
    status: RetryStatus,
    attempts: u32,
    last_try: Option<Instant>,
    last_error: Option<String>,
}

#[derive(Debug)]
pub struct Retrier {
    name: String,
    retry_count: u32,
    retry_delay: Duration,
    state: Mutex<RetryState>,
}

impl Retrier {
    pub fn new(name: impl Into<String>, retry_count: u32, retry_delay: Duration) -> Self {
        Self {
            name: name.into(),
            retry_count,
            retry_delay,
            state: Mutex::new(RetryState {
                status: RetryStatus::Idle,
                attempts: 0,
                last_try: None,
                last_error: None,
            }),
        }
    }

    pub async fn status(&self) -> RetryStatus {
        self.state.lock().await.status
    }

    /// Failed attempts so far.
    pub async fn attempts(&self) -> u32 {
        self.state.lock().await.attempts
    }

    /// Run `attempt` unless the budget is spent or the delay has not elapsed.
    pub async fn trigger<T, F, Fut>(&self, attempt: F) -> Result<T, KubeletError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, KubeletError>>,
    {
        {
            let state = self.state.lock().await;
            match state.status {
                RetryStatus::PermanentFail => {
                    return Err(KubeletError::PermanentFail {
                        name: self.name.clone(),
                        attempts: state.attempts,
                        last_error: state.last_error.clone().unwrap_or_default(),
                    });
                }
                RetryStatus::Retrying => {
                    if let Some(last_try) = state.last_try {
                        let elapsed = last_try.elapsed();
                        if elapsed < self.retry_delay {
                            return Err(KubeletError::RetryLater {
                                name: self.name.clone(),
                                remaining_secs: (self.retry_delay - elapsed).as_secs(),
                            });
                        }
                    }
                }
                RetryStatus::Idle | RetryStatus::Succeeded => {}
            }
        }

        let result = attempt().await;

        let mut state = self.state.lock().await;
        state.last_try = Some(Instant::now());
        match &result {
            Ok(_) => {
                debug!(retrier = %self.name, "attempt succeeded");
                state.status = RetryStatus::Succeeded;
                state.attempts = 0;
                state.last_error = None;
            }
            Err(error) => {
                state.attempts += 1;
                state.last_error = Some(error.to_string());
                if state.attempts >= self.retry_count {
                    warn!(retrier = %self.name, attempts = state.attempts, %error, "giving up");
                    state.status = RetryStatus::PermanentFail;
                } else {
                    debug!(
                        retrier = %self.name,
                        attempts = state.attempts,
                        %error,
                        "attempt failed"
                    );
                    state.status = RetryStatus::Retrying;
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn refused() -> KubeletError {
        KubeletError::Unreachable {
            host: "node".into(),
        }
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let retrier = Retrier::new("test", 3, Duration::ZERO);
        let value = retrier.trigger(|| async { Ok::<_, KubeletError>(7) }).await.unwrap();
        assert_eq!(value, 7);
        assert_eq!(retrier.status().await, RetryStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_exhausted_budget_stops_attempting() {
        let retrier = Retrier::new("test", 2, Duration::ZERO);
        let counter = AtomicU32::new(0);
        let calls = &counter;

        for _ in 0..4 {
            let _ = retrier
                .trigger(|| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(refused())
                })
                .await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(retrier.status().await, RetryStatus::PermanentFail);
        let err = retrier.trigger(|| async { Ok::<_, KubeletError>(()) }).await.unwrap_err();
        assert!(matches!(err, KubeletError::PermanentFail { attempts: 2, .. }));
    }

    #[tokio::test]
    async fn test_retry_later_inside_delay_window() {
        let retrier = Retrier::new("test", 5, Duration::from_secs(60));
        let _ = retrier.trigger(|| async { Err::<(), _>(refused()) }).await;

        let err = retrier.trigger(|| async { Ok::<_, KubeletError>(()) }).await.unwrap_err();
        assert!(matches!(err, KubeletError::RetryLater { .. }));
        assert_eq!(retrier.attempts().await, 1);
    }

    #[tokio::test]
    async fn test_success_after_failure_resets() {
        let retrier = Retrier::new("test", 3, Duration::ZERO);
        let _ = retrier.trigger(|| async { Err::<(), _>(refused()) }).await;
        assert_eq!(retrier.status().await, RetryStatus::Retrying);

        retrier.trigger(|| async { Ok::<_, KubeletError>(()) }).await.unwrap();
        assert_eq!(retrier.status().await, RetryStatus::Succeeded);
        assert_eq!(retrier.attempts().await, 0);
    }
}
