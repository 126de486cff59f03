//! Per-request context for upstream calls.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{ServiceError, ServiceResult};

/// Cancellation and deadline supplied by the caller of a service.
///
/// Every authoritative call made on behalf of the request runs under this
/// context. A cancelled or timed-out call fails the request and never
/// writes to a cache.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancellation: CancellationToken,
    timeout: Option<Duration>,
}

impl RequestContext {
    pub fn new(cancellation: CancellationToken, timeout: Option<Duration>) -> Self {
        Self {
            cancellation,
            timeout,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancellation: CancellationToken::new(),
            timeout: Some(timeout),
        }
    }

    /// The same context, bounded by `fallback` if it has no timeout of its
    /// own. Cancellation is shared with `self`.
    pub fn or_timeout(&self, fallback: Option<Duration>) -> Self {
        Self {
            cancellation: self.cancellation.clone(),
            timeout: self.timeout.or(fallback),
        }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run an upstream call under this context.
    pub async fn run<T, E, F>(&self, call: F) -> ServiceResult<T>
    where
        F: Future<Output = Result<T, E>>,
        ServiceError: From<E>,
    {
        let bounded = async {
            match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, call).await {
                    Ok(result) => result.map_err(ServiceError::from),
                    Err(_) => Err(ServiceError::Timeout(limit)),
                },
                None => call.await.map_err(ServiceError::from),
            }
        };

        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(ServiceError::Cancelled),
            result = bounded => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad_auth::AuthError;

    #[tokio::test]
    async fn test_passes_through_result() {
        let ctx = RequestContext::default();

        let ok = ctx.run(async { Ok::<_, AuthError>(7) }).await;
        assert_eq!(tokio_test::assert_ok!(ok), 7);

        let err = ctx
            .run(async { Err::<u32, _>(AuthError::upstream("down")) })
            .await;
        assert!(matches!(err, Err(ServiceError::Directory(_))));
    }

    #[tokio::test]
    async fn test_cancelled_before_completion() {
        let ctx = RequestContext::default();
        ctx.cancellation().cancel();

        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, AuthError>(())
            })
            .await;

        assert!(matches!(result, Err(ServiceError::Cancelled)));
    }

    #[test]
    fn test_fallback_timeout_only_fills_gaps() {
        let unbounded = RequestContext::default();
        let bounded = RequestContext::with_timeout(Duration::from_secs(1));

        assert_eq!(
            unbounded.or_timeout(Some(Duration::from_secs(5))).timeout(),
            Some(Duration::from_secs(5))
        );
        assert_eq!(
            bounded.or_timeout(Some(Duration::from_secs(5))).timeout(),
            Some(Duration::from_secs(1))
        );
        assert_eq!(unbounded.or_timeout(None).timeout(), None);

        let derived = unbounded.or_timeout(Some(Duration::from_secs(5)));
        unbounded.cancellation().cancel();
        assert!(derived.cancellation().is_cancelled());
    }

    #[tokio::test]
    async fn test_times_out() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(10));

        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, AuthError>(())
            })
            .await;

        assert!(matches!(result, Err(ServiceError::Timeout(_))));
    }
}
