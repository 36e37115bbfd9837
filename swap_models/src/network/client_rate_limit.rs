use error_stack::{ResultExt, report};
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter, clock::DefaultClock};
use reqwest::{Client as ReqwestClient, Error as ReqwestError, Request, Response};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, ModelResult};
use crate::network::RateLimitWindow;

#[derive(Debug, Clone)]
pub enum Client {
    RateLimited(RateLimitedClient),
    Unrestricted(ReqwestClient),
}

impl Client {
    /// Builds a client with a request timeout, throttled when a window is given
    pub fn new(rate_limit: Option<RateLimitWindow>, timeout: Duration) -> ModelResult<Self> {
        let inner = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .change_context(Error::ReqwestError(
                "Failed to build HTTP client".to_string(),
            ))?;

        Ok(match rate_limit {
            Some(limit) => Client::RateLimited(RateLimitedClient::with_client(inner, limit, None)?),
            None => Client::Unrestricted(inner),
        })
    }

    pub async fn execute(&self, req: Request) -> Result<Response, ReqwestError> {
        match self {
            Client::RateLimited(rate_limited_client) => rate_limited_client.execute(req).await,
            Client::Unrestricted(unrestricted_client) => unrestricted_client.execute(req).await,
        }
    }

    pub fn inner_client(&self) -> &ReqwestClient {
        match self {
            Client::RateLimited(rate_limited_client) => rate_limited_client.inner_client(),
            Client::Unrestricted(unrestricted_client) => unrestricted_client,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitedClient {
    inner: ReqwestClient,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimitedClient {
    pub fn with_client(
        inner: ReqwestClient,
        limit: RateLimitWindow,
        burst: Option<NonZeroU32>,
    ) -> ModelResult<Self> {
        let mut quota = match limit {
            RateLimitWindow::PerSecond(allowed) => Quota::per_second(allowed),
            RateLimitWindow::PerMinute(allowed) => Quota::per_minute(allowed),
            RateLimitWindow::Custom { period } => Quota::with_period(period).ok_or_else(|| {
                report!(Error::RateLimitError(format!(
                    "Invalid rate limit period: {period:?}"
                )))
            })?,
        };
        if let Some(burst) = burst {
            quota = quota.allow_burst(burst);
        }
        let limiter = Arc::new(RateLimiter::direct(quota));
        Ok(Self { inner, limiter })
    }

    pub fn inner_client(&self) -> &ReqwestClient {
        &self.inner
    }

    pub async fn execute(&self, req: Request) -> Result<Response, ReqwestError> {
        self.limiter.until_ready().await;
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_variants() {
        let unrestricted = Client::new(None, Duration::from_secs(5)).unwrap();
        assert!(matches!(unrestricted, Client::Unrestricted(_)));

        let window = RateLimitWindow::from_string("10s");
        let limited = Client::new(window, Duration::from_secs(5)).unwrap();
        assert!(matches!(limited, Client::RateLimited(_)));
    }

    #[test]
    fn test_zero_period_is_rejected() {
        let result = RateLimitedClient::with_client(
            ReqwestClient::new(),
            RateLimitWindow::Custom {
                period: Duration::ZERO,
            },
            None,
        );
        assert!(result.is_err());
    }
}
