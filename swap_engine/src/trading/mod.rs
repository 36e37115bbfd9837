use async_trait::async_trait;
use serde_json::Value;
use swap_models::network::http::HttpMethod;

use crate::error::EngineResult;

pub mod client;
pub mod constants;
pub mod requests;
pub mod responses;

/// Remote quoting and trading service.
///
/// `endpoint` is a path relative to the service base url and may carry a
/// query string. Every failure comes back as `Error::TradingServiceError`
/// holding the message the service reported.
#[async_trait]
pub trait TradingService: Send + Sync {
    async fn request(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<Value>,
    ) -> EngineResult<Value>;
}
