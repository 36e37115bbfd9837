use std::sync::Arc;

use error_stack::{ResultExt, report};
use swap_models::network::http::HttpMethod;
use tracing::{error, info};

use crate::error::{EngineResult, Error};
use crate::models::intent::SwapIntent;
use crate::models::trade::TradeEstimate;
use crate::trading::TradingService;
use crate::trading::constants::ESTIMATE_PATH;
use crate::trading::requests::QuoteRequest;
use crate::trading::responses::EstimateResponse;

#[derive(Clone)]
pub struct QuoteEngine {
    service: Arc<dyn TradingService>,
}

impl QuoteEngine {
    pub fn new(service: Arc<dyn TradingService>) -> Self {
        Self { service }
    }

    /// Obtains a binding estimate for the intent. Does not touch the chain.
    pub async fn estimate(&self, intent: &SwapIntent) -> EngineResult<TradeEstimate> {
        let request = QuoteRequest::from(intent);
        let body = serde_json::to_value(&request).map_err(|e| {
            report!(Error::QuoteError(
                "Failed to encode quote request".to_string()
            ))
                .attach_printable(e.to_string())
        })?;

        let response = self
            .service
            .request(ESTIMATE_PATH, HttpMethod::POST, Some(body))
            .await
            .inspect_err(|e| error!("Failed to get trade estimate: {e:?}"))
            .change_context(Error::QuoteError(
                "Failed to get trade estimate".to_string(),
            ))?;

        let response: EstimateResponse = serde_json::from_value(response).map_err(|e| {
            report!(Error::QuoteError(
                "Estimate response is missing trade or tx fields".to_string()
            ))
            .attach_printable(e.to_string())
        })?;
        let estimate = TradeEstimate::from(response);

        if estimate.min_expected_amount > estimate.expected_amount {
            return Err(report!(Error::QuoteError(format!(
                "Minimum amount {} exceeds expected amount {}",
                estimate.min_expected_amount, estimate.expected_amount
            ))));
        }

        info!(
            "Trade estimate {}: expected {}, min {}, spender {}",
            estimate.trade_id,
            estimate.expected_amount,
            estimate.min_expected_amount,
            estimate.tx.to
        );
        Ok(estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportDisplayExt;
    use crate::tests::mocks::{MockTradingService, estimate_json};
    use alloy::primitives::U256;
    use serde_json::json;

    const DEST: &str = "0xdddddddddddddddddddddddddddddddddddddddd";

    #[tokio::test]
    async fn test_estimate_posts_intent() {
        let service = Arc::new(MockTradingService::new(Ok(estimate_json("5000", "4950"))));
        let engine = QuoteEngine::new(service.clone());
        let intent = SwapIntent::native(DEST, "2000000000000").unwrap();

        let estimate = engine.estimate(&intent).await.unwrap();
        assert_eq!(estimate.expected_amount, U256::from(5000u64));
        assert_eq!(estimate.min_expected_amount, U256::from(4950u64));
        assert!(estimate.min_expected_amount <= estimate.expected_amount);

        let calls = service.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].endpoint, ESTIMATE_PATH);
        assert_eq!(calls[0].method, HttpMethod::POST);
        let body = calls[0].body.clone().unwrap();
        assert_eq!(body["srcAmountWei"], json!("2000000000000"));
        assert_eq!(body["slippageBps"], json!(100));
    }

    #[tokio::test]
    async fn test_service_error_is_wrapped() {
        let service = MockTradingService::new(Err("liquidity unavailable".to_string()));
        let engine = QuoteEngine::new(Arc::new(service));
        let intent = SwapIntent::native(DEST, "1").unwrap();

        let err = engine.estimate(&intent).await.unwrap_err();
        assert!(matches!(err.current_context(), Error::QuoteError(_)));
        assert_eq!(err.root_message(), "liquidity unavailable");
    }

    #[tokio::test]
    async fn test_malformed_response_is_quote_error() {
        let service = Arc::new(MockTradingService::new(Ok(json!({"data": {"trade": {}}}))));
        let engine = QuoteEngine::new(service);
        let intent = SwapIntent::native(DEST, "1").unwrap();

        let err = engine.estimate(&intent).await.unwrap_err();
        assert!(matches!(err.current_context(), Error::QuoteError(_)));
    }

    #[tokio::test]
    async fn test_min_above_expected_is_rejected() {
        let service = Arc::new(MockTradingService::new(Ok(estimate_json("100", "101"))));
        let engine = QuoteEngine::new(service);
        let intent = SwapIntent::native(DEST, "1").unwrap();

        let err = engine.estimate(&intent).await.unwrap_err();
        assert!(matches!(err.current_context(), Error::QuoteError(_)));
    }
}
