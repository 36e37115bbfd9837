use std::sync::Arc;

use alloy::primitives::TxHash;
use error_stack::{ResultExt, report};
use serde_json::json;
use swap_models::network::http::{HttpMethod, value_to_sorted_querystring};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SettlementConfig;
use crate::error::{EngineResult, Error, ReportDisplayExt};
use crate::models::trade::TradeStatus;
use crate::trading::TradingService;
use crate::trading::constants::STATUS_PATH;

/// Polls trade status by transaction hash until it leaves the non-terminal states
#[derive(Clone)]
pub struct SettlementPoller {
    service: Arc<dyn TradingService>,
    config: SettlementConfig,
}

impl SettlementPoller {
    pub fn new(service: Arc<dyn TradingService>, config: SettlementConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { service, config })
    }

    pub async fn fetch_status(&self, tx_hash: TxHash) -> EngineResult<TradeStatus> {
        let query = value_to_sorted_querystring(&json!({ "txHash": format!("{tx_hash:#x}") }))
            .change_context(Error::ParseError)?;

        let response = self
            .service
            .request(&format!("{STATUS_PATH}?{query}"), HttpMethod::GET, None)
            .await?;

        TradeStatus::from_value(response)
    }

    /// Reads are retried within the attempt budget; nothing is ever resubmitted.
    pub async fn await_terminal(
        &self,
        tx_hash: TxHash,
        cancel: &CancellationToken,
    ) -> EngineResult<TradeStatus> {
        for attempt in 1..=self.config.max_attempts {
            match self.fetch_status(tx_hash).await {
                Ok(status) if status.is_terminal() => {
                    info!("Trade {tx_hash:#x} settled with status {}", status.status);
                    return Ok(status);
                }
                Ok(status) => {
                    debug!(
                        "Trade {tx_hash:#x} status {} (attempt {attempt}/{})",
                        status.status, self.config.max_attempts
                    );
                }
                Err(e) => {
                    warn!(
                        "Failed to read status of {tx_hash:#x} (attempt {attempt}/{}): {}",
                        self.config.max_attempts,
                        e.root_message()
                    );
                }
            }

            if attempt == self.config.max_attempts {
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(report!(Error::SettlementError(format!(
                        "Polling of {tx_hash:#x} cancelled after {attempt} attempts"
                    ))));
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        Err(report!(Error::SettlementError(format!(
            "Trade {tx_hash:#x} not settled after {} attempts",
            self.config.max_attempts
        ))))
    }
}
