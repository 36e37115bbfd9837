use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DisplayFromStr, serde_as};

use crate::models::trade::{TradeEstimate, TxDescriptor};

/// Body of a successful `POST /order/estimate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateResponse {
    pub data: EstimateData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateData {
    pub trade: EstimatedTrade,
    pub tx: TxDescriptor,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedTrade {
    pub trade_id: String,
    #[serde_as(as = "DisplayFromStr")]
    pub dest_token_amount: U256,
    // Slippage-adjusted, computed by the service
    #[serde_as(as = "DisplayFromStr")]
    pub dest_token_min_amount: U256,
    #[serde(default)]
    pub fees: Value,
}

impl From<EstimateResponse> for TradeEstimate {
    fn from(response: EstimateResponse) -> Self {
        let EstimateData { trade, tx } = response.data;
        Self {
            trade_id: trade.trade_id,
            expected_amount: trade.dest_token_amount,
            min_expected_amount: trade.dest_token_min_amount,
            tx,
            fees: trade.fees,
        }
    }
}
