use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::models::intent::SwapIntent;

/// Body of `POST /order/estimate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub src_chain_id: u32,
    pub src_token: Address,
    // Decimal string, smallest unit of the source token
    pub src_amount_wei: String,
    pub dest_token: Address,
    pub dest_chain_id: u32,
    pub slippage_bps: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_account: Option<Address>,
    // Defaults to the user account on the service side
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_receiver: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_recipient: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_bps: Option<String>,
}

impl From<&SwapIntent> for QuoteRequest {
    fn from(intent: &SwapIntent) -> Self {
        Self {
            src_chain_id: intent.src_chain_id,
            src_token: intent.src_token,
            src_amount_wei: intent.src_amount_wei.to_string(),
            dest_token: intent.dest_token,
            dest_chain_id: intent.dest_chain_id,
            slippage_bps: intent.slippage_bps,
            user_account: intent.user_account,
            dest_receiver: intent.dest_receiver,
            fee_recipient: intent.fee_recipient,
            fee_bps: intent.fee_bps.map(|bps| bps.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quote_request_body() {
        let dest = "0xdddddddddddddddddddddddddddddddddddddddd";
        let intent = SwapIntent::native(dest, "2000000000000")
            .unwrap()
            .with_user_account("0x1234567890098765432112345678900987654321")
            .unwrap();

        let body = serde_json::to_value(QuoteRequest::from(&intent)).unwrap();
        assert_eq!(
            body,
            json!({
                "srcChainId": 8453,
                "srcToken": "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
                "srcAmountWei": "2000000000000",
                "destToken": "0xdddddddddddddddddddddddddddddddddddddddd",
                "destChainId": 8453,
                "slippageBps": 100,
                "userAccount": "0x1234567890098765432112345678900987654321"
            })
        );
    }

    #[test]
    fn test_fee_bps_is_sent_as_string() {
        let intent = SwapIntent::native("0xdddddddddddddddddddddddddddddddddddddddd", "1")
            .unwrap()
            .with_fee("0x1234567890098765432112345678900987654321", 25)
            .unwrap();

        let body = serde_json::to_value(QuoteRequest::from(&intent)).unwrap();
        assert_eq!(body["feeBps"], json!("25"));
        assert!(body.get("destReceiver").is_none());
    }
}
