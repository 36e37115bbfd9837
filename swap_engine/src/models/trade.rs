use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use error_stack::report;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{DeserializeFromStr, DisplayFromStr, SerializeDisplay, serde_as};

use crate::error::{EngineResult, Error};

/// Ready-to-send transaction: recipient contract, native value and calldata
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxDescriptor {
    pub to: Address,
    /// Decimal or `0x` hex on the wire
    #[serde_as(as = "DisplayFromStr")]
    pub value: U256,
    pub data: Bytes,
}

/// Binding trade estimate for a single execution attempt
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeEstimate {
    pub trade_id: String,
    #[serde_as(as = "DisplayFromStr")]
    pub expected_amount: U256,
    /// Expected amount adjusted by slippage, computed by the service
    #[serde_as(as = "DisplayFromStr")]
    pub min_expected_amount: U256,
    pub tx: TxDescriptor,
    pub fees: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum TradeStatusKind {
    Pending,
    Success,
    Failed,
    Refunded,
    Unknown,
    /// Status string the engine does not know about
    Other(String),
}

impl TradeStatusKind {
    /// Anything not explicitly terminal keeps the poller going
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TradeStatusKind::Success
                | TradeStatusKind::Failed
                | TradeStatusKind::Refunded
                | TradeStatusKind::Unknown
        )
    }
}

impl FromStr for TradeStatusKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "PENDING" => TradeStatusKind::Pending,
            "SUCCESS" => TradeStatusKind::Success,
            "FAILED" => TradeStatusKind::Failed,
            "REFUNDED" => TradeStatusKind::Refunded,
            "UNKNOWN" => TradeStatusKind::Unknown,
            other => TradeStatusKind::Other(other.to_string()),
        })
    }
}

impl fmt::Display for TradeStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeStatusKind::Pending => write!(f, "PENDING"),
            TradeStatusKind::Success => write!(f, "SUCCESS"),
            TradeStatusKind::Failed => write!(f, "FAILED"),
            TradeStatusKind::Refunded => write!(f, "REFUNDED"),
            TradeStatusKind::Unknown => write!(f, "UNKNOWN"),
            TradeStatusKind::Other(status) => write!(f, "{status}"),
        }
    }
}

/// Trade status as reported by the service, with its service-specific fields kept
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeStatus {
    pub status: TradeStatusKind,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl TradeStatus {
    pub fn new(status: TradeStatusKind) -> Self {
        Self {
            status,
            details: Map::new(),
        }
    }

    pub fn from_value(value: Value) -> EngineResult<Self> {
        let Value::Object(mut details) = value else {
            return Err(report!(Error::SerdeDeserialize(
                "Trade status response is not a JSON object".to_string()
            )));
        };

        let status = match details.remove("status") {
            Some(Value::String(status)) => status,
            other => {
                return Err(report!(Error::SerdeDeserialize(
                    "Trade status response has no status string".to_string()
                ))
                .attach_printable(format!("status field: {other:?}")));
            }
        };

        Ok(Self {
            status: TradeStatusKind::from_str(&status).unwrap_or(TradeStatusKind::Unknown),
            details,
        })
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Result of `ensure_approval`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalOutcome {
    pub skipped: bool,
    pub tx_hash: Option<TxHash>,
}

impl ApprovalOutcome {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            tx_hash: None,
        }
    }

    pub fn approved(tx_hash: TxHash) -> Self {
        Self {
            skipped: false,
            tx_hash: Some(tx_hash),
        }
    }
}

/// Final output of one executor run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_status: Option<TradeStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TradeResult {
    pub fn completed(tx_hash: TxHash, trade_id: String, trade_status: TradeStatus) -> Self {
        Self {
            success: true,
            tx_hash: Some(tx_hash),
            trade_id: Some(trade_id),
            trade_status: Some(trade_status),
            error: None,
        }
    }

    pub fn failed(error: String, trade_id: Option<String>, tx_hash: Option<TxHash>) -> Self {
        Self {
            success: false,
            tx_hash,
            trade_id,
            trade_status: None,
            error: Some(error),
        }
    }
}

/// Unsigned transaction handed to an external wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTransaction {
    pub to: Address,
    /// `0x` hex
    pub value: String,
    pub data: Bytes,
}

impl From<&TxDescriptor> for MetaTransaction {
    fn from(tx: &TxDescriptor) -> Self {
        Self {
            to: tx.to,
            value: format!("{:#x}", tx.value),
            data: tx.data.clone(),
        }
    }
}

/// Quoted swap ready for an external signer, approval first when one is needed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedSwap {
    pub chain_id: u32,
    pub meta_transactions: Vec<MetaTransaction>,
    pub estimate: TradeEstimate,
    pub approval_needed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_kind_terminal_set() {
        assert!(!TradeStatusKind::Pending.is_terminal());
        assert!(TradeStatusKind::Success.is_terminal());
        assert!(TradeStatusKind::Failed.is_terminal());
        assert!(TradeStatusKind::Refunded.is_terminal());
        assert!(TradeStatusKind::Unknown.is_terminal());
        let other = TradeStatusKind::Other("BRIDGING".to_string());
        assert!(!other.is_terminal());
    }

    #[test]
    fn test_status_kind_string_forms() {
        for status in [
            "PENDING", "SUCCESS", "FAILED", "REFUNDED", "UNKNOWN", "QUEUED",
        ] {
            let kind = TradeStatusKind::from_str(status).unwrap();
            assert_eq!(kind.to_string(), status);
        }
        let parsed: TradeStatusKind = serde_json::from_value(json!("REFUNDED")).unwrap();
        assert_eq!(parsed, TradeStatusKind::Refunded);
    }

    #[test]
    fn test_trade_status_keeps_service_fields() {
        let status = TradeStatus::from_value(json!({
            "status": "SUCCESS",
            "destTokenAmount": "1999",
            "blockNumber": 123
        }))
        .unwrap();

        assert_eq!(status.status, TradeStatusKind::Success);
        assert_eq!(status.details.get("destTokenAmount"), Some(&json!("1999")));

        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["status"], json!("SUCCESS"));
        assert_eq!(value["destTokenAmount"], json!("1999"));
    }

    #[test]
    fn test_trade_status_requires_status_string() {
        let misnamed = json!({"state": "SUCCESS"});
        assert!(TradeStatus::from_value(misnamed).is_err());
        assert!(TradeStatus::from_value(json!({"status": 1})).is_err());
        assert!(TradeStatus::from_value(json!("SUCCESS")).is_err());
    }

    #[test]
    fn test_tx_descriptor_accepts_hex_and_decimal_value() {
        let decimal: TxDescriptor = serde_json::from_value(json!({
            "to": "0x1234567890098765432112345678900987654321",
            "value": "2000000000000",
            "data": "0xabcdef"
        }))
        .unwrap();
        let hex: TxDescriptor = serde_json::from_value(json!({
            "to": "0x1234567890098765432112345678900987654321",
            "value": "0x1d1a94a2000",
            "data": "0xabcdef"
        }))
        .unwrap();

        assert_eq!(decimal.value, U256::from(2_000_000_000_000u64));
        assert_eq!(decimal, hex);
        assert_eq!(MetaTransaction::from(&hex).value, "0x1d1a94a2000");
    }

    #[test]
    fn test_estimate_amounts_serialize_as_decimal() {
        let estimate = TradeEstimate {
            trade_id: "trade-1".to_string(),
            expected_amount: U256::from(5000u64),
            min_expected_amount: U256::from(4950u64),
            tx: TxDescriptor {
                to: Address::repeat_byte(0x55),
                value: U256::from(2_000_000_000_000u64),
                data: Bytes::from(vec![0x12, 0x34]),
            },
            fees: json!({"gas": "21000"}),
        };

        let value = serde_json::to_value(&estimate).unwrap();
        assert_eq!(value["expectedAmount"], json!("5000"));
        assert_eq!(value["minExpectedAmount"], json!("4950"));
        assert_eq!(value["tx"]["value"], json!("2000000000000"));
    }

    #[test]
    fn test_trade_result_serialization_omits_absent_fields() {
        let failed = TradeResult::failed("liquidity unavailable".to_string(), None, None);
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"success": false, "error": "liquidity unavailable"})
        );

        let completed = TradeResult::completed(
            TxHash::repeat_byte(0xab),
            "trade-1".to_string(),
            TradeStatus::new(TradeStatusKind::Success),
        );
        let value = serde_json::to_value(&completed).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["tradeId"], json!("trade-1"));
        assert_eq!(value["tradeStatus"]["status"], json!("SUCCESS"));
        assert!(value["txHash"].as_str().unwrap().starts_with("0xabab"));
        assert!(value.get("error").is_none());
    }
}
