use alloy::primitives::{Address, U256};
use error_stack::{ResultExt, report};
use swap_models::constants::chains::{
    self, DEFAULT_CHAIN, NetworkDescriptor, is_native_token, parse_evm_address,
};

use crate::error::{EngineResult, Error};

pub const DEFAULT_SLIPPAGE_BPS: u32 = 100;
pub const MAX_BPS: u32 = 10_000;

/// A user's request to exchange a source token for a destination token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapIntent {
    pub src_chain_id: u32,
    /// ERC-20 address or the native-token sentinel
    pub src_token: Address,
    /// Amount in the token's smallest unit
    pub src_amount_wei: U256,
    pub dest_token: Address,
    pub dest_chain_id: u32,
    pub slippage_bps: u32,
    pub user_account: Option<Address>,
    pub dest_receiver: Option<Address>,
    pub fee_recipient: Option<Address>,
    pub fee_bps: Option<u32>,
}

impl SwapIntent {
    pub fn new(
        chain_id: u32,
        src_token: &str,
        src_amount_wei: &str,
        dest_token: &str,
    ) -> EngineResult<Self> {
        Ok(Self {
            src_chain_id: chain_id,
            src_token: parse_address("source token", src_token)?,
            src_amount_wei: parse_amount(src_amount_wei)?,
            dest_token: parse_address("destination token", dest_token)?,
            dest_chain_id: chain_id,
            slippage_bps: DEFAULT_SLIPPAGE_BPS,
            user_account: None,
            dest_receiver: None,
            fee_recipient: None,
            fee_bps: None,
        })
    }

    /// Native-token source on the deployment's default chain
    pub fn native(dest_token: &str, amount_wei: &str) -> EngineResult<Self> {
        Self::new(
            DEFAULT_CHAIN as u32,
            chains::NATIVE_TOKEN_EVM_ADDRESS,
            amount_wei,
            dest_token,
        )
    }

    pub fn with_slippage_bps(mut self, slippage_bps: u32) -> Self {
        self.slippage_bps = slippage_bps;
        self
    }

    pub fn with_user_account(mut self, user_account: &str) -> EngineResult<Self> {
        self.user_account = Some(parse_address("user account", user_account)?);
        Ok(self)
    }

    pub fn with_receiver(mut self, receiver: &str) -> EngineResult<Self> {
        self.dest_receiver = Some(parse_address("receiver", receiver)?);
        Ok(self)
    }

    pub fn with_fee(mut self, fee_recipient: &str, fee_bps: u32) -> EngineResult<Self> {
        self.fee_recipient = Some(parse_address("fee recipient", fee_recipient)?);
        self.fee_bps = Some(fee_bps);
        Ok(self)
    }

    pub fn with_dest_chain(mut self, dest_chain_id: u32) -> Self {
        self.dest_chain_id = dest_chain_id;
        self
    }

    pub fn is_native_source(&self) -> bool {
        is_native_token(&self.src_token)
    }

    /// Checks the intent can run through the same-chain flow and returns its network
    pub fn validate(&self) -> EngineResult<NetworkDescriptor> {
        let network = chains::resolve(self.src_chain_id)
            .change_context(Error::UnsupportedChain(self.src_chain_id))?;

        if self.dest_chain_id != self.src_chain_id {
            return Err(report!(Error::InvalidIntent(format!(
                "Cross-chain swaps are not supported ({} -> {})",
                self.src_chain_id, self.dest_chain_id
            ))));
        }
        if self.slippage_bps > MAX_BPS {
            return Err(report!(Error::InvalidIntent(format!(
                "Slippage of {} bps exceeds {MAX_BPS}",
                self.slippage_bps
            ))));
        }
        if let Some(fee_bps) = self.fee_bps {
            if fee_bps > MAX_BPS {
                return Err(report!(Error::InvalidIntent(format!(
                    "Fee of {fee_bps} bps exceeds {MAX_BPS}"
                ))));
            }
        }
        if self.src_token == self.dest_token {
            return Err(report!(Error::InvalidIntent(
                "Source and destination tokens are the same".to_string()
            )));
        }

        Ok(network)
    }
}

fn parse_address(field: &str, address: &str) -> EngineResult<Address> {
    parse_evm_address(address).change_context(Error::InvalidIntent(format!(
        "Invalid {field} address provided: {address}"
    )))
}

/// Parses a base-10 integer string without sign, spaces or radix prefix
pub fn parse_amount(amount: &str) -> EngineResult<U256> {
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return Err(report!(Error::InvalidIntent(format!(
            "Amount must be a non-negative integer string, got {amount:?}"
        ))));
    }
    U256::from_str_radix(amount, 10).map_err(|e| {
        report!(Error::InvalidIntent(format!(
            "Amount out of range: {amount}"
        )))
        .attach_printable(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDC_BASE: &str = "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913";
    const USER: &str = "0x1234567890098765432112345678900987654321";

    #[test]
    fn test_native_intent_defaults() {
        let intent = SwapIntent::native(USDC_BASE, "2000000000000").unwrap();
        assert_eq!(intent.src_chain_id, 8453);
        assert_eq!(intent.dest_chain_id, 8453);
        assert!(intent.is_native_source());
        assert_eq!(intent.src_amount_wei, U256::from(2_000_000_000_000u64));
        assert_eq!(intent.slippage_bps, DEFAULT_SLIPPAGE_BPS);
        assert!(intent.user_account.is_none());
        assert!(intent.dest_receiver.is_none());
        assert_eq!(intent.validate().unwrap().name, "Base");
    }

    #[test]
    fn test_builders() {
        let intent = SwapIntent::new(10, USDC_BASE, "500", chains::NATIVE_TOKEN_EVM_ADDRESS)
            .unwrap()
            .with_slippage_bps(50)
            .with_user_account(USER)
            .unwrap()
            .with_receiver(USER)
            .unwrap()
            .with_fee(USER, 25)
            .unwrap();

        assert!(!intent.is_native_source());
        assert_eq!(intent.slippage_bps, 50);
        assert_eq!(intent.user_account, intent.dest_receiver);
        assert_eq!(intent.fee_bps, Some(25));
        assert!(intent.validate().is_ok());
    }

    #[test]
    fn test_amount_must_be_plain_integer() {
        for bad in ["", "-1", "1.5", "0x10", " 10", "1e18", "+5"] {
            let err = SwapIntent::native(USDC_BASE, bad).unwrap_err();
            assert!(
                matches!(err.current_context(), Error::InvalidIntent(_)),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(parse_amount("0").unwrap(), U256::ZERO);
        assert!(parse_amount(&"9".repeat(80)).is_err());
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let bad_checksum = "0x833589FCD6eDb6E08f4c7C32D4f71b54bdA02913";
        let err = SwapIntent::native(bad_checksum, "1").unwrap_err();
        assert!(matches!(err.current_context(), Error::InvalidIntent(_)));
        assert!(SwapIntent::native("not-an-address", "1").is_err());
    }

    #[test]
    fn test_validate_rejects_cross_chain() {
        let intent = SwapIntent::native(USDC_BASE, "1")
            .unwrap()
            .with_dest_chain(10);
        let err = intent.validate().unwrap_err();
        assert!(matches!(err.current_context(), Error::InvalidIntent(_)));
    }

    #[test]
    fn test_validate_rejects_unsupported_chain() {
        let intent = SwapIntent::new(56, chains::NATIVE_TOKEN_EVM_ADDRESS, "1", USDC_BASE).unwrap();
        let err = intent.validate().unwrap_err();
        assert_eq!(err.current_context(), &Error::UnsupportedChain(56));
    }

    #[test]
    fn test_validate_rejects_excessive_slippage_and_same_token() {
        let intent = SwapIntent::native(USDC_BASE, "1")
            .unwrap()
            .with_slippage_bps(10_001);
        assert!(intent.validate().is_err());

        let intent = SwapIntent::new(8453, USDC_BASE, "1", USDC_BASE).unwrap();
        assert!(intent.validate().is_err());
    }
}
