use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use swap_models::constants::chains::NetworkDescriptor;

use crate::error::EngineResult;
use crate::models::trade::TxDescriptor;

pub mod evm;

/// Signing and broadcast collaborator for one account.
///
/// Implementations own the key; the engine only hands over descriptors.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the signing account
    fn account(&self) -> Address;

    async fn allowance(
        &self,
        network: &NetworkDescriptor,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> EngineResult<U256>;

    /// Submits `approve(spender, amount)` and returns once the receipt shows success
    async fn approve(
        &self,
        network: &NetworkDescriptor,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> EngineResult<TxHash>;

    /// Signs and broadcasts the transaction, returning as soon as the node accepted it
    async fn send_transaction(
        &self,
        network: &NetworkDescriptor,
        tx: &TxDescriptor,
    ) -> EngineResult<TxHash>;
}
