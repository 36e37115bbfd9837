use std::collections::HashMap;
use std::str::FromStr;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use error_stack::report;
use swap_models::constants::chains::{ChainId, NetworkDescriptor};
use tracing::{debug, info};

use crate::chain::ChainClient;
use crate::config::EngineConfig;
use crate::error::{EngineResult, Error};
use crate::models::trade::TxDescriptor;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// Calldata of `approve(spender, amount)`
pub fn encode_approve(spender: Address, amount: U256) -> Bytes {
    IERC20::approveCall { spender, amount }.abi_encode().into()
}

/// [`ChainClient`] backed by a local private key and HTTP JSON-RPC
pub struct EvmChainClient {
    signer: PrivateKeySigner,
    rpc_overrides: HashMap<ChainId, String>,
}

impl EvmChainClient {
    pub fn new(private_key: &str, rpc_overrides: HashMap<ChainId, String>) -> EngineResult<Self> {
        let signer = PrivateKeySigner::from_str(private_key.trim()).map_err(|_| {
            report!(Error::ConfigError("Invalid PRIVATE_KEY".to_string()))
        })?;
        Ok(Self {
            signer,
            rpc_overrides,
        })
    }

    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        let private_key = config.private_key.as_deref().ok_or_else(|| {
            report!(Error::ConfigError(
                "PRIVATE_KEY environment variable not set".to_string()
            ))
        })?;
        Self::new(private_key, config.rpc_overrides.clone())
    }

    pub fn rpc_url(&self, network: &NetworkDescriptor) -> &str {
        self.rpc_overrides
            .get(&network.chain_id)
            .map(String::as_str)
            .unwrap_or(network.rpc_url)
    }

    fn provider(&self, network: &NetworkDescriptor) -> EngineResult<DynProvider> {
        let url = self.rpc_url(network);
        let url = reqwest::Url::parse(url).map_err(|e| {
            report!(Error::ConfigError(format!(
                "Invalid RPC url for {}: {url}",
                network.name
            )))
            .attach_printable(e.to_string())
        })?;

        Ok(ProviderBuilder::new()
            .wallet(self.signer.clone())
            .connect_http(url)
            .erased())
    }
}

async fn read_allowance(
    provider: &DynProvider,
    token: Address,
    owner: Address,
    spender: Address,
) -> EngineResult<U256> {
    let erc20 = IERC20::new(token, provider.clone());

    erc20.allowance(owner, spender).call().await.map_err(|e| {
        report!(Error::ApprovalError(format!(
            "Failed to read allowance of {token}: {e}"
        )))
    })
}

async fn submit_approval(
    provider: &DynProvider,
    token: Address,
    spender: Address,
    amount: U256,
) -> EngineResult<TxHash> {
    let erc20 = IERC20::new(token, provider.clone());

    let pending = erc20.approve(spender, amount).send().await.map_err(|e| {
        report!(Error::ApprovalError(format!(
            "Failed to submit approval for {token}: {e}"
        )))
    })?;
    let tx_hash = *pending.tx_hash();
    debug!("Approval {tx_hash:#x} submitted, waiting for receipt");

    let receipt = pending.get_receipt().await.map_err(|e| {
        report!(Error::ApprovalError(format!(
            "Failed to confirm approval {tx_hash:#x}: {e}"
        )))
    })?;
    check_approval_receipt(&receipt)?;

    info!(
        "Approval {tx_hash:#x} confirmed in block {:?}",
        receipt.block_number
    );
    Ok(tx_hash)
}

/// A mined but reverted approval leaves the allowance untouched
fn check_approval_receipt(receipt: &TransactionReceipt) -> EngineResult<()> {
    if !receipt.status() {
        return Err(report!(Error::ApprovalError(format!(
            "Approval transaction {:#x} reverted",
            receipt.transaction_hash
        ))));
    }
    Ok(())
}

async fn submit_transaction(
    provider: &DynProvider,
    from: Address,
    tx: &TxDescriptor,
) -> EngineResult<TxHash> {
    let request = TransactionRequest::default()
        .with_from(from)
        .with_to(tx.to)
        .with_value(tx.value)
        .with_input(tx.data.clone());

    let pending = provider.send_transaction(request).await.map_err(|e| {
        report!(Error::SubmissionError(format!(
            "Failed to send transaction to {}: {e}",
            tx.to
        )))
    })?;

    Ok(*pending.tx_hash())
}

#[async_trait]
impl ChainClient for EvmChainClient {
    fn account(&self) -> Address {
        self.signer.address()
    }

    async fn allowance(
        &self,
        network: &NetworkDescriptor,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> EngineResult<U256> {
        let provider = self.provider(network)?;
        read_allowance(&provider, token, owner, spender).await
    }

    async fn approve(
        &self,
        network: &NetworkDescriptor,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> EngineResult<TxHash> {
        let provider = self.provider(network)?;
        submit_approval(&provider, token, spender, amount).await
    }

    async fn send_transaction(
        &self,
        network: &NetworkDescriptor,
        tx: &TxDescriptor,
    ) -> EngineResult<TxHash> {
        let provider = self.provider(network)?;
        submit_transaction(&provider, self.account(), tx).await
    }
}
