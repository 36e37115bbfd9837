use std::sync::Arc;

use alloy::primitives::{Address, U256};
use error_stack::ResultExt;
use swap_models::constants::chains::{self, NetworkDescriptor, is_native_token};
use tracing::info;

use crate::chain::ChainClient;
use crate::chain::evm::encode_approve;
use crate::error::{EngineResult, Error};
use crate::models::trade::{ApprovalOutcome, TxDescriptor};

/// Makes sure the spender can move `required` of the owner's tokens before a trade
#[derive(Clone)]
pub struct ApprovalCoordinator {
    chain: Arc<dyn ChainClient>,
}

impl ApprovalCoordinator {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }

    /// Reads the allowance and, when short, approves exactly `required` and
    /// waits for the approval to be mined. Never retried.
    pub async fn ensure_approval(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        required: U256,
        chain_id: u32,
    ) -> EngineResult<ApprovalOutcome> {
        if is_native_token(&token) {
            info!("Native token, no approval needed");
            return Ok(ApprovalOutcome::skipped());
        }

        let network = chains::resolve(chain_id)
            .change_context(Error::UnsupportedChain(chain_id))?;

        let allowance = self
            .current_allowance(&network, token, owner, spender)
            .await?;

        if allowance >= required {
            info!("Allowance {allowance} of {token} covers {required}, approval skipped");
            return Ok(ApprovalOutcome::skipped());
        }

        info!("Approving {required} of {token} for {spender} (current allowance {allowance})");
        let tx_hash = self
            .chain
            .approve(&network, token, spender, required)
            .await
            .change_context(Error::ApprovalError(format!(
                "Failed to approve {token} for {spender}"
            )))?;

        info!("Approval confirmed: {tx_hash:#x}");
        Ok(ApprovalOutcome::approved(tx_hash))
    }

    async fn current_allowance(
        &self,
        network: &NetworkDescriptor,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> EngineResult<U256> {
        self.chain
            .allowance(network, token, owner, spender)
            .await
            .change_context(Error::ApprovalError(format!(
                "Failed to read allowance of {token} on {}",
                network.name
            )))
    }

    /// Unsigned approval transaction for an external signer, `None` when the
    /// current allowance already covers `required`
    pub async fn approval_transaction(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        required: U256,
        chain_id: u32,
    ) -> EngineResult<Option<TxDescriptor>> {
        if is_native_token(&token) {
            return Ok(None);
        }

        let network = chains::resolve(chain_id)
            .change_context(Error::UnsupportedChain(chain_id))?;
        let allowance = self
            .current_allowance(&network, token, owner, spender)
            .await?;

        if allowance >= required {
            return Ok(None);
        }

        Ok(Some(TxDescriptor {
            to: token,
            value: U256::ZERO,
            data: encode_approve(spender, required),
        }))
    }
}
