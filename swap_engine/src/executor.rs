use std::fmt;
use std::sync::Arc;

use alloy::primitives::TxHash;
use error_stack::{Report, ResultExt, report};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::approval::ApprovalCoordinator;
use crate::chain::ChainClient;
use crate::chain::evm::EvmChainClient;
use crate::config::{EngineConfig, SettlementConfig};
use crate::error::{EngineResult, Error, ReportDisplayExt};
use crate::models::intent::SwapIntent;
use crate::models::trade::{MetaTransaction, PreparedSwap, TradeResult, TradeStatus};
use crate::quote::QuoteEngine;
use crate::settlement::SettlementPoller;
use crate::trading::TradingService;
use crate::trading::client::TradingApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Init,
    Quoted,
    ApprovalResolved,
    Submitted,
    Polling,
    Done,
    Failed,
}

impl ExecutionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionState::Done | ExecutionState::Failed)
    }

    /// Forward steps only; `Failed` is reachable from every non-terminal state
    pub fn can_transition_to(self, next: ExecutionState) -> bool {
        use ExecutionState::*;

        match (self, next) {
            (Done | Failed, _) => false,
            (_, Failed) => true,
            (Init, Quoted)
            | (Quoted, ApprovalResolved)
            | (ApprovalResolved, Submitted)
            | (Submitted, Polling)
            | (Polling, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionState::Init => "INIT",
            ExecutionState::Quoted => "QUOTED",
            ExecutionState::ApprovalResolved => "APPROVAL_RESOLVED",
            ExecutionState::Submitted => "SUBMITTED",
            ExecutionState::Polling => "POLLING",
            ExecutionState::Done => "DONE",
            ExecutionState::Failed => "FAILED",
        };
        write!(f, "{name}")
    }
}

/// Progress of a single execution, kept so failures can still report known ids
#[derive(Debug)]
struct Execution {
    state: ExecutionState,
    trade_id: Option<String>,
    tx_hash: Option<TxHash>,
}

impl Execution {
    fn new() -> Self {
        Self {
            state: ExecutionState::Init,
            trade_id: None,
            tx_hash: None,
        }
    }

    fn advance(&mut self, next: ExecutionState) {
        if !self.state.can_transition_to(next) {
            warn!("Unexpected transition {} -> {next}", self.state);
        }
        info!(
            trade_id = self.trade_id.as_deref(),
            tx_hash = self.tx_hash.map(|hash| format!("{hash:#x}")),
            "Execution {} -> {next}",
            self.state
        );
        self.state = next;
    }

    fn complete(mut self, status: TradeStatus) -> TradeResult {
        self.advance(ExecutionState::Done);
        match (self.tx_hash, self.trade_id) {
            (Some(tx_hash), Some(trade_id)) => TradeResult::completed(tx_hash, trade_id, status),
            (tx_hash, trade_id) => TradeResult::failed(
                "Execution finished without a submitted trade".to_string(),
                trade_id,
                tx_hash,
            ),
        }
    }

    fn fail(mut self, report: Report<Error>) -> TradeResult {
        error!("Execution failed in state {}: {report:?}", self.state);
        self.advance(ExecutionState::Failed);
        TradeResult::failed(report.root_message(), self.trade_id, self.tx_hash)
    }
}

/// Runs intents through quote, approval, submission and settlement
pub struct TradeExecutor {
    quotes: QuoteEngine,
    approvals: ApprovalCoordinator,
    chain: Arc<dyn ChainClient>,
    poller: SettlementPoller,
}

impl TradeExecutor {
    pub fn new(
        service: Arc<dyn TradingService>,
        chain: Arc<dyn ChainClient>,
        settlement: SettlementConfig,
    ) -> EngineResult<Self> {
        Ok(Self {
            quotes: QuoteEngine::new(service.clone()),
            approvals: ApprovalCoordinator::new(chain.clone()),
            chain,
            poller: SettlementPoller::new(service, settlement)?,
        })
    }

    /// HTTP trading client plus a local-key chain client, both from `config`
    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        let service = TradingApiClient::new(&config.trading)?;
        let chain = EvmChainClient::from_config(config)?;
        Self::new(Arc::new(service), Arc::new(chain), config.settlement)
    }

    pub async fn execute(&self, intent: &SwapIntent) -> TradeResult {
        self.execute_cancellable(intent, &CancellationToken::new())
            .await
    }

    /// Cancelling only stops the settlement wait; a submitted trade may still settle.
    pub async fn execute_cancellable(
        &self,
        intent: &SwapIntent,
        cancel: &CancellationToken,
    ) -> TradeResult {
        let mut execution = Execution::new();
        match self.run(&mut execution, intent, cancel).await {
            Ok(status) => execution.complete(status),
            Err(report) => execution.fail(report),
        }
    }

    async fn run(
        &self,
        execution: &mut Execution,
        intent: &SwapIntent,
        cancel: &CancellationToken,
    ) -> EngineResult<TradeStatus> {
        let network = intent.validate()?;
        let intent = self.with_signer_accounts(intent)?;
        let owner = self.chain.account();

        let estimate = self.quotes.estimate(&intent).await?;
        execution.trade_id = Some(estimate.trade_id.clone());
        execution.advance(ExecutionState::Quoted);

        self.approvals
            .ensure_approval(
                intent.src_token,
                owner,
                estimate.tx.to,
                intent.src_amount_wei,
                intent.src_chain_id,
            )
            .await?;
        execution.advance(ExecutionState::ApprovalResolved);

        let tx_hash = self
            .chain
            .send_transaction(&network, &estimate.tx)
            .await
            .change_context(Error::SubmissionError(
                "Failed to submit trade transaction".to_string(),
            ))?;
        execution.tx_hash = Some(tx_hash);
        execution.advance(ExecutionState::Submitted);

        execution.advance(ExecutionState::Polling);
        self.poller.await_terminal(tx_hash, cancel).await
    }

    /// Fills the user account with the signer and the receiver with the user
    fn with_signer_accounts(&self, intent: &SwapIntent) -> EngineResult<SwapIntent> {
        let signer = self.chain.account();
        let mut intent = intent.clone();

        match intent.user_account {
            Some(user) if user != signer => {
                return Err(report!(Error::InvalidIntent(format!(
                    "User account {user} does not match signing account {signer}"
                ))));
            }
            _ => intent.user_account = Some(signer),
        }
        fill_receiver(&mut intent);
        Ok(intent)
    }

    /// Executes intents one at a time; `confirm` sees each result and decides
    /// whether the next intent runs
    pub async fn execute_sequence<F>(
        &self,
        intents: &[SwapIntent],
        mut confirm: F,
    ) -> Vec<TradeResult>
    where
        F: FnMut(&TradeResult) -> bool,
    {
        let mut results = Vec::with_capacity(intents.len());

        for (index, intent) in intents.iter().enumerate() {
            let result = self.execute(intent).await;
            let has_next = index + 1 < intents.len();
            let proceed = has_next && confirm(&result);
            results.push(result);

            if has_next && !proceed {
                info!(
                    "Sequence stopped after {} of {} intents",
                    index + 1,
                    intents.len()
                );
                break;
            }
        }

        results
    }

    /// Quotes the intent and returns the transactions an external wallet has to sign,
    /// approval first when the allowance is short. Nothing is sent.
    pub async fn prepare_swap(&self, intent: &SwapIntent) -> EngineResult<PreparedSwap> {
        intent.validate()?;
        if intent.user_account.is_none() && !intent.is_native_source() {
            return Err(report!(Error::InvalidIntent(
                "User account is required to check the token allowance".to_string()
            )));
        }

        let mut intent = intent.clone();
        fill_receiver(&mut intent);

        let estimate = self.quotes.estimate(&intent).await?;
        let approval = match intent.user_account {
            Some(owner) => {
                self.approvals
                    .approval_transaction(
                        intent.src_token,
                        owner,
                        estimate.tx.to,
                        intent.src_amount_wei,
                        intent.src_chain_id,
                    )
                    .await?
            }
            None => None,
        };

        let meta_transactions = approval
            .iter()
            .chain(std::iter::once(&estimate.tx))
            .map(MetaTransaction::from)
            .collect();

        info!(
            "Prepared swap {} on chain {} (approval needed: {})",
            estimate.trade_id,
            intent.src_chain_id,
            approval.is_some()
        );
        Ok(PreparedSwap {
            chain_id: intent.src_chain_id,
            meta_transactions,
            estimate,
            approval_needed: approval.is_some(),
        })
    }
}

fn fill_receiver(intent: &mut SwapIntent) {
    if intent.dest_receiver.is_none() {
        intent.dest_receiver = intent.user_account;
    }
}
