use error_stack::Report;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type EngineResult<T> = error_stack::Result<T, Error>;

#[derive(Error, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Error {
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(u32),

    /// Failure reported by the trading service, holding its message verbatim
    #[error("{0}")]
    TradingServiceError(String),

    #[error("Quote error: {0}")]
    QuoteError(String),

    #[error("Approval error: {0}")]
    ApprovalError(String),

    #[error("Submission error: {0}")]
    SubmissionError(String),

    #[error("Settlement error: {0}")]
    SettlementError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid intent: {0}")]
    InvalidIntent(String),

    #[error("Parse error")]
    ParseError,

    #[error("Serde deserialize error: {0}")]
    SerdeDeserialize(String),
}

pub trait ReportDisplayExt {
    /// Message of the innermost engine error, i.e. the step that actually failed
    fn root_message(&self) -> String;
}

impl ReportDisplayExt for Report<Error> {
    fn root_message(&self) -> String {
        self.frames()
            .filter_map(|frame| frame.downcast_ref::<Error>())
            .last()
            .unwrap_or_else(|| self.current_context())
            .to_string()
    }
}
