use thiserror::Error;

pub type ModelResult<T> = error_stack::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Parse error")]
    ParseError,

    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Reqwest error: {0}")]
    ReqwestError(String),

    /// Non-success response from a remote service, carrying the extracted message
    #[error("{0}")]
    ServiceError(String),

    #[error("Serde deserialize error: {0}")]
    SerdeDeserialize(String),

    #[error("Rate limit error: {0}")]
    RateLimitError(String),
}
