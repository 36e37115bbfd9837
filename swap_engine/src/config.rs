use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use error_stack::report;
use swap_models::constants::chains::ChainId;
use swap_models::network::RateLimitWindow;

use crate::error::{EngineResult, Error};
use crate::trading::constants::DEFAULT_TRADING_API_URL;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 600;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct TradingApiConfig {
    pub base_url: String,
    /// Bearer credential attached to every request
    pub api_key: String,
    pub rate_limit: Option<RateLimitWindow>,
    pub request_timeout: Duration,
}

impl TradingApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_TRADING_API_URL.to_string(),
            api_key: api_key.into(),
            rate_limit: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(report!(Error::ConfigError(
                "API_KEY environment variable not set".to_string()
            )));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(report!(Error::ConfigError(format!(
                "Invalid trading API url: {}",
                self.base_url
            ))));
        }
        Ok(())
    }
}

impl fmt::Debug for TradingApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TradingApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("rate_limit", &self.rate_limit)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementConfig {
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl SettlementConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_attempts == 0 {
            return Err(report!(Error::ConfigError(
                "SETTLEMENT_MAX_ATTEMPTS must be greater than zero".to_string()
            )));
        }
        Ok(())
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

#[derive(Clone)]
pub struct EngineConfig {
    pub trading: TradingApiConfig,
    pub settlement: SettlementConfig,
    /// Hex private key of the signing account, only needed for on-chain execution
    pub private_key: Option<String>,
    pub rpc_overrides: HashMap<ChainId, String>,
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("trading", &self.trading)
            .field("settlement", &self.settlement)
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "<redacted>"),
            )
            .field("rpc_overrides", &self.rpc_overrides)
            .finish()
    }
}

impl EngineConfig {
    /// Reads the configuration from the process environment (after `.env` is loaded)
    pub fn from_env() -> EngineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> EngineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("API_KEY").unwrap_or_default();

        let mut trading = TradingApiConfig::new(api_key);
        if let Some(url) = lookup("TRADING_API_URL") {
            trading.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(limit) = lookup("TRADING_API_RATE_LIMIT") {
            trading.rate_limit = Some(RateLimitWindow::from_string(&limit).ok_or_else(|| {
                report!(Error::ConfigError(format!(
                    "Invalid TRADING_API_RATE_LIMIT: {limit}"
                )))
            })?);
        }
        if let Some(secs) = lookup("TRADING_API_TIMEOUT_SECS") {
            let secs = parse_number("TRADING_API_TIMEOUT_SECS", &secs)?;
            trading.request_timeout = Duration::from_secs(secs);
        }
        trading.validate()?;

        let mut settlement = SettlementConfig::default();
        if let Some(ms) = lookup("SETTLEMENT_POLL_INTERVAL_MS") {
            settlement.poll_interval =
                Duration::from_millis(parse_number("SETTLEMENT_POLL_INTERVAL_MS", &ms)?);
        }
        if let Some(attempts) = lookup("SETTLEMENT_MAX_ATTEMPTS") {
            let attempts = parse_number("SETTLEMENT_MAX_ATTEMPTS", &attempts)?;
            settlement.max_attempts = u32::try_from(attempts).map_err(|_| {
                report!(Error::ConfigError(format!(
                    "SETTLEMENT_MAX_ATTEMPTS out of range: {attempts}"
                )))
            })?;
        }
        settlement.validate()?;

        let rpc_overrides = ChainId::supported_chains()
            .into_iter()
            .filter_map(|chain| {
                lookup(&format!("RPC_URL_{}", chain as u32)).map(|url| (chain, url))
            })
            .collect();

        Ok(Self {
            trading,
            settlement,
            private_key: lookup("PRIVATE_KEY").filter(|key| !key.trim().is_empty()),
            rpc_overrides,
        })
    }
}

fn parse_number(key: &str, value: &str) -> EngineResult<u64> {
    value.trim().parse::<u64>().map_err(|e| {
        report!(Error::ConfigError(format!("Invalid {key}: {value}")))
            .attach_printable(e.to_string())
    })
}
