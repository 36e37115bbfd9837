pub const DEFAULT_TRADING_API_URL: &str = "https://trading.ai.zircuit.com/api/engine/v1";

pub const ESTIMATE_PATH: &str = "/order/estimate";
pub const STATUS_PATH: &str = "/order/status";
