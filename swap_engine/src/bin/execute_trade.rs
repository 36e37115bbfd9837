use std::process;

use swap_engine::config::EngineConfig;
use swap_engine::error::ReportDisplayExt;
use swap_engine::executor::TradeExecutor;
use swap_engine::models::intent::{DEFAULT_SLIPPAGE_BPS, SwapIntent};
use swap_models::constants::chains::{DEFAULT_CHAIN, NATIVE_TOKEN_EVM_ADDRESS};
use swap_models::log::init_tracing_from_env;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            eprintln!("execute_trade error: {err}");
            process::exit(1);
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn required_env(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("{key} environment variable is not set"))
}

fn intent_from_env() -> Result<SwapIntent, String> {
    let chain_id = env_or("SRC_CHAIN_ID", &(DEFAULT_CHAIN as u32).to_string())
        .parse::<u32>()
        .map_err(|e| format!("Invalid SRC_CHAIN_ID: {e}"))?;
    let slippage_bps = env_or("SLIPPAGE_BPS", &DEFAULT_SLIPPAGE_BPS.to_string())
        .parse::<u32>()
        .map_err(|e| format!("Invalid SLIPPAGE_BPS: {e}"))?;

    SwapIntent::new(
        chain_id,
        &env_or("SRC_TOKEN", NATIVE_TOKEN_EVM_ADDRESS),
        &required_env("AMOUNT_WEI")?,
        &required_env("DEST_TOKEN")?,
    )
    .map(|intent| intent.with_slippage_bps(slippage_bps))
    .map_err(|report| report.root_message())
}

/// Returns whether the trade completed
async fn run() -> Result<bool, String> {
    dotenv::dotenv().ok();
    init_tracing_from_env();

    let config = EngineConfig::from_env().map_err(|report| report.root_message())?;
    let executor = TradeExecutor::from_config(&config).map_err(|report| report.root_message())?;
    let intent = intent_from_env()?;

    // Ctrl-C stops waiting for settlement, the submitted trade keeps going on-chain
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let result = executor.execute_cancellable(&intent, &cancel).await;
    let output = serde_json::to_string_pretty(&result)
        .map_err(|e| format!("Failed to serialize trade result: {e}"))?;
    println!("{output}");

    Ok(result.success)
}
