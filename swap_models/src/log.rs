use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt as _};

/// Selects the output format, `json` (or `prod`) for single-line JSON
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing(prod_format: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    if prod_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().flatten_event(true).with_ansi(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().pretty().with_ansi(true))
            .init();
    }
}

pub fn init_tracing_from_env() {
    let format = std::env::var(LOG_FORMAT_ENV).ok();
    init_tracing(is_prod_format(format.as_deref()));
}

fn is_prod_format(value: Option<&str>) -> bool {
    value
        .map(str::to_ascii_lowercase)
        .is_some_and(|v| v == "json" || v == "prod")
}
