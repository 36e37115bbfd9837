use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};


/// Debug output for the engine, captured per test
pub fn init_tracing_in_tests() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("swap_engine=debug")),
        )
        .with(fmt::layer().with_test_writer().with_ansi(false))
        .try_init()
        .ok();
}
