use std::env;

use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SHIMGEN_LOG";

/// Installs the global fmt subscriber. The filter comes from `SHIMGEN_LOG`,
/// then `RUST_LOG`, then `default_directive`. Calling this twice is a no-op.
pub fn init_logging(default_directive: &str) {
    let filter = env::var(LOG_ENV)
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
