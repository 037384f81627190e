use anyhow::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "popreceipt=info,popreceipt_core=info";

/// `RUST_LOG` でフィルタ、`LOG_FORMAT=json` で 1 行 1 JSON
pub fn init_logging() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("invalid log filter")?;

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let registry = tracing_subscriber::registry().with(env_filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()
            .context("failed to install the log subscriber")?;
    } else {
        registry
            .with(fmt::layer().with_target(false))
            .try_init()
            .context("failed to install the log subscriber")?;
    }
    Ok(())
}
