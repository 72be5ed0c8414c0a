use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use super::{LogFormat, TracingConfig};

pub const DEFAULT_FILTER: &str = "info,docchat=debug,tower_http=debug";

/// `RUST_LOG` overrides [`DEFAULT_FILTER`] when it parses.
pub fn init_tracing(config: &TracingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (json_layer, pretty_layer) = match config.format {
        LogFormat::Json => (
            Some(fmt::layer().json().with_target(true).with_current_span(true)),
            None,
        ),
        LogFormat::Pretty => (
            None,
            Some(fmt::layer().with_target(true).with_file(true).with_line_number(true)),
        ),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .init();

    tracing::debug!(
        environment = %config.environment,
        format = ?config.format,
        "Tracing initialized"
    );
}
