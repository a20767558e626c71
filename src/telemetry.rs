use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset; sqlx logs every statement at info
const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Initialize structured logging.
///
/// Emits JSON lines on stdout; `RUST_LOG` controls the level. Records from
/// the `log` crate (actix-web's access logger, the request logger) are
/// bridged into the same subscriber.
pub fn init_telemetry() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .init();
}
