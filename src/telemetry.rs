use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

/// Log level used when `RUST_LOG` is not set.
const DEFAULT_DIRECTIVE: &str = "info";

/// Installs the global tracing subscriber.
///
/// Events go to stderr, formatted for humans, filtered by `RUST_LOG`. Stdout
/// stays reserved for the chat exchange itself.
pub fn init() -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
}
