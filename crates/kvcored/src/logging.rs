use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the process-wide tracing subscriber: an env-filter (`RUST_LOG`,
/// falling back to `default_level`) plus a plain formatting layer. Returns
/// an error instead of panicking if a subscriber is already installed,
/// since tests in this crate may call it more than once per process.
pub(crate) fn init(default_level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).try_init()
}
