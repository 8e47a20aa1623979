use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Default filter when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber: formatted events on stderr, filtered by
/// `RUST_LOG` (falling back to [`DEFAULT_FILTER`]).
///
/// # Errors
/// `AlreadyInitialised` on every call after the first.
pub fn init_tracing() -> Result<(), InitError> {
    INITIALISED
        .set(())
        .map_err(|()| InitError::AlreadyInitialised)?;

    let ansi = std::io::stderr().is_terminal();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(std::io::stderr);
    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| InitError::Subscriber(err.to_string()))
}

/// Errors emitted when configuring the tracing subscriber.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// [`init_tracing`] already ran in this process.
    #[error("tracing has already been initialised")]
    AlreadyInitialised,
    /// Another global subscriber was installed first.
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_initialisation_is_rejected() {
        let _ = init_tracing();
        assert!(matches!(init_tracing(), Err(InitError::AlreadyInitialised)));
    }
}
