//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Installs the global subscriber. `RUST_LOG` takes precedence over
/// `logging.filter`; `verbose` forces `debug`.
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init(config: &LoggingConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("r2agi=debug,r2agi_core=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    // A second init (e.g. in tests) is not an error worth surfacing.
    let _ = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
