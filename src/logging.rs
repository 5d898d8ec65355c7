//! Logging configuration and initialization
//!
//! Service diagnostics go through `tracing`. `RUST_LOG` wins over the
//! configured level; `-v` flags raise the default.

use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Level name for the given verbosity on top of the configured base level.
pub fn level_for(base: &str, verbose: u8) -> String {
    match verbose {
        0 => base.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Initialize tracing for the application. Safe to call more than once.
pub fn init_logging(base_level: &str, verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(base_level, verbose)));

    let initialized = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(verbose >= 3) // Show thread IDs for -vvv
        .with_line_number(verbose >= 3) // Show line numbers for -vvv
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();

    if initialized {
        debug!("rcycletime started with verbosity level: {}", verbose);
    }
}
