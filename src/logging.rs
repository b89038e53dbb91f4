//! Diagnostic logging setup.
//!
//! Status lines for users are printed directly with `colored`; this module
//! wires up `tracing` for the detailed per-directory log, always on stderr
//! so stdout carries only the tree document.

use tracing_subscriber::{EnvFilter, fmt};

/// Map `-q` / `-v` counts to a level name.
pub fn level_for(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// verbosity flags. Calling this twice is harmless.
pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level_for(verbose, quiet);
        EnvFilter::new(format!("modtree={},warn", level))
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .compact()
        .try_init();
}
