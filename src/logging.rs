// src/logging.rs
// =============================================================================
// Logging setup using `tracing` + `tracing-subscriber`.
//
// - RUST_LOG always wins when it is set
// - Otherwise: our crate at info (debug with --verbose), everything else warn
// - Output goes to stderr, so `--json` output on stdout stays machine-readable
// =============================================================================

use anyhow::Result;
use tracing_subscriber::EnvFilter;

pub fn init_logging(verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        "static_export=debug,tower_http=debug,warn"
    } else {
        "static_export=info,warn"
    };

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    Ok(())
}
