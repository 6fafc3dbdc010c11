//! Structured logging init: `tracing` + `tracing-subscriber` with an
//! `EnvFilter`, human-readable by default, escalated by repeated `-v`.

use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber. `verbosity` is the count of `-v` flags;
/// `RUST_LOG`, when set, takes precedence over it.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbosity {
            0 => "radar_ingest=info",
            1 => "radar_ingest=debug",
            _ => "radar_ingest=trace",
        };
        EnvFilter::new(level)
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
