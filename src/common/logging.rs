//! Logging and tracing configuration
//!
//! All diagnostics go to stderr so the report can own stdout. The default
//! filter only surfaces warnings; `--verbose` raises it to INFO, and the
//! `RUST_LOG` environment variable overrides both.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for the CLI (stderr logging)
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("tabletest=info,warn")
        } else {
            EnvFilter::new("tabletest=warn,error")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
