//! Diagnostic tracing for the binary. Reads `RUST_LOG`, defaults to `warn`,
//! writes compact lines to stderr so command output on stdout stays clean.
//!
//! ```bash
//! RUST_LOG=campus_budget=debug campus-budget scenarios list
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
