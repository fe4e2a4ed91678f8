pub mod api;
pub mod config;
pub mod db;
pub mod pipeline;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the server binary.
///
/// Honors `RUST_LOG` when set, otherwise falls back to the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
