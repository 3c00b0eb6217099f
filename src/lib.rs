//! Batch tools for inclinometer survey data: import vendor RST logs into a
//! campaign document, compute incremental displacement against a reference
//! campaign, export the collection as a table.

pub mod export;
pub mod increments;
pub mod model;
pub mod rst;
pub mod store;

/// Install the global tracing subscriber for the cli tools.
///
/// `RUST_LOG` controls verbosity, default `info`.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
