//! Miscellaneous helper utilities.

use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt};

use crate::errors::Result;
use crate::models::SwapEvent;

/// Initialize `tracing` subscriber with env-based filter.
///
/// If `RUST_LOG` is not set, defaults to `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Read a JSON array of swaps, e.g. a saved subgraph export.
pub fn load_swaps_file(path: &Path) -> Result<Vec<SwapEvent>> {
    let raw = std::fs::read_to_string(path)?;
    let swaps: Vec<SwapEvent> = serde_json::from_str(&raw)?;
    tracing::info!(path = %path.display(), swaps = swaps.len(), "[INIT] swaps loaded from file");
    Ok(swaps)
}
