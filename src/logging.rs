//! Console logging setup.
//!
//! Level comes from `RUST_LOG`, defaulting to `info` for this crate and `warn`
//! for dependencies.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_FILTER: &str = "warn,product_aggregator=info";

pub fn init() -> Result<()> {
    init_with_filter(None)
}

/// An explicit directive takes precedence over `RUST_LOG`.
pub fn init_with_filter(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
