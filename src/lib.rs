pub mod aggregator;
pub mod archiver;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod logging;
pub mod models;

pub use aggregator::{AggregationSummary, Aggregator};
pub use client::{MarketplaceClient, SourceClient};
pub use config::Config;
pub use models::{ProductRecord, Source};
