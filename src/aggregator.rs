//! Runs every source client for a query concurrently and merges the results.
//!
//! Each client runs in its own tokio task so a panic in one source cannot take
//! down the other. Results are concatenated in client order, not completion
//! order.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info};

use crate::client::{MarketplaceClient, SourceClient};
use crate::config::Config;
use crate::error::ExtractResult;
use crate::models::{ProductRecord, Source};

/// Per-source record counts for one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationSummary {
    pub per_source: Vec<(Source, usize)>,
}

impl AggregationSummary {
    pub fn total(&self) -> usize {
        self.per_source.iter().map(|(_, count)| count).sum()
    }

    pub fn count_for(&self, source: Source) -> usize {
        self.per_source
            .iter()
            .filter(|(s, _)| *s == source)
            .map(|(_, count)| count)
            .sum()
    }
}

pub struct Aggregator {
    clients: Vec<Arc<dyn SourceClient>>,
}

impl Aggregator {
    pub fn new(clients: Vec<Arc<dyn SourceClient>>) -> Self {
        Self { clients }
    }

    /// Amazon first, then eBay.
    pub fn from_config(config: &Config) -> ExtractResult<Self> {
        let amazon: Arc<dyn SourceClient> = Arc::new(MarketplaceClient::amazon(config)?);
        let ebay: Arc<dyn SourceClient> = Arc::new(MarketplaceClient::ebay(config)?);
        Ok(Self::new(vec![amazon, ebay]))
    }

    pub async fn aggregate(&self, query: &str) -> Vec<ProductRecord> {
        self.aggregate_with_summary(query).await.0
    }

    pub async fn aggregate_with_summary(
        &self,
        query: &str,
    ) -> (Vec<ProductRecord>, AggregationSummary) {
        info!("Starting concurrent parsing for: '{query}'");

        let handles = self.clients.iter().map(|client| {
            let client = Arc::clone(client);
            let query = query.to_string();
            let source = client.source();
            (source, tokio::spawn(async move { client.fetch(&query).await }))
        });
        let (sources, tasks): (Vec<Source>, Vec<_>) = handles.unzip();

        let mut records = Vec::new();
        let mut summary = AggregationSummary::default();
        for (source, joined) in sources.into_iter().zip(join_all(tasks).await) {
            let batch = joined.unwrap_or_else(|e| {
                error!(%source, "{source} parsing failed: {e}");
                Vec::new()
            });
            summary.per_source.push((source, batch.len()));
            records.extend(batch);
        }

        let per_source = summary
            .per_source
            .iter()
            .map(|(source, count)| format!("{source}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        info!("Parsing complete - {per_source}, Total: {}", records.len());

        (records, summary)
    }

    /// All queries run together; results come back in input order.
    pub async fn aggregate_many(&self, queries: &[String]) -> Vec<(String, Vec<ProductRecord>)> {
        join_all(queries.iter().map(|query| async move {
            (query.clone(), self.aggregate(query).await)
        }))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_totals() {
        let summary = AggregationSummary {
            per_source: vec![(Source::Amazon, 3), (Source::Ebay, 2)],
        };
        assert_eq!(summary.total(), 5);
        assert_eq!(summary.count_for(Source::Ebay), 2);
    }

    #[tokio::test]
    async fn test_no_clients_is_empty() {
        let aggregator = Aggregator::new(Vec::new());
        let (records, summary) = aggregator.aggregate_with_summary("anything").await;
        assert!(records.is_empty());
        assert_eq!(summary.total(), 0);
    }
}
