//! Source clients: one fetcher plus one extractor behind a uniform contract.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::archiver;
use crate::config::Config;
use crate::error::ExtractResult;
use crate::extract::{AmazonExtractor, EbayExtractor, Extractor};
use crate::fetcher::{HttpFetcher, MarkupFetcher};
use crate::models::{ProductRecord, Source};

/// Fetches and extracts listings for one marketplace. Never fails: problems
/// end up in the logs and as an empty list.
#[async_trait]
pub trait SourceClient: Send + Sync {
    fn source(&self) -> Source;

    async fn fetch(&self, query: &str) -> Vec<ProductRecord>;
}

pub struct MarketplaceClient {
    fetcher: Arc<dyn MarkupFetcher>,
    extractor: Arc<dyn Extractor>,
    debug_dir: Option<PathBuf>,
}

impl MarketplaceClient {
    pub fn new(fetcher: Arc<dyn MarkupFetcher>, extractor: Arc<dyn Extractor>) -> Self {
        Self {
            fetcher,
            extractor,
            debug_dir: None,
        }
    }

    /// Dump every fetched page into `dir` before extraction.
    pub fn with_debug_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.debug_dir = dir;
        self
    }

    pub fn amazon(config: &Config) -> ExtractResult<Self> {
        let settings = &config.amazon;
        let fetcher = HttpFetcher::amazon(settings.search_template.clone())
            .with_timeout(config.request_timeout)
            .with_proxy(config.proxy.clone());
        let extractor = AmazonExtractor::with_domain(settings.domain.clone())?;

        Ok(Self::new(Arc::new(fetcher), Arc::new(extractor))
            .with_debug_dir(config.debug_html_dir.clone()))
    }

    pub fn ebay(config: &Config) -> ExtractResult<Self> {
        let settings = &config.ebay;
        let fetcher = HttpFetcher::ebay(settings.search_template.clone())
            .with_timeout(config.request_timeout)
            .with_proxy(config.proxy.clone());
        let extractor = EbayExtractor::with_domain(settings.domain.clone())?;

        Ok(Self::new(Arc::new(fetcher), Arc::new(extractor))
            .with_debug_dir(config.debug_html_dir.clone()))
    }
}

#[async_trait]
impl SourceClient for MarketplaceClient {
    fn source(&self) -> Source {
        self.extractor.source()
    }

    async fn fetch(&self, query: &str) -> Vec<ProductRecord> {
        let source = self.source();

        let Some(markup) = self.fetcher.fetch(query).await else {
            error!(%source, "Failed to get response for '{query}'");
            return Vec::new();
        };

        if let Some(dir) = &self.debug_dir {
            let path = dir.join(format!("{}_debug.html", source.as_str().to_lowercase()));
            match archiver::dump_markup(&markup, &path) {
                Ok(()) => info!(%source, "HTML content saved to {} for debugging", path.display()),
                Err(e) => error!(%source, "Failed to save debug HTML: {e:#}"),
            }
        }

        let records = self.extractor.extract(&markup);
        if records.is_empty() {
            warn!(%source, "No products found for search term: {query}");
        } else {
            info!(%source, "Successfully parsed {} products for search term: {query}", records.len());
        }
        records
    }
}
