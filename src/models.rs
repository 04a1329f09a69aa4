use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;
use uuid::Uuid;

pub const NO_TITLE: &str = "No title";

/// Marketplace a record was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Source {
    Amazon,
    Ebay,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Amazon => "AMAZON",
            Source::Ebay => "EBAY",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw field values pulled out of one listing container, before normalisation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub sold_count: Option<u64>,
    pub view_count: Option<u64>,
    pub image_url: Option<String>,
}

/// One normalised product listing.
///
/// Built once by an extractor through [`ProductRecord::from_draft`] and never
/// mutated afterwards; fields are only reachable through getters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    id: Uuid,
    source: Source,
    title: String,
    price: f64,
    rating: Option<f64>,
    sold_count: Option<u64>,
    view_count: Option<u64>,
    image_url: Option<Url>,
    url: Url,
    parsed_at: DateTime<Utc>,
}

impl ProductRecord {
    pub fn from_draft(source: Source, url: Url, draft: ProductDraft) -> Self {
        let title = draft
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_TITLE.to_string());

        let price = draft
            .price
            .filter(|p| p.is_finite() && *p >= 0.0)
            .unwrap_or(0.0);

        let rating = draft
            .rating
            .filter(|r| r.is_finite() && (0.0..=5.0).contains(r));

        let image_url = draft
            .image_url
            .and_then(|raw| Url::parse(raw.trim()).ok())
            .filter(|u| matches!(u.scheme(), "http" | "https"));

        Self {
            id: Uuid::new_v4(),
            source,
            title,
            price,
            rating,
            sold_count: draft.sold_count,
            view_count: draft.view_count,
            image_url,
            url,
            parsed_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn rating(&self) -> Option<f64> {
        self.rating
    }

    pub fn sold_count(&self) -> Option<u64> {
        self.sold_count
    }

    pub fn view_count(&self) -> Option<u64> {
        self.view_count
    }

    pub fn image_url(&self) -> Option<&Url> {
        self.image_url.as_ref()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn parsed_at(&self) -> DateTime<Utc> {
        self.parsed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_url() -> Url {
        Url::parse("https://www.amazon.com/dp/B000TEST").unwrap()
    }

    #[test]
    fn test_empty_draft_gets_defaults() {
        let record = ProductRecord::from_draft(Source::Amazon, listing_url(), ProductDraft::default());

        assert_eq!(record.title(), NO_TITLE);
        assert_eq!(record.price(), 0.0);
        assert_eq!(record.rating(), None);
        assert_eq!(record.image_url(), None);
        assert_eq!(record.source(), Source::Amazon);
    }

    #[test]
    fn test_out_of_range_values_are_dropped() {
        let draft = ProductDraft {
            title: Some("   ".into()),
            price: Some(-3.5),
            rating: Some(7.0),
            image_url: Some("not a url".into()),
            ..Default::default()
        };
        let record = ProductRecord::from_draft(Source::Ebay, listing_url(), draft);

        assert_eq!(record.title(), NO_TITLE);
        assert_eq!(record.price(), 0.0);
        assert_eq!(record.rating(), None);
        assert_eq!(record.image_url(), None);

        let nan = ProductDraft {
            price: Some(f64::NAN),
            ..Default::default()
        };
        assert_eq!(ProductRecord::from_draft(Source::Ebay, listing_url(), nan).price(), 0.0);
    }

    #[test]
    fn test_ids_are_distinct() {
        let a = ProductRecord::from_draft(Source::Amazon, listing_url(), ProductDraft::default());
        let b = ProductRecord::from_draft(Source::Amazon, listing_url(), ProductDraft::default());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_serializes_source_tag() {
        let record = ProductRecord::from_draft(Source::Ebay, listing_url(), ProductDraft::default());
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["source"], "EBAY");
        assert_eq!(json["url"], "https://www.amazon.com/dp/B000TEST");
        assert!(json["rating"].is_null());
    }
}
