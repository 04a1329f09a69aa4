//! Amazon search results.
//!
//! Every result is a `div[data-component-type="s-search-result"]` carrying the
//! ASIN in `data-asin`. Boxes without an ASIN (ads, widgets) are skipped.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use super::{
    Extractor, SelectorChain, compile_selector, parse_bought_count, parse_price_text,
    parse_split_price, parse_star_label, resolve_url,
};
use crate::error::{ExtractError, ExtractResult};
use crate::models::{ProductDraft, ProductRecord, Source};

pub const AMAZON_DOMAIN: &str = "https://www.amazon.com";

const CONTAINER: &str = r#"div[data-component-type="s-search-result"]"#;
const TITLE: &[&str] = &[
    "h2.a-size-medium span",
    "h2 span.a-text-normal",
    "h2 a span",
    "h2 span",
];
const LINK: &[&str] = &[
    "h2 a.a-link-normal",
    "a.a-link-normal.s-no-outline",
    "a.a-link-normal.s-line-clamp-2",
];
const OFFSCREEN_PRICE: &[&str] = &[
    "span.a-price:not(.a-text-price) span.a-offscreen",
    "span.a-price span.a-offscreen",
];
const RATING: &[&str] = &[
    "i.a-icon-star-small span.a-icon-alt",
    "i.a-icon-star span.a-icon-alt",
    "span.a-icon-alt",
];
const BOUGHT: &[&str] = &["span.a-size-base.a-color-secondary"];
const IMAGE: &[&str] = &["img.s-image"];

pub struct AmazonExtractor {
    domain: Url,
    container: Selector,
    title: SelectorChain,
    link: SelectorChain,
    price_whole: Selector,
    price_fraction: Selector,
    offscreen_price: SelectorChain,
    rating: SelectorChain,
    bought: SelectorChain,
    image: SelectorChain,
}

impl AmazonExtractor {
    pub fn new() -> ExtractResult<Self> {
        let domain = Url::parse(AMAZON_DOMAIN).map_err(|e| ExtractError::InvalidUrl {
            url: AMAZON_DOMAIN.to_string(),
            reason: e.to_string(),
        })?;
        Self::with_domain(domain)
    }

    /// Use `domain` for relative links and the `/dp/{asin}` fallback.
    pub fn with_domain(domain: Url) -> ExtractResult<Self> {
        Ok(Self {
            domain,
            container: compile_selector(CONTAINER)?,
            title: SelectorChain::compile(TITLE)?,
            link: SelectorChain::compile(LINK)?,
            price_whole: compile_selector("span.a-price-whole")?,
            price_fraction: compile_selector("span.a-price-fraction")?,
            offscreen_price: SelectorChain::compile(OFFSCREEN_PRICE)?,
            rating: SelectorChain::compile(RATING)?,
            bought: SelectorChain::compile(BOUGHT)?,
            image: SelectorChain::compile(IMAGE)?,
        })
    }

    /// Canonical product page for an ASIN.
    pub fn canonical_url(&self, asin: &str) -> ExtractResult<Url> {
        self.domain
            .join(&format!("/dp/{asin}"))
            .map_err(|e| ExtractError::InvalidUrl {
                url: format!("{}dp/{asin}", self.domain),
                reason: e.to_string(),
            })
    }

    /// `Ok(None)` when the box has no ASIN.
    fn extract_listing(&self, product_box: &ElementRef) -> ExtractResult<Option<ProductRecord>> {
        let Some(asin) = product_box
            .value()
            .attr("data-asin")
            .map(str::trim)
            .filter(|asin| !asin.is_empty())
        else {
            return Ok(None);
        };

        let url = match self
            .link
            .attrs(product_box, "href")
            .find_map(|href| resolve_url(href, &self.domain))
        {
            Some(url) => url,
            None => self.canonical_url(asin)?,
        };

        let title = self.title.first_text(product_box);
        if title.is_none() {
            warn!("Could not find title for ASIN {asin}");
        }

        let price = self.price(product_box);
        if price.is_none() {
            warn!("Could not parse price for ASIN {asin}");
        }

        let rating = self.rating.first_text(product_box).and_then(|label| {
            let rating = parse_star_label(&label);
            if rating.is_none() {
                warn!("Could not parse rating '{label}' for ASIN {asin}");
            }
            rating
        });

        let sold_count = self
            .bought
            .texts(product_box)
            .find(|text| text.to_lowercase().contains("bought"))
            .and_then(|text| {
                let count = parse_bought_count(&text);
                if count.is_none() {
                    debug!("Could not parse sold count '{text}' for ASIN {asin}");
                }
                count
            });

        let image_url = self
            .image
            .attrs(product_box, "src")
            .chain(self.image.attrs(product_box, "data-image-source"))
            .next()
            .map(str::to_string);

        let draft = ProductDraft {
            title,
            price,
            rating,
            sold_count,
            view_count: None,
            image_url,
        };
        Ok(Some(ProductRecord::from_draft(Source::Amazon, url, draft)))
    }

    /// Whole and fraction fragments first, then the screen-reader price label.
    fn price(&self, product_box: &ElementRef) -> Option<f64> {
        let split = || {
            let whole = product_box.select(&self.price_whole).next()?;
            let fraction = product_box.select(&self.price_fraction).next()?;
            parse_split_price(
                &whole.text().collect::<String>(),
                &fraction.text().collect::<String>(),
            )
        };

        split().or_else(|| {
            self.offscreen_price
                .first_text(product_box)
                .and_then(|label| parse_price_text(&label))
        })
    }
}

impl Extractor for AmazonExtractor {
    fn source(&self) -> Source {
        Source::Amazon
    }

    fn extract(&self, markup: &str) -> Vec<ProductRecord> {
        let document = Html::parse_document(markup);
        let boxes: Vec<ElementRef> = document.select(&self.container).collect();

        let mut records = Vec::with_capacity(boxes.len());
        for (index, product_box) in boxes.iter().enumerate() {
            match self.extract_listing(product_box) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => debug!("Skipping result box {index} without ASIN"),
                Err(e) => warn!("Error parsing result box {index}: {e}"),
            }
        }

        info!(
            source = %Source::Amazon,
            "Extracted {} products from {} result boxes",
            records.len(),
            boxes.len()
        );
        records
    }
}
