//! eBay search results.
//!
//! Cards are `div.su-card-container`. eBay item ids have no public URL form we
//! can rebuild, so a card without a resolvable link is dropped.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use super::{
    Extractor, SelectorChain, compile_selector, parse_first_integer, parse_stripped_price,
    resolve_url,
};
use crate::error::{ExtractError, ExtractResult};
use crate::models::{ProductDraft, ProductRecord, Source};

pub const EBAY_DOMAIN: &str = "https://www.ebay.com";

/// Star icons rendered per rating widget.
pub const RATING_ICONS: usize = 5;

const CONTAINER: &str = "div.su-card-container";
const LINK: &[&str] = &["a.s-card__link", "a.s-item__link"];
const TITLE: &[&str] = &[
    "div.s-card__title span.su-styled-text.primary.default",
    "span.su-styled-text.primary.default",
    ".s-item__title span",
];
const PRICE: &[&str] = &["span.s-card__price", "span.s-item__price"];
const RATING: &[&str] = &["div.x-star-rating"];
const REVIEWS: &[&str] = &["span.s-card__reviews-count", "span.s-item__reviews-count"];
const IMAGE: &[&str] = &["img.s-card__image", "img.s-item__image-img"];

pub struct EbayExtractor {
    domain: Url,
    container: Selector,
    link: SelectorChain,
    title: SelectorChain,
    price: SelectorChain,
    rating: SelectorChain,
    star_icon: Selector,
    reviews: SelectorChain,
    image: SelectorChain,
}

impl EbayExtractor {
    pub fn new() -> ExtractResult<Self> {
        let domain = Url::parse(EBAY_DOMAIN).map_err(|e| ExtractError::InvalidUrl {
            url: EBAY_DOMAIN.to_string(),
            reason: e.to_string(),
        })?;
        Self::with_domain(domain)
    }

    pub fn with_domain(domain: Url) -> ExtractResult<Self> {
        Ok(Self {
            domain,
            container: compile_selector(CONTAINER)?,
            link: SelectorChain::compile(LINK)?,
            title: SelectorChain::compile(TITLE)?,
            price: SelectorChain::compile(PRICE)?,
            rating: SelectorChain::compile(RATING)?,
            star_icon: compile_selector("svg.icon--16")?,
            reviews: SelectorChain::compile(REVIEWS)?,
            image: SelectorChain::compile(IMAGE)?,
        })
    }

    /// Filled stars in the card's rating widget.
    ///
    /// `None` when there is no widget, the icon group is not 1..=5 icons, or
    /// nothing is filled.
    fn rating(&self, card: &ElementRef) -> Option<f64> {
        let widget = self.rating.first(card)?;
        let icons: Vec<ElementRef> = widget.select(&self.star_icon).collect();
        if icons.is_empty() || icons.len() > RATING_ICONS {
            warn!("Unexpected rating widget with {} icons", icons.len());
            return None;
        }

        let filled = icons
            .iter()
            .filter(|icon| icon.html().contains("star-filled"))
            .count();
        (filled > 0).then_some(filled as f64)
    }

    fn extract_card(&self, card: &ElementRef) -> Option<ProductRecord> {
        let url = self
            .link
            .attrs(card, "href")
            .find_map(|href| resolve_url(href, &self.domain))?;

        let title = self.title.first_text(card);
        if title.is_none() {
            warn!("Could not find title for {url}");
        }

        let price = self
            .price
            .first_text(card)
            .and_then(|label| parse_stripped_price(&label));
        if price.is_none() {
            warn!("Could not parse price for {url}");
        }

        let view_count = self
            .reviews
            .first_text(card)
            .and_then(|label| parse_first_integer(&label));

        let image_url = self
            .image
            .attrs(card, "src")
            .chain(self.image.attrs(card, "data-src"))
            .next()
            .map(str::to_string);

        let draft = ProductDraft {
            title,
            price,
            rating: self.rating(card),
            sold_count: None,
            view_count,
            image_url,
        };
        Some(ProductRecord::from_draft(Source::Ebay, url, draft))
    }
}

impl Extractor for EbayExtractor {
    fn source(&self) -> Source {
        Source::Ebay
    }

    fn extract(&self, markup: &str) -> Vec<ProductRecord> {
        let document = Html::parse_document(markup);
        let cards: Vec<ElementRef> = document.select(&self.container).collect();

        let records: Vec<ProductRecord> = cards
            .iter()
            .enumerate()
            .filter_map(|(index, card)| {
                let record = self.extract_card(card);
                if record.is_none() {
                    debug!("Skipping card {index} without product link");
                }
                record
            })
            .collect();

        info!(
            source = %Source::Ebay,
            "Extracted {} products from {} cards",
            records.len(),
            cards.len()
        );
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stars(filled: usize, total: usize) -> String {
        let icons: String = (0..total)
            .map(|i| {
                let kind = if i < filled { "star-filled" } else { "star-empty" };
                format!(r##"<svg class="icon icon--16"><use href="#icon-{kind}-16"></use></svg>"##)
            })
            .collect();
        format!(r#"<div class="x-star-rating">{icons}</div>"#)
    }

    fn card(href: Option<&str>, inner: &str) -> String {
        let link = href
            .map(|h| format!(r#"<a class="s-card__link" href="{h}"></a>"#))
            .unwrap_or_default();
        format!(r#"<div class="su-card-container">{link}{inner}</div>"#)
    }

    fn page(cards: &[String]) -> String {
        format!("<html><body><ul class=\"srp-results\">{}</ul></body></html>", cards.concat())
    }

    #[test]
    fn test_extracts_full_card() {
        let inner = format!(
            r#"<img class="s-card__image" src="https://i.ebayimg.com/images/g/abc/s-l500.webp">
               <div class="s-card__title"><span class="su-styled-text primary default">Vintage Camera</span></div>
               <span class="su-styled-text primary bold large-1 s-card__price">$1,149.00</span>
               {}
               <span class="s-card__reviews-count">(1,208)</span>"#,
            stars(4, 5)
        );
        let extractor = EbayExtractor::new().unwrap();
        let records = extractor.extract(&page(&[card(Some("https://www.ebay.com/itm/1234"), &inner)]));

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.source(), Source::Ebay);
        assert_eq!(record.title(), "Vintage Camera");
        assert_eq!(record.price(), 1149.0);
        assert_eq!(record.rating(), Some(4.0));
        assert_eq!(record.view_count(), Some(1208));
        assert_eq!(record.sold_count(), None);
        assert_eq!(record.url().as_str(), "https://www.ebay.com/itm/1234");
        assert!(record.image_url().is_some());
    }

    #[test]
    fn test_card_without_link_is_dropped() {
        let extractor = EbayExtractor::new().unwrap();
        let markup = page(&[
            card(None, "<span class=\"s-card__price\">$5.00</span>"),
            card(Some("javascript:void(0)"), ""),
            card(Some("/itm/42"), ""),
        ]);

        let records = extractor.extract(&markup);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url().as_str(), "https://www.ebay.com/itm/42");
    }

    #[test]
    fn test_unparseable_price_defaults_to_zero() {
        let extractor = EbayExtractor::new().unwrap();
        let markup = page(&[card(
            Some("/itm/1"),
            r#"<span class="s-card__price">See price</span>"#,
        )]);

        let records = extractor.extract(&markup);
        assert_eq!(records[0].price(), 0.0);
        assert_eq!(records[0].title(), "No title");
    }

    #[test]
    fn test_price_ranges_and_bare_fractions() {
        let extractor = EbayExtractor::new().unwrap();
        let markup = page(&[
            card(Some("/itm/1"), r#"<span class="s-card__price">$10.00 to $12.00</span>"#),
            card(Some("/itm/2"), r#"<span class="s-card__price">$.99</span>"#),
        ]);

        let prices: Vec<f64> = extractor
            .extract(&markup)
            .iter()
            .map(ProductRecord::price)
            .collect();
        assert_eq!(prices, [0.0, 0.99]);
    }

    #[test]
    fn test_rating_absent_without_widget_or_filled_stars() {
        let extractor = EbayExtractor::new().unwrap();
        let markup = page(&[
            card(Some("/itm/1"), ""),
            card(Some("/itm/2"), &stars(0, 5)),
            card(Some("/itm/3"), &stars(6, 6)),
            card(Some("/itm/4"), &stars(5, 5)),
        ]);

        let ratings: Vec<Option<f64>> = extractor
            .extract(&markup)
            .iter()
            .map(ProductRecord::rating)
            .collect();
        assert_eq!(ratings, [None, None, None, Some(5.0)]);
    }

    #[test]
    fn test_no_cards_is_empty() {
        let extractor = EbayExtractor::new().unwrap();
        assert!(extractor.extract("<html><body>Pardon our interruption</body></html>").is_empty());
    }
}
