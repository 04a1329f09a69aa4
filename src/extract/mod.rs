//! HTML extraction for search result pages.
//!
//! Each field is read through a [`SelectorChain`]: selectors are tried in
//! order and the first non-empty match wins. The parsing rules below are pure
//! functions over strings so they can be tested without any markup.

pub mod amazon;
pub mod ebay;

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::debug;
use url::Url;

use crate::error::{ExtractError, ExtractResult};
use crate::models::{ProductRecord, Source};

pub use amazon::AmazonExtractor;
pub use ebay::EbayExtractor;

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());
static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static BOUGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*([km])?\s*\+").unwrap());

/// Turns one search results page into product records.
pub trait Extractor: Send + Sync {
    fn source(&self) -> Source;

    /// Records in the order their containers appear in `markup`.
    fn extract(&self, markup: &str) -> Vec<ProductRecord>;
}

/// Ordered CSS selector fallbacks for one field.
#[derive(Debug, Clone)]
pub struct SelectorChain {
    selectors: Vec<Selector>,
}

impl SelectorChain {
    pub fn compile(patterns: &[&str]) -> ExtractResult<Self> {
        let selectors = patterns
            .iter()
            .map(|pattern| compile_selector(pattern))
            .collect::<ExtractResult<Vec<_>>>()?;
        Ok(Self { selectors })
    }

    /// First matching element, in chain order.
    pub fn first<'a>(&self, element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.selectors
            .iter()
            .find_map(|selector| element.select(selector).next())
    }

    /// Trimmed non-empty texts of all matching elements, in chain order.
    pub fn texts<'a>(&'a self, element: &ElementRef<'a>) -> impl Iterator<Item = String> + 'a {
        let element = *element;
        self.selectors.iter().flat_map(move |selector| {
            element
                .select(selector)
                .map(|e| e.text().collect::<String>().trim().to_string())
                .filter(|text| !text.is_empty())
        })
    }

    pub fn first_text(&self, element: &ElementRef) -> Option<String> {
        self.texts(element).next()
    }

    /// Values of `attr` on matching elements, in chain order, blanks skipped.
    pub fn attrs<'a>(
        &'a self,
        element: &ElementRef<'a>,
        attr: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        let element = *element;
        self.selectors.iter().flat_map(move |selector| {
            element
                .select(selector)
                .filter_map(move |e| e.value().attr(attr))
                .map(str::trim)
                .filter(|value| !value.is_empty())
        })
    }
}

pub fn compile_selector(pattern: &str) -> ExtractResult<Selector> {
    Selector::parse(pattern).map_err(|e| ExtractError::InvalidSelector {
        selector: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Read the first decimal number out of a price label, currency symbols and
/// thousands separators dropped. Used for Amazon's offscreen price label.
pub fn parse_price_text(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    DECIMAL
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Keep only digits and `.`, then parse what is left.
///
/// Labels that do not collapse into a single number ("$10.00 to $12.00")
/// do not parse.
pub fn parse_stripped_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse::<f64>().ok()
}

/// Join a whole part and a fractional part rendered as separate fragments.
pub fn parse_split_price(whole: &str, fraction: &str) -> Option<f64> {
    let whole: String = whole
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '.')
        .collect();
    let fraction = fraction.trim();
    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let fraction = if fraction.is_empty() { "0" } else { fraction };
    format!("{whole}.{fraction}").parse().ok()
}

/// Leading numeral of an "X out of 5 stars" label.
pub fn parse_star_label(label: &str) -> Option<f64> {
    label
        .split_whitespace()
        .next()
        .and_then(|token| token.replace(',', ".").parse::<f64>().ok())
        .filter(|r| (0.0..=5.0).contains(r))
}

/// Approximate count from labels like "2K+ bought in past month".
///
/// Lossy: "1.5K+" becomes 1500 and anything without a `+` count is ignored.
pub fn parse_bought_count(label: &str) -> Option<u64> {
    if !label.to_lowercase().contains("bought") {
        return None;
    }
    let label = label.replace(',', "");
    let caps = BOUGHT.captures(&label)?;
    let base: f64 = caps.get(1)?.as_str().parse().ok()?;
    let multiplier = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(unit) if unit == "k" => 1_000.0,
        Some(unit) if unit == "m" => 1_000_000.0,
        _ => 1.0,
    };
    let value = (base * multiplier).round();
    (value.is_finite() && value >= 0.0).then_some(value as u64)
}

/// First integer in `text`, ignoring thousands separators.
pub fn parse_first_integer(text: &str) -> Option<u64> {
    let cleaned = text.replace(',', "");
    INTEGER
        .find(&cleaned)
        .and_then(|m| m.as_str().parse().ok())
}

/// Resolve an anchor href against a source's canonical domain.
///
/// Absolute http(s) links (any scheme case) pass through, root-relative links
/// are joined onto `domain`; anything else is unresolvable.
pub fn resolve_url(href: &str, domain: &Url) -> Option<Url> {
    let href = href.trim();
    if let Ok(url) = Url::parse(href) {
        return matches!(url.scheme(), "http" | "https").then_some(url);
    }
    if href.starts_with('/') && !href.starts_with("//") {
        domain.join(href).ok()
    } else {
        debug!("Unresolvable href: {href}");
        None
    }
}
