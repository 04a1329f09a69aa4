use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use url::Url;

use crate::extract::amazon::AMAZON_DOMAIN;
use crate::extract::ebay::EBAY_DOMAIN;
use crate::fetcher::{DEFAULT_TIMEOUT, QUERY_PLACEHOLDER};

pub const DEFAULT_AMAZON_URL: &str = "https://www.amazon.com/s?k={query}";
pub const DEFAULT_EBAY_URL: &str = "https://www.ebay.com/sch/i.html?_nkw={query}";

/// Search template plus the domain relative links resolve against.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub search_template: String,
    pub domain: Url,
}

impl SourceSettings {
    /// The domain is the template's origin, or `fallback_domain` when the
    /// template does not parse as a URL.
    pub fn from_template(template: impl Into<String>, fallback_domain: &str) -> Result<Self> {
        let search_template = template.into();
        let probe = search_template.replace(QUERY_PLACEHOLDER, "");
        let domain = match Url::parse(&probe) {
            Ok(url) if url.has_host() => Url::parse(&url.origin().ascii_serialization())?,
            _ => Url::parse(fallback_domain)
                .with_context(|| format!("Invalid fallback domain {fallback_domain}"))?,
        };
        Ok(Self {
            search_template,
            domain,
        })
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub amazon: SourceSettings,
    pub ebay: SourceSettings,
    pub request_timeout: Duration,
    pub proxy: Option<String>,
    pub debug_html_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let request_timeout = match env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.parse()
                    .context("REQUEST_TIMEOUT_SECS must be a valid number")?,
            ),
            Err(_) => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            amazon: SourceSettings::from_template(
                env::var("AMAZON_URL").unwrap_or_else(|_| DEFAULT_AMAZON_URL.to_string()),
                AMAZON_DOMAIN,
            )
            .context("AMAZON_URL is not usable")?,
            ebay: SourceSettings::from_template(
                env::var("EBAY_URL").unwrap_or_else(|_| DEFAULT_EBAY_URL.to_string()),
                EBAY_DOMAIN,
            )
            .context("EBAY_URL is not usable")?,
            request_timeout,
            proxy: env::var("HTTP_PROXY_URL").ok().filter(|p| !p.trim().is_empty()),
            debug_html_dir: env::var("DEBUG_HTML_DIR").ok().map(PathBuf::from),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            amazon: SourceSettings {
                search_template: DEFAULT_AMAZON_URL.to_string(),
                domain: Url::parse(AMAZON_DOMAIN).expect("static domain"),
            },
            ebay: SourceSettings {
                search_template: DEFAULT_EBAY_URL.to_string(),
                domain: Url::parse(EBAY_DOMAIN).expect("static domain"),
            },
            request_timeout: DEFAULT_TIMEOUT,
            proxy: None,
            debug_html_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_comes_from_template_origin() {
        let settings =
            SourceSettings::from_template("https://www.amazon.co.uk/s?k={query}", AMAZON_DOMAIN)
                .unwrap();
        assert_eq!(settings.domain.as_str(), "https://www.amazon.co.uk/");
    }

    #[test]
    fn test_unparseable_template_uses_fallback_domain() {
        let settings = SourceSettings::from_template("{query}", EBAY_DOMAIN).unwrap();
        assert_eq!(settings.domain.as_str(), "https://www.ebay.com/");
        assert_eq!(settings.search_template, "{query}");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.proxy.is_none());
        assert_eq!(config.amazon.search_template, DEFAULT_AMAZON_URL);
    }
}
