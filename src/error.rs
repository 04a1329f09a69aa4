//! Error types for the fetch and extract seams.
//!
//! Neither ever escapes a source client: fetch errors collapse into "no markup"
//! and extract errors drop the single listing they came from.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("search query is empty")]
    EmptyQuery,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request timed out after {timeout:?}: {url}")]
    Timeout { url: String, timeout: Duration },

    #[error("request blocked by source (status {status}): {url}")]
    Blocked { url: String, status: u16 },

    #[error("request failed with status {status}: {url}")]
    Status { url: String, status: u16 },

    #[error("cannot connect to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("invalid CSS selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("listing url '{url}' is not a valid absolute url: {reason}")]
    InvalidUrl { url: String, reason: String },
}

pub type ExtractResult<T> = Result<T, ExtractError>;
