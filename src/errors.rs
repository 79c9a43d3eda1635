//! Error types for fetching, discovery and the document sink

use std::path::PathBuf;
use thiserror::Error;

/// Failure to retrieve a single URL
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request for {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Failure while discovering document URLs.
///
/// Returned as `Err` for listing pages and root indexes; collected into
/// [`crate::models::DiscoveryReport::failures`] for individual items.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to parse JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse XML from {url}: {message}")]
    Xml { url: String, message: String },

    #[error("Failed to parse HTML from {url}: {message}")]
    Html { url: String, message: String },

    #[error("Item from {url} has no '{field}' field")]
    MissingField { url: String, field: String },

    #[error("<{element}> in {url} has no '{attribute}' attribute")]
    MissingAttribute {
        url: String,
        element: String,
        attribute: String,
    },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Failure to store a single document
#[derive(Error, Debug)]
pub enum SinkError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{url} does not resolve to a PDF")]
    NotPdf { url: String },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },
}
