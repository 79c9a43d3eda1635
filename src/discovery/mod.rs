//! Discovery of document URLs for each source category.
//!
//! Catalog categories are listed through the paged search API, the service
//! documentation is found by walking the XML landing-page indexes.

use tracing::info;

use crate::config::Config;
use crate::errors::DiscoveryError;
use crate::fetcher::Fetcher;
use crate::models::{DiscoveryReport, SourceCategory};

pub mod catalog;
pub mod html;
pub mod xml;

/// Maximum number of URLs any discovery returns in test mode
pub const TEST_MODE_CAP: usize = 5;

/// Discover every document URL of one category
pub async fn discover<F: Fetcher + ?Sized>(
    fetcher: &F,
    config: &Config,
    category: SourceCategory,
) -> Result<DiscoveryReport, DiscoveryError> {
    info!("Generating {} PDF list (this may take some time)", category.as_str());

    match category.catalog_source() {
        Some(source) => catalog::list_catalog(fetcher, config, &source).await,
        None => xml::crawl_docs(fetcher, config, &config.endpoints.docs_start_page()).await,
    }
}

/// True once a test-mode run has collected enough URLs
pub(crate) fn reached_cap(config: &Config, report: &DiscoveryReport) -> bool {
    config.test_mode && report.len() >= TEST_MODE_CAP
}

/// Whether a link's path (query and fragment ignored) names a PDF file
pub fn is_pdf_link(href: &str) -> bool {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.to_ascii_lowercase().ends_with(".pdf")
}

pub(crate) async fn fetch_text<F: Fetcher + ?Sized>(
    fetcher: &F,
    url: &str,
) -> Result<String, DiscoveryError> {
    let fetched = fetcher.get(url).await?;
    Ok(String::from_utf8_lossy(&fetched.body).into_owned())
}
