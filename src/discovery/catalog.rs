//! Catalog search API pagination

use tracing::{debug, info, warn};
use url::Url;

use super::reached_cap;
use crate::config::Config;
use crate::errors::DiscoveryError;
use crate::fetcher::Fetcher;
use crate::models::{CatalogPage, CatalogSource, DiscoveryReport};

/// Number of pages to request for a result set: `total_hits / page_size + 1`
pub fn page_count(total_hits: u64, page_size: u32) -> u64 {
    total_hits / u64::from(page_size.max(1)) + 1
}

/// Search URL for one page of a catalog directory
pub fn page_url(
    search_url: &str,
    source: &CatalogSource,
    page_size: u32,
    page: u64,
) -> Result<String, DiscoveryError> {
    let mut url = Url::parse(search_url).map_err(|_| DiscoveryError::InvalidUrl {
        url: search_url.to_string(),
    })?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("item.directoryId", source.directory_id)
            .append_pair("sort_by", source.sort_by)
            .append_pair("sort_order", source.sort_order)
            .append_pair("size", &page_size.to_string())
            .append_pair("item.locale", "en_US");
        if let Some(tags) = source.tags {
            query.append_pair("tags.id", tags);
        }
        query.append_pair("page", &page.to_string());
    }

    Ok(url.into())
}

/// Collect the configured field of every item across all catalog pages.
///
/// A page that cannot be fetched or decoded aborts the listing; an item
/// without the field is recorded in the report and skipped.
pub async fn list_catalog<F: Fetcher + ?Sized>(
    fetcher: &F,
    config: &Config,
    source: &CatalogSource,
) -> Result<DiscoveryReport, DiscoveryError> {
    let search_url = &config.endpoints.catalog_search_url;
    let mut report = DiscoveryReport::new();

    let first_url = page_url(search_url, source, config.page_size, 0)?;
    let first = fetch_page(fetcher, &first_url).await?;
    let pages = page_count(first.metadata.total_hits, config.page_size);
    info!(
        "Number of {} documents to be retrieved: {} ({} pages)",
        source.directory_id, first.metadata.total_hits, pages
    );

    if collect_items(config, source, &first_url, &first, &mut report) {
        return Ok(report);
    }

    for page in 1..pages {
        let url = page_url(search_url, source, config.page_size, page)?;
        let response = fetch_page(fetcher, &url).await?;
        if collect_items(config, source, &url, &response, &mut report) {
            break;
        }
    }

    info!(
        "Found {} {} documents ({} items skipped)",
        report.len(),
        source.directory_id,
        report.failures.len()
    );
    Ok(report)
}

async fn fetch_page<F: Fetcher + ?Sized>(
    fetcher: &F,
    url: &str,
) -> Result<CatalogPage, DiscoveryError> {
    debug!("Fetching catalog page: {}", url);
    let fetched = fetcher.get(url).await?;
    serde_json::from_slice(&fetched.body).map_err(|source| DiscoveryError::Json {
        url: url.to_string(),
        source,
    })
}

/// Returns true when the test-mode cap was reached
fn collect_items(
    config: &Config,
    source: &CatalogSource,
    page_url: &str,
    page: &CatalogPage,
    report: &mut DiscoveryReport,
) -> bool {
    for entry in &page.items {
        match entry.item.field(source.field) {
            Some(url) => {
                debug!("URL to be added to pdf list: {}", url);
                report.add(url);
                if reached_cap(config, report) {
                    return true;
                }
            }
            None => {
                warn!("Catalog item from {} has no {} field, skipping", page_url, source.field);
                report.record(DiscoveryError::MissingField {
                    url: page_url.to_string(),
                    field: source.field.to_string(),
                });
            }
        }
    }
    false
}
