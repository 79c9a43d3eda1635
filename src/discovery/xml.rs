//! Walk of the documentation XML indexes.
//!
//! The root index lists `<service href=..>` entries. An entry pointing at an
//! HTML page is scraped for PDF anchors; any other entry has a landing-page
//! XML listing `<tile href=..>` guides, and each guide directory carries a
//! `meta-inf/guide-info.json` sidecar naming its PDF.
//!
//! A service or tile that fails is recorded in the report and the walk moves on.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, info, warn};
use url::Url;

use super::{fetch_text, html, reached_cap};
use crate::config::Config;
use crate::errors::DiscoveryError;
use crate::fetcher::Fetcher;
use crate::models::{DiscoveryReport, GuideInfo};

/// Discover guide PDFs starting from the root XML index
pub async fn crawl_docs<F: Fetcher + ?Sized>(
    fetcher: &F,
    config: &Config,
    start_page: &str,
) -> Result<DiscoveryReport, DiscoveryError> {
    let root = fetch_text(fetcher, start_page).await?;
    let services = element_hrefs(&root, start_page, "service")?;
    info!("Found {} services in {}", services.len(), start_page);

    let mut report = DiscoveryReport::new();
    for service in services {
        let href = match service {
            Ok(href) => href,
            Err(e) => {
                warn!("Skipping service entry: {}", e);
                report.record(e);
                continue;
            }
        };

        debug!("URI: {}", href);
        if let Err(e) = walk_service(fetcher, config, &href, &mut report).await {
            warn!("Skipping service {}: {}", href, e);
            report.record(e);
        }

        if reached_cap(config, &report) {
            break;
        }
    }

    info!(
        "Found {} documentation PDFs ({} entries skipped)",
        report.len(),
        report.failures.len()
    );
    Ok(report)
}

async fn walk_service<F: Fetcher + ?Sized>(
    fetcher: &F,
    config: &Config,
    href: &str,
    report: &mut DiscoveryReport,
) -> Result<(), DiscoveryError> {
    let base = &config.endpoints.docs_base_url;

    if href.contains(".html") {
        let scraped = html::scrape_pdf_links(fetcher, &absolute_url(base, href)).await?;
        for link in &scraped.links {
            report.add(resolve_link(&scraped.page_url, link));
            if reached_cap(config, report) {
                break;
            }
        }
        return Ok(());
    }

    let landing = landing_page_url(base, &config.endpoints.locale, href);
    let index = fetch_text(fetcher, &landing).await?;
    for tile in element_hrefs(&index, &landing, "tile")? {
        let found = match tile {
            Ok(tile_href) => guide_pdf_url(fetcher, base, &tile_href).await,
            Err(e) => Err(e),
        };

        match found {
            Ok(Some(pdf_url)) => {
                report.add(pdf_url);
                if reached_cap(config, report) {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Skipping tile in {}: {}", landing, e);
                report.record(e);
            }
        }
    }

    Ok(())
}

/// PDF named by a guide's sidecar, if it names one
async fn guide_pdf_url<F: Fetcher + ?Sized>(
    fetcher: &F,
    base: &str,
    tile_href: &str,
) -> Result<Option<String>, DiscoveryError> {
    let directory = guide_directory(base, tile_href)?;
    let guide_info_url = format!("{}/meta-inf/guide-info.json", directory);
    debug!("Guide info url: {}", guide_info_url);

    let fetched = fetcher.get(&guide_info_url).await?;
    let info: GuideInfo =
        serde_json::from_slice(&fetched.body).map_err(|source| DiscoveryError::Json {
            url: guide_info_url.clone(),
            source,
        })?;

    Ok(info
        .pdf
        .filter(|pdf| !pdf.trim().is_empty())
        .map(|pdf| join_path(&directory, &pdf)))
}

/// `href` of every `element` in an XML document, in document order.
///
/// Entries without a usable `href` come back as per-entry errors; only a
/// malformed document fails as a whole.
pub fn element_hrefs(
    xml: &str,
    url: &str,
    element: &str,
) -> Result<Vec<Result<String, DiscoveryError>>, DiscoveryError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut hrefs = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == element.as_bytes() =>
            {
                hrefs.push(href_attribute(&e, url, element));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DiscoveryError::Xml {
                    url: url.to_string(),
                    message: format!("error at position {}: {}", reader.buffer_position(), e),
                })
            }
        }
    }

    Ok(hrefs)
}

fn href_attribute(e: &BytesStart, url: &str, element: &str) -> Result<String, DiscoveryError> {
    let missing = || DiscoveryError::MissingAttribute {
        url: url.to_string(),
        element: element.to_string(),
        attribute: "href".to_string(),
    };
    let malformed = |message: String| DiscoveryError::Xml {
        url: url.to_string(),
        message,
    };

    let attribute = e
        .try_get_attribute("href")
        .map_err(|err| malformed(err.to_string()))?
        .ok_or_else(missing)?;
    let value = attribute
        .unescape_value()
        .map_err(|err| malformed(err.to_string()))?;

    let value = value.trim();
    if value.is_empty() {
        return Err(missing());
    }
    Ok(value.to_string())
}

/// Absolute hrefs pass through; anything else is rooted at `base`
pub fn absolute_url(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        join_path(base, href)
    }
}

/// Landing-page index of a service: `{href without query}/{locale}/landing-page.xml`
pub fn landing_page_url(base: &str, locale: &str, href: &str) -> String {
    let path = href.split('?').next().unwrap_or(href);
    let service = absolute_url(base, path);
    format!("{}/{}/landing-page.xml", service.trim_end_matches('/'), locale)
}

/// Directory containing a tile's guide, rooted at `base`
pub fn guide_directory(base: &str, tile_href: &str) -> Result<String, DiscoveryError> {
    let path = if tile_href.starts_with("http://") || tile_href.starts_with("https://") {
        Url::parse(tile_href)
            .map_err(|_| DiscoveryError::InvalidUrl {
                url: tile_href.to_string(),
            })?
            .path()
            .to_string()
    } else {
        tile_href.split(['?', '#']).next().unwrap_or(tile_href).to_string()
    };

    let directory = path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    Ok(join_path(base, directory))
}

/// Resolve a scraped anchor against the page it came from. Absolute and
/// scheme-relative links are kept verbatim.
pub fn resolve_link(page_url: &str, href: &str) -> String {
    if href.starts_with("//") || Url::parse(href).is_ok() {
        return href.to_string();
    }

    Url::parse(page_url)
        .and_then(|page| page.join(href))
        .map(String::from)
        .unwrap_or_else(|_| href.to_string())
}

/// Join with exactly one `/` between the parts
fn join_path(left: &str, right: &str) -> String {
    let left = left.trim_end_matches('/');
    let right = right.trim_start_matches('/');
    if right.is_empty() {
        left.to_string()
    } else {
        format!("{}/{}", left, right)
    }
}
