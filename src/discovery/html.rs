//! PDF anchor extraction from HTML pages

use scraper::{Html, Selector};
use std::collections::BTreeSet;
use tracing::debug;

use super::is_pdf_link;
use crate::errors::DiscoveryError;
use crate::fetcher::Fetcher;

/// PDF anchors of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfLinks {
    /// Location the page was served from, after redirects; relative links resolve against it
    pub page_url: String,
    pub links: BTreeSet<String>,
}

/// Fetch a page and return the `href` of every anchor pointing at a PDF
pub async fn scrape_pdf_links<F: Fetcher + ?Sized>(
    fetcher: &F,
    url: &str,
) -> Result<PdfLinks, DiscoveryError> {
    let fetched = fetcher.get(url).await?;
    let page = String::from_utf8_lossy(&fetched.body);
    let links = extract_pdf_links(&page, &fetched.final_url)?;
    debug!("Found {} PDF links in {}", links.len(), fetched.final_url);
    Ok(PdfLinks {
        page_url: fetched.final_url,
        links,
    })
}

/// Anchor targets ending in `.pdf`, verbatim. Anchors without an `href` are ignored.
pub fn extract_pdf_links(html: &str, url: &str) -> Result<BTreeSet<String>, DiscoveryError> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a").map_err(|e| DiscoveryError::Html {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    Ok(document
        .select(&anchors)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| is_pdf_link(href))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::StaticFetcher;

    #[test]
    fn test_extracts_only_pdf_anchors() {
        let html = r#"<html><body>
            <a href="/a/x.pdf">X</a>
            <a href="/a/y.html">Y</a>
            <a href="//cdn/z.pdf">Z</a>
            <a name="top">no href</a>
        </body></html>"#;

        let links = extract_pdf_links(html, "https://docs.example.com/a/").unwrap();
        let expected: BTreeSet<String> =
            ["/a/x.pdf", "//cdn/z.pdf"].iter().map(|s| s.to_string()).collect();
        assert_eq!(links, expected);
    }

    #[test]
    fn test_duplicate_anchors_collapse() {
        let html = r#"<a href="guide.pdf">one</a><p><a href=" guide.pdf ">two</a></p>"#;
        let links = extract_pdf_links(html, "https://docs.example.com/").unwrap();
        assert_eq!(links.len(), 1);
    }

    #[tokio::test]
    async fn test_scrape_reports_redirected_location() {
        let fetcher = StaticFetcher::new()
            .with_redirect(
                "https://docs.example.com/ec2/index.html",
                "https://docs.example.com/ec2/latest/userguide/index.html",
            )
            .with(
                "https://docs.example.com/ec2/latest/userguide/index.html",
                r#"<a href="ec2-ug.pdf">guide</a>"#,
            );

        let scraped = scrape_pdf_links(&fetcher, "https://docs.example.com/ec2/index.html")
            .await
            .unwrap();

        assert_eq!(
            scraped.page_url,
            "https://docs.example.com/ec2/latest/userguide/index.html"
        );
        assert!(scraped.links.contains("ec2-ug.pdf"));
    }

    #[tokio::test]
    async fn test_scrape_fetch_failure_is_error() {
        let fetcher = StaticFetcher::new();
        let result = scrape_pdf_links(&fetcher, "https://docs.example.com/missing.html").await;
        assert!(matches!(result, Err(DiscoveryError::Fetch(_))));
    }
}
