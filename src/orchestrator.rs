//! Runs discovery and download for each enabled category, one after another

use std::fmt;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::discovery;
use crate::fetcher::Fetcher;
use crate::models::SourceCategory;
use crate::sink::{DownloadSummary, Sink};

/// What happened to one category during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: SourceCategory,
    pub discovered: usize,
    pub discovery_failures: usize,
    /// `None` when listing only or when discovery failed
    pub downloads: Option<DownloadSummary>,
    pub error: Option<String>,
}

impl CategorySummary {
    fn new(category: SourceCategory) -> Self {
        Self {
            category,
            discovered: 0,
            discovery_failures: 0,
            downloads: None,
            error: None,
        }
    }
}

impl fmt::Display for CategorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.category.as_str())?;
        if let Some(error) = &self.error {
            return write!(f, "listing failed ({})", error);
        }

        write!(
            f,
            "{} discovered, {} entries skipped during discovery",
            self.discovered, self.discovery_failures
        )?;
        if let Some(d) = &self.downloads {
            write!(
                f,
                "; {} downloaded, {} already present, {} not PDF, {} failed",
                d.downloaded, d.skipped, d.not_pdf, d.failed
            )?;
        }
        Ok(())
    }
}

pub struct Orchestrator<'a, F: Fetcher + ?Sized> {
    config: &'a Config,
    fetcher: &'a F,
}

impl<'a, F: Fetcher + ?Sized> Orchestrator<'a, F> {
    pub fn new(config: &'a Config, fetcher: &'a F) -> Self {
        Self { config, fetcher }
    }

    /// Process categories in order. A category whose listing fails does not stop the others.
    pub async fn run(&self, categories: &[SourceCategory]) -> Vec<CategorySummary> {
        let mut summaries = Vec::with_capacity(categories.len());
        for &category in categories {
            summaries.push(self.run_category(category).await);
        }
        summaries
    }

    pub async fn run_category(&self, category: SourceCategory) -> CategorySummary {
        let mut summary = CategorySummary::new(category);
        info!("Downloading {}", category.as_str());

        let report = match discovery::discover(self.fetcher, self.config, category).await {
            Ok(report) => report,
            Err(e) => {
                error!("Failed to list {} documents: {}", category.as_str(), e);
                summary.error = Some(e.to_string());
                return summary;
            }
        };

        for failure in &report.failures {
            debug!("Skipped during discovery: {}", failure);
        }
        summary.discovered = report.len();
        summary.discovery_failures = report.failures.len();

        if self.config.list_only {
            for url in &report.urls {
                println!("{}", url);
            }
            return summary;
        }

        let root = self.config.category_dir(category);
        let downloads = Sink::new(self.fetcher, self.config.force)
            .store_all(&report.urls, &root)
            .await;
        info!(
            "Downloaded {} {} documents to {}",
            downloads.downloaded,
            category.as_str(),
            root.display()
        );
        summary.downloads = Some(downloads);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::catalog::page_url;
    use crate::fetcher::testing::StaticFetcher;
    use tempfile::TempDir;

    const SEARCH: &str = "https://portal.example.com/api/search";

    fn config(output: &TempDir) -> Config {
        let mut config = Config {
            output_dir: output.path().to_path_buf(),
            ..Config::default()
        };
        config.endpoints.catalog_search_url = SEARCH.to_string();
        config.endpoints.docs_base_url = "https://docs.example.com".to_string();
        config
    }

    fn whitepaper_fetcher() -> StaticFetcher {
        let source = SourceCategory::Whitepapers.catalog_source().unwrap();
        let page = serde_json::json!({
            "metadata": { "totalHits": 2 },
            "items": [
                { "item": { "additionalFields": { "primaryURL": "https://example.com/whitepapers/latest/one.pdf" } } },
                { "item": { "additionalFields": { "primaryURL": "https://example.com/whitepapers/two.pdf" } } }
            ]
        })
        .to_string();

        StaticFetcher::new()
            .with(&page_url(SEARCH, &source, 15, 0).unwrap(), page)
            .with("https://example.com/whitepapers/latest/one.pdf", b"one".to_vec())
            .with("https://example.com/whitepapers/two.pdf", b"two".to_vec())
    }

    #[tokio::test]
    async fn test_failed_category_does_not_stop_others() {
        let output = TempDir::new().unwrap();
        let config = config(&output);
        let fetcher = whitepaper_fetcher();

        let summaries = Orchestrator::new(&config, &fetcher)
            .run(&[SourceCategory::Documentation, SourceCategory::Whitepapers])
            .await;

        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].error.is_some());
        assert!(summaries[0].downloads.is_none());

        let whitepapers = &summaries[1];
        assert!(whitepapers.error.is_none());
        assert_eq!(whitepapers.discovered, 2);
        assert_eq!(whitepapers.downloads.as_ref().unwrap().downloaded, 2);

        let root = output.path().join("whitepapers");
        assert!(root.join("whitepapers").join("latest").join("one.pdf").exists());
        assert!(root.join("whitepapers").join("two.pdf").exists());
    }

    #[tokio::test]
    async fn test_list_only_downloads_nothing() {
        let output = TempDir::new().unwrap();
        let mut config = config(&output);
        config.list_only = true;
        let fetcher = whitepaper_fetcher();

        let summary = Orchestrator::new(&config, &fetcher)
            .run_category(SourceCategory::Whitepapers)
            .await;

        assert_eq!(summary.discovered, 2);
        assert!(summary.downloads.is_none());
        assert_eq!(fetcher.calls().len(), 1);
        assert!(!output.path().join("whitepapers").exists());
    }

    #[test]
    fn test_summary_display() {
        let summary = CategorySummary {
            category: SourceCategory::BuilderLibrary,
            discovered: 4,
            discovery_failures: 1,
            downloads: Some(DownloadSummary {
                downloaded: 2,
                skipped: 1,
                not_pdf: 1,
                failed: 0,
            }),
            error: None,
        };
        assert_eq!(
            summary.to_string(),
            "Builder Library: 4 discovered, 1 entries skipped during discovery; \
             2 downloaded, 1 already present, 1 not PDF, 0 failed"
        );
    }
}
