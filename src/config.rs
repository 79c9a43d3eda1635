//! Centralized configuration management for getdocs

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;
use crate::models::SourceCategory;

/// Application configuration, passed explicitly to every discovery and sink call
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory; each category gets its own subdirectory
    pub output_dir: PathBuf,
    /// Overwrite files that already exist
    pub force: bool,
    /// Catalog page size
    pub page_size: u32,
    /// Cap every discovery result at [`crate::discovery::TEST_MODE_CAP`] URLs
    pub test_mode: bool,
    /// Print discovered URLs instead of downloading them
    pub list_only: bool,
    /// Remote endpoints
    pub endpoints: Endpoints,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// Remote endpoints of the documentation portal
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Paged catalog search API
    pub catalog_search_url: String,
    /// Host serving the documentation XML indexes and guide sidecars
    pub docs_base_url: String,
    /// Locale path segment used for landing pages
    pub locale: String,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            catalog_search_url: "https://aws.amazon.com/api/dirs/items/search".to_string(),
            docs_base_url: "https://docs.aws.amazon.com".to_string(),
            locale: "en_us".to_string(),
        }
    }
}

impl Endpoints {
    /// Root XML index of the documentation crawl
    pub fn docs_start_page(&self) -> String {
        format!(
            "{}/{}/main-landing-page.xml",
            self.docs_base_url.trim_end_matches('/'),
            self.locale
        )
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            user_agent: concat!("getdocs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            force: false,
            page_size: 15,
            test_mode: false,
            list_only: false,
            endpoints: Endpoints::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Endpoints::default();
        let endpoints = Endpoints {
            catalog_search_url: std::env::var("GETDOCS_CATALOG_URL")
                .unwrap_or(defaults.catalog_search_url),
            docs_base_url: std::env::var("GETDOCS_DOCS_BASE_URL").unwrap_or(defaults.docs_base_url),
            locale: std::env::var("GETDOCS_LOCALE").unwrap_or(defaults.locale),
        };

        let http_defaults = HttpConfig::default();
        let http = HttpConfig {
            timeout_seconds: parse_env_var("GETDOCS_HTTP_TIMEOUT_SECONDS")?
                .unwrap_or(http_defaults.timeout_seconds),
            user_agent: std::env::var("GETDOCS_USER_AGENT").unwrap_or(http_defaults.user_agent),
        };

        Ok(Config {
            endpoints,
            http,
            ..Config::default()
        })
    }

    /// Merge run options given on the command line
    pub fn apply_cli(&mut self, cli: &Cli) {
        self.output_dir = PathBuf::from(&cli.base_output_dir);
        self.force = cli.force;
        self.page_size = cli.page_size;
        self.test_mode = cli.test_mode;
        self.list_only = cli.list_only;
    }

    /// Output root for one category
    pub fn category_dir(&self, category: SourceCategory) -> PathBuf {
        self.output_dir.join(category.dir_name())
    }

    /// Get output directory as string
    pub fn output_dir_str(&self) -> &str {
        self.output_dir.to_str().unwrap_or("output")
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(anyhow::anyhow!("Page size must be at least 1"));
        }

        if self.list_only {
            return Ok(());
        }

        ensure_dir(&self.output_dir)
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create output directory: {}", dir.display()))
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.output_dir_str(), "output");
        assert_eq!(config.page_size, 15);
        assert!(!config.force);
        assert!(!config.test_mode);
        assert_eq!(config.http.timeout_seconds, 60);
        assert_eq!(
            config.endpoints.docs_start_page(),
            "https://docs.aws.amazon.com/en_us/main-landing-page.xml"
        );
    }

    #[test]
    fn test_apply_cli() {
        let cli = Cli::parse_from(["getdocs", "-w", "-f", "-t", "-p", "30", "-o", "pdfs"]);
        let mut config = Config::default();
        config.apply_cli(&cli);

        assert!(config.force);
        assert!(config.test_mode);
        assert_eq!(config.page_size, 30);
        assert_eq!(
            config.category_dir(SourceCategory::Whitepapers),
            PathBuf::from("pdfs").join("whitepapers")
        );
    }

    #[test]
    fn test_config_validation() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config {
            output_dir: temp_dir.path().join("nested").join("output"),
            ..Config::default()
        };
        config.validate().unwrap();
        assert!(config.output_dir.is_dir());

        config.page_size = 0;
        assert!(config.validate().is_err());
    }
}
