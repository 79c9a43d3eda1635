//! HTTP access behind a small trait, so discovery and the sink can be driven
//! by an in-memory double in tests.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::errors::FetchError;

/// Body and final location of a successful GET
#[derive(Debug, Clone)]
pub struct Fetched {
    /// URL after following redirects
    pub final_url: String,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET a URL, following redirects; non-success statuses are errors
    async fn get(&self, url: &str) -> Result<Fetched, FetchError>;

    /// Final URL after redirects, without keeping the body
    async fn final_url(&self, url: &str) -> Result<String, FetchError> {
        Ok(self.get(url).await?.final_url)
    }
}

/// [`Fetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(&config.http.user_agent)
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self { client })
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;

        debug!("GET {}", url);
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<Fetched, FetchError> {
        let response = self.send(url).await?;
        let final_url = response.url().to_string();
        let body = response.bytes().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

        Ok(Fetched {
            final_url,
            body: body.to_vec(),
        })
    }

    async fn final_url(&self, url: &str) -> Result<String, FetchError> {
        let response = self.send(url).await?;
        Ok(response.url().to_string())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_relative_url_is_rejected_before_sending() {
        let fetcher = HttpFetcher::new(&Config::default()).unwrap();
        let result = fetcher.get("/a/x.pdf").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }
}
