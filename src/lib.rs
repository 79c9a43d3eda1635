//! getdocs - discover and download PDF guides, whitepapers and solution
//! briefs from the documentation portal.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod fetcher;
pub mod models;
pub mod orchestrator;
pub mod sink;

pub use config::Config;
pub use errors::{DiscoveryError, FetchError, SinkError};
pub use fetcher::{Fetcher, HttpFetcher};
pub use models::{DiscoveryReport, SourceCategory};
pub use orchestrator::{CategorySummary, Orchestrator};
pub use sink::{DownloadSummary, Sink, Stored};
