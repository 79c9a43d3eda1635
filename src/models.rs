use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

use crate::errors::DiscoveryError;

/// A group of documents published by the portal, downloaded into its own subdirectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceCategory {
    Documentation,
    Whitepapers,
    BuilderLibrary,
    Solutions,
    Events,
    Quickstarts,
    Compliance,
}

impl SourceCategory {
    pub const ALL: [SourceCategory; 7] = [
        SourceCategory::Documentation,
        SourceCategory::Whitepapers,
        SourceCategory::BuilderLibrary,
        SourceCategory::Solutions,
        SourceCategory::Events,
        SourceCategory::Quickstarts,
        SourceCategory::Compliance,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            SourceCategory::Documentation => "Documentation",
            SourceCategory::Whitepapers => "Whitepapers",
            SourceCategory::BuilderLibrary => "Builder Library",
            SourceCategory::Solutions => "Solutions",
            SourceCategory::Events => "Events",
            SourceCategory::Quickstarts => "Quick Starts",
            SourceCategory::Compliance => "Compliance",
        }
    }

    /// Name of the subdirectory under the output root
    pub fn dir_name(&self) -> &str {
        match self {
            SourceCategory::Documentation => "documentation",
            SourceCategory::Whitepapers => "whitepapers",
            SourceCategory::BuilderLibrary => "builderlibrary",
            SourceCategory::Solutions => "solutions",
            SourceCategory::Events => "events",
            SourceCategory::Quickstarts => "quickstarts",
            SourceCategory::Compliance => "compliance",
        }
    }

    /// Catalog endpoint for this category, or `None` when it is discovered by crawling
    pub fn catalog_source(&self) -> Option<CatalogSource> {
        match self {
            SourceCategory::Documentation => None,
            SourceCategory::Whitepapers => Some(CatalogSource {
                directory_id: "whitepapers",
                sort_by: "item.additionalFields.sortDate",
                sort_order: "desc",
                tags: Some("whitepapers#content-type#whitepaper"),
                field: "primaryURL",
            }),
            SourceCategory::BuilderLibrary => Some(CatalogSource {
                directory_id: "amazon-redwood",
                sort_by: "item.additionalFields.customSort",
                sort_order: "asc",
                tags: None,
                field: "downloadUrl",
            }),
            SourceCategory::Solutions => Some(CatalogSource {
                directory_id: "alias#solutions-experience",
                sort_by: "item.additionalFields.sortDate",
                sort_order: "desc",
                tags: None,
                field: "headlineUrl",
            }),
            SourceCategory::Events => Some(CatalogSource {
                directory_id: "events-content",
                sort_by: "item.additionalFields.sortDate",
                sort_order: "desc",
                tags: None,
                field: "downloadUrl",
            }),
            SourceCategory::Quickstarts => Some(CatalogSource {
                directory_id: "alias#quickstart-catalog",
                sort_by: "item.additionalFields.sortDate",
                sort_order: "desc",
                tags: None,
                field: "headlineUrl",
            }),
            SourceCategory::Compliance => Some(CatalogSource {
                directory_id: "whitepapers",
                sort_by: "item.additionalFields.sortDate",
                sort_order: "desc",
                tags: Some("whitepapers#content-type#compliance"),
                field: "primaryURL",
            }),
        }
    }
}

/// Fixed query template for one catalog directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSource {
    pub directory_id: &'static str,
    pub sort_by: &'static str,
    pub sort_order: &'static str,
    pub tags: Option<&'static str>,
    /// Key in `additionalFields` holding the download URL
    pub field: &'static str,
}

/// One page of catalog search results
#[derive(Debug, Deserialize)]
pub struct CatalogPage {
    pub metadata: CatalogMetadata,
    #[serde(default)]
    pub items: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogMetadata {
    #[serde(rename = "totalHits")]
    pub total_hits: u64,
}

#[derive(Debug, Deserialize)]
pub struct CatalogEntry {
    pub item: CatalogItem,
}

#[derive(Debug, Deserialize)]
pub struct CatalogItem {
    #[serde(rename = "additionalFields", default)]
    pub additional_fields: HashMap<String, serde_json::Value>,
}

impl CatalogItem {
    /// String value of a named field; non-string values count as missing
    pub fn field(&self, name: &str) -> Option<&str> {
        self.additional_fields.get(name).and_then(|v| v.as_str())
    }
}

/// Per-guide metadata sidecar (`meta-inf/guide-info.json`)
#[derive(Debug, Deserialize)]
pub struct GuideInfo {
    pub pdf: Option<String>,
}

/// URLs found by one discovery pass, plus the items that had to be skipped
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub urls: BTreeSet<String>,
    pub failures: Vec<DiscoveryError>,
}

impl DiscoveryReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the URL was already present
    pub fn add(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    pub fn record(&mut self, error: DiscoveryError) {
        self.failures.push(error);
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
