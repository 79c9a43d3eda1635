//! Writes discovered documents to a directory tree mirroring their URL paths

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use url::Url;

use crate::discovery::is_pdf_link;
use crate::errors::SinkError;
use crate::fetcher::Fetcher;

/// Result of storing one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stored {
    Downloaded { path: PathBuf, bytes: usize },
    /// Destination already existed and force was off; nothing was fetched
    Skipped { path: PathBuf },
}

/// Counts for one download pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub not_pdf: usize,
    pub failed: usize,
}

pub struct Sink<'a, F: Fetcher + ?Sized> {
    fetcher: &'a F,
    force: bool,
}

impl<'a, F: Fetcher + ?Sized> Sink<'a, F> {
    pub fn new(fetcher: &'a F, force: bool) -> Self {
        Self { fetcher, force }
    }

    /// Store every URL under `root`. A failing URL is logged and counted, never fatal.
    pub async fn store_all(&self, urls: &BTreeSet<String>, root: &Path) -> DownloadSummary {
        let mut summary = DownloadSummary::default();

        for (index, url) in urls.iter().enumerate() {
            debug!("Document {}/{}: {}", index + 1, urls.len(), url);
            match self.store(url, root).await {
                Ok(Stored::Downloaded { .. }) => summary.downloaded += 1,
                Ok(Stored::Skipped { .. }) => summary.skipped += 1,
                Err(SinkError::NotPdf { url }) => {
                    warn!("Skipping {} - not a PDF", url);
                    summary.not_pdf += 1;
                }
                Err(e) => {
                    warn!("✗ Failed to download {}: {}", url, e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Make sure the document behind `candidate` is present under `root`
    pub async fn store(&self, candidate: &str, root: &Path) -> Result<Stored, SinkError> {
        let url = self.resolve(candidate).await?;
        let path = destination_path(&url, root)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|source| SinkError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        if !self.force && path.exists() {
            info!("Skipping {} - file exists, use --force to overwrite", url);
            return Ok(Stored::Skipped { path });
        }

        info!("Downloading : {}", url);
        let fetched = self.fetcher.get(&url).await?;
        write_atomically(&path, &fetched.body).await?;
        info!("✓ Saved to : {}", path.display());

        Ok(Stored::Downloaded {
            path,
            bytes: fetched.body.len(),
        })
    }

    /// PDF URL for a candidate, following redirects when the candidate does not look like one
    async fn resolve(&self, candidate: &str) -> Result<String, SinkError> {
        let url = normalize_scheme(candidate);
        if is_pdf_link(&url) {
            return Ok(url);
        }

        let resolved = self.fetcher.final_url(&url).await?;
        if is_pdf_link(&resolved) {
            debug!("{} redirects to {}", url, resolved);
            Ok(resolved)
        } else {
            Err(SinkError::NotPdf {
                url: candidate.to_string(),
            })
        }
    }
}

/// Write through a sibling `.part` file so an interrupted write never leaves a
/// truncated document at `path`
async fn write_atomically(path: &Path, body: &[u8]) -> Result<(), SinkError> {
    let part = part_path(path);

    if let Err(source) = fs::write(&part, body).await {
        let _ = fs::remove_file(&part).await;
        return Err(SinkError::Io { path: part, source });
    }

    fs::rename(&part, path).await.map_err(|source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn part_path(path: &Path) -> PathBuf {
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    PathBuf::from(part)
}

/// Scheme-relative URLs (`//host/path`) get an explicit `http:` scheme
pub fn normalize_scheme(url: &str) -> String {
    if url.starts_with("//") {
        format!("http:{}", url)
    } else {
        url.to_string()
    }
}

/// Where a document URL lands under `root`.
///
/// Every non-empty path segment but the last becomes a directory and the last
/// one is the file name, which must name a PDF. Segments are kept
/// percent-encoded; `.` and `..` segments are dropped. Host, query and
/// fragment do not take part.
pub fn destination_path(url: &str, root: &Path) -> Result<PathBuf, SinkError> {
    let invalid = || SinkError::InvalidUrl {
        url: url.to_string(),
    };
    let parsed = Url::parse(&normalize_scheme(url)).map_err(|_| invalid())?;

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|segments| {
            segments
                .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
                .collect()
        })
        .unwrap_or_default();

    let (filename, directories) = segments.split_last().ok_or_else(invalid)?;
    if !is_pdf_link(filename) {
        return Err(SinkError::NotPdf {
            url: url.to_string(),
        });
    }

    let mut path = root.to_path_buf();
    path.extend(directories);
    path.push(filename);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::StaticFetcher;
    use tempfile::TempDir;

    const GUIDE: &str = "https://docs.example.com/svc/latest/guide.pdf";

    #[test]
    fn test_destination_path() {
        let root = Path::new("out/documentation");

        assert_eq!(
            destination_path(GUIDE, root).unwrap(),
            root.join("svc").join("latest").join("guide.pdf")
        );
        assert_eq!(
            destination_path("//cdn.example.com//a///b.pdf?x=1", root).unwrap(),
            root.join("a").join("b.pdf")
        );
        assert_eq!(
            destination_path("https://example.com/top.pdf", root).unwrap(),
            root.join("top.pdf")
        );
        assert_eq!(
            destination_path("https://example.com/a/../../etc/x.pdf", root).unwrap(),
            root.join("etc").join("x.pdf")
        );
    }

    #[test]
    fn test_destination_path_rejects() {
        let root = Path::new("out");
        assert!(matches!(
            destination_path("https://example.com/", root),
            Err(SinkError::InvalidUrl { .. })
        ));
        assert!(matches!(
            destination_path("/relative/x.pdf", root),
            Err(SinkError::InvalidUrl { .. })
        ));
        assert!(matches!(
            destination_path("https://example.com/page.html", root),
            Err(SinkError::NotPdf { .. })
        ));
    }

    #[test]
    fn test_normalize_scheme() {
        assert_eq!(
            normalize_scheme("//docs.example.com/guide.pdf"),
            "http://docs.example.com/guide.pdf"
        );
        assert_eq!(normalize_scheme(GUIDE), GUIDE);
    }

    #[tokio::test]
    async fn test_second_run_skips_without_fetching() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = StaticFetcher::new().with(GUIDE, b"%PDF-1.4".to_vec());
        let sink = Sink::new(&fetcher, false);

        let first = sink.store(GUIDE, temp_dir.path()).await.unwrap();
        let second = sink.store(GUIDE, temp_dir.path()).await.unwrap();

        let path = temp_dir.path().join("svc").join("latest").join("guide.pdf");
        assert_eq!(first, Stored::Downloaded { path: path.clone(), bytes: 8 });
        assert_eq!(second, Stored::Skipped { path: path.clone() });
        assert_eq!(fetcher.calls_to(GUIDE), 1);
        assert_eq!(std::fs::read(path).unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_force_rewrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("svc").join("latest").join("guide.pdf");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"stale").unwrap();

        let fetcher = StaticFetcher::new().with(GUIDE, b"fresh".to_vec());
        let sink = Sink::new(&fetcher, true);

        for _ in 0..2 {
            let stored = sink.store(GUIDE, temp_dir.path()).await.unwrap();
            assert!(matches!(stored, Stored::Downloaded { .. }));
        }

        assert_eq!(fetcher.calls_to(GUIDE), 2);
        assert_eq!(std::fs::read(&path).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("svc").join("latest").join("guide.pdf");
        // a directory in the way of the temporary file makes the write fail
        std::fs::create_dir_all(part_path(&path)).unwrap();

        let fetcher = StaticFetcher::new().with(GUIDE, b"%PDF-1.4".to_vec());
        let sink = Sink::new(&fetcher, false);

        let result = sink.store(GUIDE, temp_dir.path()).await;

        assert!(matches!(result, Err(SinkError::Io { .. })));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_no_part_file_left_after_download() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = StaticFetcher::new().with(GUIDE, b"%PDF-1.4".to_vec());

        Sink::new(&fetcher, false).store(GUIDE, temp_dir.path()).await.unwrap();

        let path = temp_dir.path().join("svc").join("latest").join("guide.pdf");
        assert!(path.exists());
        assert!(!part_path(&path).exists());
    }

    #[tokio::test]
    async fn test_scheme_relative_candidate_fetched_over_http() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher =
            StaticFetcher::new().with("http://docs.example.com/guide.pdf", b"pdf".to_vec());
        let sink = Sink::new(&fetcher, false);

        sink.store("//docs.example.com/guide.pdf", temp_dir.path())
            .await
            .unwrap();

        assert_eq!(fetcher.calls(), vec!["http://docs.example.com/guide.pdf".to_string()]);
        assert!(temp_dir.path().join("guide.pdf").exists());
    }

    #[tokio::test]
    async fn test_redirect_to_pdf_is_followed() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = StaticFetcher::new()
            .with_redirect(
                "https://example.com/download?id=3",
                "https://cdn.example.com/briefs/brief.pdf",
            )
            .with("https://cdn.example.com/briefs/brief.pdf", b"pdf".to_vec());
        let sink = Sink::new(&fetcher, false);

        let stored = sink
            .store("https://example.com/download?id=3", temp_dir.path())
            .await
            .unwrap();

        assert_eq!(
            stored,
            Stored::Downloaded {
                path: temp_dir.path().join("briefs").join("brief.pdf"),
                bytes: 3
            }
        );
    }

    #[tokio::test]
    async fn test_store_all_continues_past_failures() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = StaticFetcher::new()
            .with(GUIDE, b"pdf".to_vec())
            .with("https://example.com/solutions/overview.html", b"<html>".to_vec());
        let sink = Sink::new(&fetcher, false);

        let urls: BTreeSet<String> = [
            GUIDE,
            "https://example.com/missing/gone.pdf",
            "https://example.com/solutions/overview.html",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let summary = sink.store_all(&urls, temp_dir.path()).await;
        assert_eq!(
            summary,
            DownloadSummary {
                downloaded: 1,
                skipped: 0,
                not_pdf: 1,
                failed: 1
            }
        );

        let again = sink.store_all(&urls, temp_dir.path()).await;
        assert_eq!(again.skipped, 1);
        assert_eq!(again.downloaded, 0);
    }
}
