//! Byte sources for the manifest and grid files.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument};

use crate::config::LoaderConfig;
use crate::error::FetchError;

/// Retrieves a file of the grid pack by its relative path.
#[async_trait]
pub trait GridFetcher: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Bytes, FetchError>;
}

/// Fetches files over HTTP relative to a base URL.
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(config: &LoaderConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                path: config.base_url.clone(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn classify(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            path: url.to_string(),
        }
    } else {
        FetchError::Transport {
            path: url.to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl GridFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, path: &str) -> Result<Bytes, FetchError> {
        let url = self.url_for(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| classify(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                path: url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| classify(&url, e))?;
        debug!(size = body.len(), "Fetched over HTTP");
        Ok(body)
    }
}

/// Reads files from a local directory, e.g. an unpacked grid pack.
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` under the root, refusing anything that would leave it.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        let inside = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        inside.then(|| self.root.join(relative))
    }
}

#[async_trait]
impl GridFetcher for FileFetcher {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn fetch(&self, path: &str) -> Result<Bytes, FetchError> {
        let full = self.resolve(path).ok_or_else(|| FetchError::Status {
            path: path.to_string(),
            status: 404,
        })?;

        match tokio::fs::read(&full).await {
            Ok(data) => {
                debug!(size = data.len(), "Read local file");
                Ok(Bytes::from(data))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FetchError::Status {
                path: path.to_string(),
                status: 404,
            }),
            Err(e) => Err(FetchError::Io {
                path: path.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_fetcher_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("manifest.json"), b"{}").unwrap();

        let fetcher = FileFetcher::new(dir.path());
        let bytes = fetcher.fetch("manifest.json").await.unwrap();
        assert_eq!(&bytes[..], b"{}");
    }

    #[tokio::test]
    async fn test_file_fetcher_missing_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FileFetcher::new(dir.path());
        let err = fetcher.fetch("ozone_h07.npy").await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Status {
                path: "ozone_h07.npy".to_string(),
                status: 404
            }
        );
    }

    #[tokio::test]
    async fn test_file_fetcher_refuses_parent_paths() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FileFetcher::new(dir.path().join("pack"));
        let err = fetcher.fetch("../secret").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[test]
    fn test_http_url_join() {
        let config = LoaderConfig::default().with_base_url("http://example.test/data/ozone/");
        let fetcher = HttpFetcher::new(&config).unwrap();
        assert_eq!(
            fetcher.url_for("/ozone_h00.npy"),
            "http://example.test/data/ozone/ozone_h00.npy"
        );
    }
}
