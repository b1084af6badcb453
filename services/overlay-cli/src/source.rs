//! Where grid packs are read from.

use anyhow::{anyhow, bail, Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use storage::{FileFetcher, GridCache, GridFetcher, HttpFetcher, LoaderConfig};

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// A directory holding `manifest.json` and the hour files
    Dir(PathBuf),
    /// Base URL the manifest path is resolved against
    Url(String),
}

impl DataSource {
    /// Pick a source from the CLI options; a directory wins over a URL.
    pub fn from_args(dir: Option<PathBuf>, url: Option<String>) -> Result<Self> {
        match (dir, url) {
            (Some(dir), _) => Ok(Self::Dir(dir)),
            (None, Some(url)) => Ok(Self::Url(url)),
            (None, None) => bail!("No grid pack given; pass --data-dir or --data-url"),
        }
    }

    /// Build a grid cache reading from this source.
    pub fn open(&self, config: LoaderConfig) -> Result<GridCache> {
        let (fetcher, config): (Arc<dyn GridFetcher>, LoaderConfig) = match self {
            Self::Dir(dir) => {
                if !dir.is_dir() {
                    bail!("Grid pack directory {} does not exist", dir.display());
                }
                (Arc::new(FileFetcher::new(dir.clone())), config)
            }
            Self::Url(url) => {
                let config = config.with_base_url(url.clone());
                config.validate().map_err(|e| anyhow!(e))?;
                let fetcher = HttpFetcher::new(&config).context("Failed to build HTTP client")?;
                (Arc::new(fetcher), config)
            }
        };

        info!(source = %self, "Opened grid pack");
        Ok(GridCache::new(fetcher, config))
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dir(dir) => write!(f, "{}", dir.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}
