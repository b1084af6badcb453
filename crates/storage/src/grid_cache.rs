//! Memoizing loader for the forecast manifest and per-hour grids.
//!
//! Each entry holds a shared future, so callers that arrive while a load is
//! in flight await the same fetch instead of starting another. Entries that
//! settle with an error are dropped so the next call fetches again. Nothing
//! is evicted otherwise; [`GridCache::clear_cache`] drops everything.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use aq_common::{Grid, GridManifest};

use crate::config::LoaderConfig;
use crate::error::{FetchError, LoaderError, LoaderResult};
use crate::fetch::GridFetcher;

type SharedLoad<T> = Shared<BoxFuture<'static, LoaderResult<Arc<T>>>>;

/// A memoized load tagged with the attempt that created it.
struct Entry<T> {
    attempt: u64,
    load: SharedLoad<T>,
}

impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            attempt: self.attempt,
            load: self.load.clone(),
        }
    }
}

/// Statistics for the grid cache
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CacheStats {
    /// Fetches issued to the underlying fetcher
    pub fetches: u64,
    /// Grid lookups served from memory
    pub hits: u64,
    /// Grid lookups that started a load
    pub misses: u64,
    pub manifest_hits: u64,
    pub manifest_misses: u64,
    /// Hours with a memoized (possibly in-flight) grid
    pub grid_entries: usize,
    pub manifest_cached: bool,
}

impl CacheStats {
    /// Percentage of grid lookups served from memory; manifest lookups are not counted.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

#[derive(Default)]
struct Counters {
    fetches: AtomicU64,
    grid_hits: AtomicU64,
    grid_misses: AtomicU64,
    manifest_hits: AtomicU64,
    manifest_misses: AtomicU64,
    attempts: AtomicU64,
}

/// Loader for one grid pack.
///
/// Cloning is cheap and every clone shares the same memoized state.
#[derive(Clone)]
pub struct GridCache {
    fetcher: Arc<dyn GridFetcher>,
    config: Arc<LoaderConfig>,
    manifest: Arc<Mutex<Option<Entry<GridManifest>>>>,
    grids: Arc<Mutex<HashMap<u32, Entry<Grid>>>>,
    counters: Arc<Counters>,
}

impl GridCache {
    pub fn new(fetcher: Arc<dyn GridFetcher>, config: LoaderConfig) -> Self {
        Self {
            fetcher,
            config: Arc::new(config),
            manifest: Arc::new(Mutex::new(None)),
            grids: Arc::new(Mutex::new(HashMap::new())),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load the manifest, fetching it at most once until cleared or failed.
    #[instrument(skip(self))]
    pub async fn load_manifest(&self) -> LoaderResult<Arc<GridManifest>> {
        let entry = {
            let mut slot = self.manifest.lock().await;
            match slot.as_ref() {
                Some(entry) => {
                    self.counters.manifest_hits.fetch_add(1, Ordering::Relaxed);
                    debug!("Manifest cache hit");
                    entry.clone()
                }
                None => {
                    self.counters.manifest_misses.fetch_add(1, Ordering::Relaxed);
                    let entry = Entry {
                        attempt: self.next_attempt(),
                        load: self.clone().fetch_manifest().boxed().shared(),
                    };
                    *slot = Some(entry.clone());
                    entry
                }
            }
        };

        let result = entry.load.await;
        if result.is_err() {
            let mut slot = self.manifest.lock().await;
            if slot.as_ref().map(|e| e.attempt) == Some(entry.attempt) {
                *slot = None;
            }
        }
        result
    }

    /// Load and decode the grid for one forecast hour.
    #[instrument(skip(self))]
    pub async fn load_grid(&self, hour_index: u32) -> LoaderResult<Arc<Grid>> {
        let entry = {
            let mut grids = self.grids.lock().await;
            match grids.get(&hour_index) {
                Some(entry) => {
                    self.counters.grid_hits.fetch_add(1, Ordering::Relaxed);
                    debug!(hour_index, "Grid cache hit");
                    entry.clone()
                }
                None => {
                    self.counters.grid_misses.fetch_add(1, Ordering::Relaxed);
                    let entry = Entry {
                        attempt: self.next_attempt(),
                        load: self.clone().fetch_grid(hour_index).boxed().shared(),
                    };
                    grids.insert(hour_index, entry.clone());
                    entry
                }
            }
        };

        let result = entry.load.await;
        if result.is_err() {
            let mut grids = self.grids.lock().await;
            if grids.get(&hour_index).map(|e| e.attempt) == Some(entry.attempt) {
                grids.remove(&hour_index);
            }
        }
        result
    }

    /// Drop the memoized manifest and every memoized grid.
    ///
    /// Loads already in flight still complete for their callers but are
    /// not retained.
    pub async fn clear_cache(&self) {
        *self.manifest.lock().await = None;
        self.grids.lock().await.clear();
        info!("Cleared grid cache");
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            fetches: self.counters.fetches.load(Ordering::Relaxed),
            hits: self.counters.grid_hits.load(Ordering::Relaxed),
            misses: self.counters.grid_misses.load(Ordering::Relaxed),
            manifest_hits: self.counters.manifest_hits.load(Ordering::Relaxed),
            manifest_misses: self.counters.manifest_misses.load(Ordering::Relaxed),
            grid_entries: self.grids.lock().await.len(),
            manifest_cached: self.manifest.lock().await.is_some(),
        }
    }

    fn next_attempt(&self) -> u64 {
        self.counters.attempts.fetch_add(1, Ordering::Relaxed)
    }

    async fn fetch_bytes(&self, path: &str) -> Result<bytes::Bytes, FetchError> {
        self.counters.fetches.fetch_add(1, Ordering::Relaxed);
        match tokio::time::timeout(self.config.fetch_timeout, self.fetcher.fetch(path)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                path: path.to_string(),
            }),
        }
    }

    async fn fetch_manifest(self) -> LoaderResult<Arc<GridManifest>> {
        let bytes = self.fetch_bytes(&self.config.manifest_path).await?;
        let manifest = GridManifest::from_json(&bytes)?;
        info!(
            variable = %manifest.variable,
            hours = manifest.hours.len(),
            rows = manifest.meta.rows,
            cols = manifest.meta.cols,
            "Loaded grid manifest"
        );
        Ok(Arc::new(manifest))
    }

    async fn fetch_grid(self, hour_index: u32) -> LoaderResult<Arc<Grid>> {
        let manifest = self.load_manifest().await?;
        let hour = manifest
            .hour(hour_index)
            .ok_or(LoaderError::HourNotFound(hour_index))?;

        let bytes = self.fetch_bytes(&hour.file).await?;
        let decoded = npy_parser::decode(&bytes).map_err(|source| LoaderError::Decode {
            file: hour.file.clone(),
            source,
        })?;

        let meta = manifest.grid_meta();
        if (decoded.rows, decoded.cols) != (meta.rows, meta.cols) {
            return Err(LoaderError::ShapeMismatch {
                file: hour.file.clone(),
                expected: (meta.rows, meta.cols),
                actual: (decoded.rows, decoded.cols),
            });
        }

        let grid = Grid::new(meta, decoded.values)?;
        debug!(hour_index, file = %hour.file, "Decoded grid");
        Ok(Arc::new(grid))
    }
}
