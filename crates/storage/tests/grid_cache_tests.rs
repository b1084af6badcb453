//! Loader behaviour against in-memory and on-disk grid packs.

use std::sync::Arc;
use std::time::Duration;

use storage::{FetchError, FileFetcher, GridCache, LoaderConfig, LoaderError};
use test_utils::{
    example_manifest_json, hour_file, npy_bytes, CountingFetcher, GridPack, EXAMPLE_4X4,
};

fn cache_with(fetcher: Arc<CountingFetcher>) -> GridCache {
    GridCache::new(fetcher, LoaderConfig::default())
}

#[tokio::test]
async fn test_concurrent_loads_share_one_fetch() {
    let (fetcher, gate) = CountingFetcher::example().gated();
    let fetcher = Arc::new(fetcher);
    let cache = cache_with(fetcher.clone());

    let first = tokio::spawn({
        let cache = cache.clone();
        async move { cache.load_grid(3).await }
    });
    let second = tokio::spawn({
        let cache = cache.clone();
        async move { cache.load_grid(3).await }
    });
    tokio::task::yield_now().await;
    gate.open();

    let a = first.await.unwrap().unwrap();
    let b = second.await.unwrap().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(fetcher.calls(&hour_file(3)), 1);
    assert_eq!(fetcher.calls("manifest.json"), 1);
}

#[tokio::test]
async fn test_grid_is_memoized_per_hour() {
    let fetcher = Arc::new(CountingFetcher::example());
    let cache = cache_with(fetcher.clone());

    let grid = cache.load_grid(0).await.unwrap();
    assert_eq!(grid.values(), &EXAMPLE_4X4[..]);
    assert_eq!(grid.bounds().lat_max, 60.0);

    cache.load_grid(0).await.unwrap();
    cache.load_grid(1).await.unwrap();
    assert_eq!(fetcher.calls(&hour_file(0)), 1);
    assert_eq!(fetcher.calls(&hour_file(1)), 1);

    let stats = cache.stats().await;
    assert_eq!(stats.grid_entries, 2);
    assert!(stats.manifest_cached);
    assert_eq!(stats.fetches, 3);
}

#[tokio::test]
async fn test_hit_rate_counts_grid_lookups_only() {
    let cache = cache_with(Arc::new(CountingFetcher::example()));

    cache.load_grid(0).await.unwrap();
    cache.load_grid(0).await.unwrap();
    cache.load_grid(1).await.unwrap();
    cache.load_manifest().await.unwrap();

    let stats = cache.stats().await;
    assert_eq!((stats.hits, stats.misses), (1, 2));
    // hour 1 and the explicit call both found the manifest loaded
    assert_eq!((stats.manifest_hits, stats.manifest_misses), (2, 1));
    assert!((stats.hit_rate() - 100.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_unknown_hour() {
    let fetcher = Arc::new(CountingFetcher::example());
    let cache = cache_with(fetcher.clone());

    let err = cache.load_grid(42).await.unwrap_err();
    assert_eq!(err, LoaderError::HourNotFound(42));
    assert_eq!(fetcher.total_calls(), 1);
    assert_eq!(cache.stats().await.grid_entries, 0);
}

#[tokio::test]
async fn test_fetch_error_propagates_and_retry_refetches() {
    let failure = FetchError::Status {
        path: hour_file(2),
        status: 503,
    };
    let fetcher = Arc::new(CountingFetcher::example().with_error(&hour_file(2), failure.clone()));
    let cache = cache_with(fetcher.clone());

    let err = cache.load_grid(2).await.unwrap_err();
    assert_eq!(err, LoaderError::Fetch(failure));

    fetcher.set_file(&hour_file(2), npy_bytes(2, 4, 4, &EXAMPLE_4X4));
    let grid = cache.load_grid(2).await.unwrap();
    assert_eq!(grid.value_at(3, 3), Some(60.0));
    assert_eq!(fetcher.calls(&hour_file(2)), 2);
}

#[tokio::test]
async fn test_concurrent_waiters_share_failure() {
    let (fetcher, gate) = CountingFetcher::example()
        .with_file(&hour_file(1), &b"not a grid"[..])
        .gated();
    let fetcher = Arc::new(fetcher);
    let cache = cache_with(fetcher.clone());

    let a = tokio::spawn({
        let cache = cache.clone();
        async move { cache.load_grid(1).await }
    });
    let b = tokio::spawn({
        let cache = cache.clone();
        async move { cache.load_grid(1).await }
    });
    tokio::task::yield_now().await;
    gate.open();

    let a = a.await.unwrap().unwrap_err();
    let b = b.await.unwrap().unwrap_err();
    assert!(matches!(a, LoaderError::Decode { .. }));
    assert_eq!(a, b);
    assert_eq!(fetcher.calls(&hour_file(1)), 1);
}

#[tokio::test]
async fn test_shape_mismatch() {
    let fetcher = Arc::new(
        CountingFetcher::example().with_file(&hour_file(4), npy_bytes(1, 2, 8, &EXAMPLE_4X4)),
    );
    let cache = cache_with(fetcher);

    let err = cache.load_grid(4).await.unwrap_err();
    assert_eq!(
        err,
        LoaderError::ShapeMismatch {
            file: hour_file(4),
            expected: (4, 4),
            actual: (2, 8),
        }
    );
}

#[tokio::test]
async fn test_invalid_manifest() {
    let fetcher = Arc::new(CountingFetcher::new().with_file("manifest.json", "{\"version\": 1}"));
    let cache = cache_with(fetcher);

    let err = cache.load_manifest().await.unwrap_err();
    assert!(matches!(err, LoaderError::InvalidManifest(_)));
    assert!(!cache.stats().await.manifest_cached);
}

#[tokio::test]
async fn test_clear_cache_forces_refetch() {
    let fetcher = Arc::new(CountingFetcher::example());
    let cache = cache_with(fetcher.clone());

    cache.load_grid(0).await.unwrap();
    cache.clear_cache().await;

    let stats = cache.stats().await;
    assert_eq!(stats.grid_entries, 0);
    assert!(!stats.manifest_cached);

    cache.load_grid(0).await.unwrap();
    assert_eq!(fetcher.calls("manifest.json"), 2);
    assert_eq!(fetcher.calls(&hour_file(0)), 2);
}

#[tokio::test]
async fn test_fetch_timeout() {
    let (fetcher, _gate) = CountingFetcher::new()
        .with_file("manifest.json", example_manifest_json())
        .gated();
    let config = LoaderConfig::default().with_fetch_timeout(Duration::from_millis(20));
    let cache = GridCache::new(Arc::new(fetcher), config);

    let err = cache.load_manifest().await.unwrap_err();
    assert_eq!(
        err,
        LoaderError::Fetch(FetchError::Timeout {
            path: "manifest.json".to_string()
        })
    );
}

#[tokio::test]
async fn test_file_fetcher_pack() {
    let pack = GridPack::example();
    let cache = GridCache::new(
        Arc::new(FileFetcher::new(pack.path())),
        LoaderConfig::default(),
    );

    let manifest = cache.load_manifest().await.unwrap();
    assert_eq!(manifest.hour_indices().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);

    let grid = cache.load_grid(5).await.unwrap();
    assert_eq!(grid.value_at(3, 3), Some(65.0));

    let err = cache.load_grid(6).await.unwrap_err();
    assert_eq!(err, LoaderError::HourNotFound(6));
}
