//! Tests for the ozone forecast layer's refresh ordering.

use std::sync::Arc;
use std::time::Duration;

use grid_processor::OzoneService;
use projection::Viewport;
use renderer::{LayerUpdate, OzoneForecastLayer, OzoneRenderer};
use storage::{FetchError, GridCache, LoaderConfig, LoaderError};
use test_utils::{hour_file, CountingFetcher};

fn layer_with(fetcher: Arc<CountingFetcher>) -> OzoneForecastLayer {
    let cache = GridCache::new(fetcher, LoaderConfig::default());
    OzoneForecastLayer::new(
        OzoneService::new(Arc::new(cache)),
        OzoneRenderer::default(),
    )
}

fn viewport() -> Viewport {
    Viewport::new(256, 256, 0.0, -80.0, 2.0).unwrap()
}

/// Yield until `check` holds, failing after a generous number of rounds.
async fn wait_for(check: impl Fn() -> bool) {
    for _ in 0..1000 {
        if check() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}

#[tokio::test]
async fn test_refresh_paints_grid() {
    let layer = layer_with(Arc::new(CountingFetcher::example()));

    let update = layer.refresh(0, viewport()).await.unwrap();
    assert_eq!(
        update,
        LayerUpdate::Painted {
            hour_index: 0,
            cells: 43 * 43
        }
    );
    assert!(!layer.snapshot().await.unwrap().is_blank());
}

#[tokio::test]
async fn test_superseded_refresh_is_discarded() {
    let (fetcher, gate) = CountingFetcher::example().gated();
    let fetcher = Arc::new(fetcher);
    let layer = Arc::new(layer_with(fetcher.clone()));

    let first = {
        let layer = layer.clone();
        tokio::spawn(async move { layer.refresh(0, viewport()).await })
    };
    wait_for(|| fetcher.calls("manifest.json") == 1).await;

    let second = {
        let layer = layer.clone();
        tokio::spawn(async move { layer.refresh(1, viewport()).await })
    };
    wait_for(|| layer.current_generation().value() == 2).await;

    gate.open();
    let first = tokio::time::timeout(Duration::from_secs(5), first)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let second = tokio::time::timeout(Duration::from_secs(5), second)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert!(matches!(first, LayerUpdate::Stale { generation } if generation.value() == 1));
    assert!(matches!(second, LayerUpdate::Painted { hour_index: 1, .. }));
    // both hours were still loaded, sharing one manifest fetch
    assert_eq!(fetcher.calls("manifest.json"), 1);
    assert_eq!(fetcher.calls(&hour_file(0)), 1);
    assert_eq!(fetcher.calls(&hour_file(1)), 1);
}

#[tokio::test]
async fn test_failed_refresh_blanks_layer() {
    let fetcher = Arc::new(CountingFetcher::example().with_error(
        &hour_file(2),
        FetchError::Status {
            path: hour_file(2),
            status: 500,
        },
    ));
    let layer = layer_with(fetcher);

    layer.refresh(0, viewport()).await.unwrap();
    let err = layer.refresh(2, viewport()).await.unwrap_err();
    assert!(matches!(
        err,
        LoaderError::Fetch(FetchError::Status { status: 500, .. })
    ));
    assert!(layer.snapshot().await.unwrap().is_blank());
}

#[tokio::test]
async fn test_unknown_hour_is_an_error() {
    let layer = layer_with(Arc::new(CountingFetcher::example()));
    let err = layer.refresh(99, viewport()).await.unwrap_err();
    assert_eq!(err, LoaderError::HourNotFound(99));
}

#[tokio::test]
async fn test_hide_drops_frame_and_invalidates() {
    let layer = layer_with(Arc::new(CountingFetcher::example()));
    layer.refresh(0, viewport()).await.unwrap();
    let before = layer.current_generation();

    layer.hide().await;
    assert!(layer.snapshot().await.is_none());
    assert!(layer.current_generation() > before);
}
