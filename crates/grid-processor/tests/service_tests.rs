//! Ozone service over an in-memory grid pack.

use std::sync::Arc;

use grid_processor::{OzoneService, PointValue};
use storage::{GridCache, LoaderConfig, LoaderError};
use test_utils::{assert_approx_eq, hour_file, CountingFetcher};

fn service() -> (OzoneService, Arc<CountingFetcher>) {
    let fetcher = Arc::new(CountingFetcher::example());
    let cache = GridCache::new(fetcher.clone(), LoaderConfig::default());
    (OzoneService::new(Arc::new(cache)), fetcher)
}

#[tokio::test]
async fn test_value_at_centroid() {
    let (service, _) = service();
    let point = service.get_ozone_value(0.0, -80.0, 0).await.unwrap();
    assert_approx_eq!(point.value.unwrap(), 32.5, 1e-9);
}

#[tokio::test]
async fn test_out_of_bounds_skips_grid_fetch() {
    let (service, fetcher) = service();
    let point = service.get_ozone_value(70.0, -80.0, 2).await.unwrap();
    assert_eq!(point, PointValue { value: None });
    assert_eq!(fetcher.calls(&hour_file(2)), 0);
    assert_eq!(fetcher.calls("manifest.json"), 1);
}

#[tokio::test]
async fn test_unknown_hour_is_an_error() {
    let (service, _) = service();
    let err = service.get_ozone_value(0.0, -80.0, 99).await.unwrap_err();
    assert_eq!(err, LoaderError::HourNotFound(99));
}

#[tokio::test]
async fn test_grid_and_hours() {
    let (service, fetcher) = service();
    let hours = service.forecast_hours().await.unwrap();
    assert_eq!(hours.len(), 6);

    let grid = service.get_ozone_grid(3).await.unwrap();
    assert_eq!(grid.value_range(), Some((10.0, 60.0)));
    service.get_ozone_value(10.0, -100.0, 3).await.unwrap();
    assert_eq!(fetcher.calls(&hour_file(3)), 1);
}
