//! In-memory fetch double.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use storage::{FetchError, GridFetcher};

use crate::fixtures::{example_manifest_json, hour_file};
use crate::generators::{npy_bytes, EXAMPLE_4X4};

/// Holds fetches back until opened.
#[derive(Clone)]
pub struct Gate(Arc<Semaphore>);

impl Gate {
    fn closed() -> Self {
        Self(Arc::new(Semaphore::new(0)))
    }

    /// Let every pending and future fetch through.
    pub fn open(&self) {
        self.0.add_permits(1 << 20);
    }
}

/// A [`GridFetcher`] serving canned responses and counting calls per path.
#[derive(Default)]
pub struct CountingFetcher {
    responses: Mutex<HashMap<String, Result<Bytes, FetchError>>>,
    calls: Mutex<HashMap<String, usize>>,
    gate: Option<Gate>,
}

impl CountingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manifest plus six hour files of the 4x4 example.
    pub fn example() -> Self {
        let fetcher = Self::new().with_file("manifest.json", example_manifest_json());
        for hour in 0..6 {
            fetcher.set_file(&hour_file(hour), npy_bytes(1, 4, 4, &EXAMPLE_4X4));
        }
        fetcher
    }

    /// Hold every fetch until the returned gate is opened.
    pub fn gated(mut self) -> (Self, Gate) {
        let gate = Gate::closed();
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn with_file(self, path: &str, body: impl Into<Bytes>) -> Self {
        self.set_file(path, body);
        self
    }

    pub fn with_error(self, path: &str, error: FetchError) -> Self {
        self.set_error(path, error);
        self
    }

    pub fn set_file(&self, path: &str, body: impl Into<Bytes>) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), Ok(body.into()));
    }

    pub fn set_error(&self, path: &str, error: FetchError) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), Err(error));
    }

    /// Number of fetches issued for `path`.
    pub fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl GridFetcher for CountingFetcher {
    async fn fetch(&self, path: &str) -> Result<Bytes, FetchError> {
        *self.calls.lock().unwrap().entry(path.to_string()).or_default() += 1;

        if let Some(gate) = &self.gate {
            let _permit = gate.0.acquire().await;
        }

        self.responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| {
                Err(FetchError::Status {
                    path: path.to_string(),
                    status: 404,
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_missing_paths() {
        let fetcher = CountingFetcher::new().with_file("a", "x");
        let body = tokio_test::block_on(fetcher.fetch("a")).unwrap();
        assert_eq!(&body[..], b"x");

        let err = tokio_test::block_on(fetcher.fetch("b")).unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));

        assert_eq!(fetcher.calls("a"), 1);
        assert_eq!(fetcher.total_calls(), 2);
    }

    #[tokio::test]
    async fn test_gate_holds_fetches() {
        let (fetcher, gate) = CountingFetcher::new().with_file("a", "x").gated();
        let fetcher = Arc::new(fetcher);

        let task = {
            let fetcher = fetcher.clone();
            tokio::spawn(async move { fetcher.fetch("a").await })
        };
        tokio::task::yield_now().await;
        assert!(!task.is_finished());

        gate.open();
        assert!(task.await.unwrap().is_ok());
    }
}
