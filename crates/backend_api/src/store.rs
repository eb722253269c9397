use std::sync::Arc;

use pivot_engine::Dataset;
use tokio::sync::RwLock;

/// Holds the active dataset behind an atomic snapshot swap.
///
/// Queries clone the `Arc` under a read lock and compute against that
/// snapshot with no further locking; an upload builds the new dataset
/// fully off to the side and publishes it with a single write. In-flight
/// queries keep observing the snapshot they started with, so they never
/// see a mix of old and new rows. The previous dataset drops once the
/// last query holding it finishes.
#[derive(Debug, Default)]
pub struct DatasetStore {
    current: RwLock<Option<Arc<Dataset>>>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot, or `None` before the first successful load.
    pub async fn snapshot(&self) -> Option<Arc<Dataset>> {
        self.current.read().await.clone()
    }

    /// Publish a fully built dataset, replacing the previous one.
    pub async fn replace(&self, dataset: Dataset) -> Arc<Dataset> {
        let dataset = Arc::new(dataset);
        *self.current.write().await = Some(Arc::clone(&dataset));
        dataset
    }
}
