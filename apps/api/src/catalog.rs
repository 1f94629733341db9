use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::listing::snapshot::JobSnapshot;
use crate::store::{JobStore, StoreError};

/// Holds the current job snapshot. Readers clone the `Arc` and work against an immutable
/// view; `refresh` swaps in a new one wholesale. Generation 0 is the empty startup snapshot,
/// and each installed snapshot is numbered one past the one it replaces.
pub struct JobCatalog {
    store: Arc<dyn JobStore>,
    current: RwLock<Arc<JobSnapshot>>,
}

impl JobCatalog {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            current: RwLock::new(Arc::new(JobSnapshot::default())),
        }
    }

    pub async fn current(&self) -> Arc<JobSnapshot> {
        self.current.read().await.clone()
    }

    /// Refetches every job. On failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<Arc<JobSnapshot>, StoreError> {
        let jobs = match self.store.fetch_all_jobs().await {
            Ok(jobs) => jobs,
            Err(e) => {
                warn!(
                    "Job refresh from {} backend failed, keeping previous snapshot: {e}",
                    self.store.backend()
                );
                return Err(e);
            }
        };

        // Classify before taking the write lock; readers are only blocked for the swap.
        let classified = JobSnapshot::new(0, jobs);
        if classified.is_empty() {
            warn!("Job store {} returned no jobs", self.store.backend());
        }

        let mut current = self.current.write().await;
        let generation = current.generation() + 1;
        let snapshot = Arc::new(classified.with_generation(generation));
        *current = snapshot.clone();
        drop(current);

        info!(
            "Job snapshot {} loaded: {} jobs, {} facets",
            generation,
            snapshot.len(),
            snapshot.facets().len()
        );
        Ok(snapshot)
    }
}
