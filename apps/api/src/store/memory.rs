//! In-process store for tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::job::Job;
use crate::store::{ActivitySink, JobClickEntry, JobStore, SearchLogEntry, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    jobs: Mutex<Vec<Job>>,
    failing: AtomicBool,
    pub searches: Mutex<Vec<SearchLogEntry>>,
    pub clicks: Mutex<Vec<JobClickEntry>>,
}

impl MemoryStore {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self {
            jobs: Mutex::new(jobs),
            ..Self::default()
        }
    }

    pub fn set_jobs(&self, jobs: Vec<Job>) {
        *self.jobs.lock().unwrap() = jobs;
    }

    /// While set, every call fails with `StoreError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store set to fail".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn fetch_all_jobs(&self) -> Result<Vec<Job>, StoreError> {
        self.check()?;
        Ok(self.jobs.lock().unwrap().clone())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl ActivitySink for MemoryStore {
    async fn record_search(&self, entry: &SearchLogEntry) -> Result<(), StoreError> {
        self.check()?;
        self.searches.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn record_click(&self, entry: &JobClickEntry) -> Result<(), StoreError> {
        self.check()?;
        self.clicks.lock().unwrap().push(entry.clone());
        Ok(())
    }
}
