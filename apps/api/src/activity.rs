use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::listing::filters::FilterState;
use crate::models::job::Job;
use crate::store::{ActivitySink, JobClickEntry, SearchLogEntry};

/// Fire-and-forget writer for search and click logs.
///
/// Each write runs on its own tokio task; failures are logged and dropped. Anonymous sessions
/// (no user id) are never logged. The returned handle is only awaited by tests.
#[derive(Clone)]
pub struct ActivityLogger {
    sink: Arc<dyn ActivitySink>,
}

impl ActivityLogger {
    pub fn new(sink: Arc<dyn ActivitySink>) -> Self {
        Self { sink }
    }

    pub fn pills_changed(
        &self,
        user_id: Option<&str>,
        filters: &FilterState,
    ) -> Option<JoinHandle<()>> {
        let entry = SearchLogEntry::new(user_id?, filters);
        let sink = self.sink.clone();
        Some(tokio::spawn(async move {
            match sink.record_search(&entry).await {
                Ok(()) => debug!("Search log written for user {}", entry.user_id),
                Err(e) => warn!("Failed to write search log: {e}"),
            }
        }))
    }

    pub fn job_clicked(
        &self,
        user_id: Option<&str>,
        job: &Job,
        filters: &FilterState,
    ) -> Option<JoinHandle<()>> {
        let entry = JobClickEntry::new(user_id?, job, filters);
        let sink = self.sink.clone();
        Some(tokio::spawn(async move {
            match sink.record_click(&entry).await {
                Ok(()) => debug!("Click on job {} logged", entry.job_id),
                Err(e) => warn!("Failed to write job click: {e}"),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::filters::PillKind;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn test_pills_changed_records_current_pills() {
        let store = Arc::new(MemoryStore::default());
        let logger = ActivityLogger::new(store.clone());
        let mut filters = FilterState::new();
        filters.add_pill(PillKind::Include, "remote").unwrap();

        logger
            .pills_changed(Some("u1"), &filters)
            .unwrap()
            .await
            .unwrap();

        let searches = store.searches.lock().unwrap();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].search_pills, Some(vec!["remote".to_string()]));
        assert_eq!(searches[0].disregarded_pills, None);
    }

    #[tokio::test]
    async fn test_anonymous_activity_is_skipped() {
        let store = Arc::new(MemoryStore::default());
        let logger = ActivityLogger::new(store.clone());
        assert!(logger.pills_changed(None, &FilterState::new()).is_none());
        assert!(logger
            .job_clicked(None, &Job::default(), &FilterState::new())
            .is_none());
        assert!(store.searches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_is_swallowed() {
        let store = Arc::new(MemoryStore::default());
        store.set_failing(true);
        let logger = ActivityLogger::new(store.clone());
        let job = Job {
            id: "j1".to_string(),
            ..Job::default()
        };

        let handle = logger.job_clicked(Some("u1"), &job, &FilterState::new());
        assert!(handle.unwrap().await.is_ok());
        assert!(store.clicks.lock().unwrap().is_empty());
    }
}
