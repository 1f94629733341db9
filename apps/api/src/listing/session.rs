//! A listing session holds one interactive user's filter state, page index and memoised views.
//!
//! Any change to the filter state resets the page index to 0 before anything else can read
//! it, so a page is never served from stale paging against new results.
//!
//! Each session sits behind its own lock. The registry map is only locked long enough to
//! look a session up, and sessions left idle past the registry's TTL are dropped.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinError;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::listing::facets::Facet;
use crate::listing::filters::{FilterError, FilterState};
use crate::listing::fuzzy::FuzzySearcher;
use crate::listing::pagination::{paginate, PageInfo, DEFAULT_PAGE_SIZE};
use crate::listing::pipeline::{self, BASE_FUZZY_THRESHOLD, STRICT_FUZZY_THRESHOLD};
use crate::listing::snapshot::{JobSnapshot, Memo};
use crate::listing::taxonomy::Industry;
use crate::models::job::Job;

pub const DEFAULT_SESSION_IDLE_MINUTES: u64 = 60;

/// Tunables shared by every session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListingSettings {
    pub page_size: usize,
    pub strict_threshold: f64,
    pub base_threshold: f64,
    pub new_job_window: Duration,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            strict_threshold: STRICT_FUZZY_THRESHOLD,
            base_threshold: BASE_FUZZY_THRESHOLD,
            new_job_window: Duration::hours(3),
        }
    }
}

/// A job as shown in a listing page.
#[derive(Debug, Clone, Serialize)]
pub struct JobCard {
    #[serde(flatten)]
    pub job: Job,
    pub industry: Industry,
    pub is_new: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub jobs: Vec<JobCard>,
    pub page: PageInfo,
    pub facets: Vec<Facet>,
    pub filters: FilterState,
    /// Size of the unfiltered job set.
    pub total_jobs: usize,
    pub generation: u64,
}

type FilterKey = (u64, FilterState);

pub struct ListingSession {
    id: Uuid,
    user_id: Option<String>,
    filters: FilterState,
    page: usize,
    filtered: Memo<FilterKey, Vec<usize>>,
}

impl ListingSession {
    pub fn new(user_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            filters: FilterState::new(),
            page: 0,
            filtered: Memo::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    #[cfg(test)]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Applies `change` to the filter state. When it reports a change, the page index goes
    /// back to 0. A failed change leaves both untouched.
    pub fn update_filters<F>(&mut self, change: F) -> Result<bool, FilterError>
    where
        F: FnOnce(&mut FilterState) -> Result<bool, FilterError>,
    {
        let mut next = self.filters.clone();
        let changed = change(&mut next)?;
        if changed {
            self.filters = next;
            self.page = 0;
            debug!(session = %self.id, "filters changed, page reset");
        }
        Ok(changed)
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Filtered job indices for `snapshot`, recomputed only when the snapshot generation or
    /// the filter state differs from the last call.
    pub fn filtered(
        &mut self,
        snapshot: &JobSnapshot,
        searcher: &dyn FuzzySearcher,
        settings: &ListingSettings,
    ) -> Arc<Vec<usize>> {
        let key = (snapshot.generation(), self.filters.clone());
        let filters = &self.filters;
        self.filtered.get_or_compute(key, || {
            pipeline::run(snapshot, filters, searcher, settings.strict_threshold)
        })
    }

    pub fn view(
        &mut self,
        snapshot: &JobSnapshot,
        searcher: &dyn FuzzySearcher,
        settings: &ListingSettings,
        now: DateTime<Utc>,
    ) -> ListingView {
        let filtered = self.filtered(snapshot, searcher, settings);
        let jobs = paginate(filtered.as_slice(), self.page, settings.page_size)
            .iter()
            .filter_map(|&i| {
                snapshot.job(i).map(|job| JobCard {
                    job: job.clone(),
                    industry: snapshot.industry(i),
                    is_new: job.is_new_at(now, settings.new_job_window),
                })
            })
            .collect();

        ListingView {
            jobs,
            page: PageInfo::new(filtered.len(), self.page, settings.page_size),
            facets: snapshot.facets().to_vec(),
            filters: self.filters.clone(),
            total_jobs: snapshot.len(),
            generation: snapshot.generation(),
        }
    }
}

struct SessionEntry {
    session: Arc<Mutex<ListingSession>>,
    last_seen: Instant,
}

/// All live sessions, keyed by id.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
    idle_ttl: std::time::Duration,
}

impl SessionRegistry {
    pub fn new(idle_ttl: std::time::Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Registers a new session. Sessions idle past the TTL are swept first.
    pub async fn create(&self, user_id: Option<String>) -> Uuid {
        let session = ListingSession::new(user_id);
        let id = session.id();
        let now = Instant::now();

        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= self.idle_ttl);
        let expired = before - sessions.len();
        if expired > 0 {
            debug!(expired, "idle listing sessions dropped");
        }
        sessions.insert(
            id,
            SessionEntry {
                session: Arc::new(Mutex::new(session)),
                last_seen: now,
            },
        );
        debug!(session = %id, "listing session created");
        id
    }

    /// Looks a session up and marks it as used. An expired session is dropped and reported
    /// as missing.
    async fn touch(&self, id: Uuid) -> Option<Arc<Mutex<ListingSession>>> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.get_mut(&id)?;
        if now.duration_since(entry.last_seen) > self.idle_ttl {
            sessions.remove(&id);
            debug!(session = %id, "listing session expired");
            return None;
        }
        entry.last_seen = now;
        Some(entry.session.clone())
    }

    /// Runs `f` against the session on the blocking pool, `Ok(None)` if the session does
    /// not exist. Only this session's lock is held while `f` runs.
    pub async fn with_session<R, F>(&self, id: Uuid, f: F) -> Result<Option<R>, JoinError>
    where
        F: FnOnce(&mut ListingSession) -> R + Send + 'static,
        R: Send + 'static,
    {
        let Some(session) = self.touch(id).await else {
            return Ok(None);
        };
        let mut guard = session.lock_owned().await;
        tokio::task::spawn_blocking(move || f(&mut guard))
            .await
            .map(Some)
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.lock().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::filters::PillKind;
    use crate::listing::fuzzy::{ApproximateSearcher, FuzzyMatch};
    use crate::models::job::JobField;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn jobs(n: usize) -> Vec<Job> {
        (0..n)
            .map(|i| Job {
                id: i.to_string(),
                title: if i % 2 == 0 {
                    "Remote copywriter".to_string()
                } else {
                    "Office bookkeeping".to_string()
                },
                ..Job::default()
            })
            .collect()
    }

    struct CountingSearcher(AtomicUsize);

    impl FuzzySearcher for CountingSearcher {
        fn search(&self, corpus: &[&Job], _: &[JobField], _: &str, _: f64) -> Vec<FuzzyMatch> {
            self.0.fetch_add(1, Ordering::SeqCst);
            (0..corpus.len())
                .map(|index| FuzzyMatch { index, score: 0.0 })
                .collect()
        }
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut session = ListingSession::new(None);
        session.set_page(3);
        let changed = session
            .update_filters(|f| f.add_pill(PillKind::Include, "remote"))
            .unwrap();
        assert!(changed);
        assert_eq!(session.page(), 0);
    }

    #[test]
    fn test_noop_change_keeps_page() {
        let mut session = ListingSession::new(None);
        session
            .update_filters(|f| f.add_pill(PillKind::Include, "remote"))
            .unwrap();
        session.set_page(2);
        let changed = session
            .update_filters(|f| f.add_pill(PillKind::Include, "REMOTE"))
            .unwrap();
        assert!(!changed);
        assert_eq!(session.page(), 2);
    }

    #[test]
    fn test_failed_change_keeps_state_and_page() {
        let mut session = ListingSession::new(None);
        session
            .update_filters(|f| f.add_pill(PillKind::Include, "python"))
            .unwrap();
        session.set_page(1);
        let result = session.update_filters(|f| {
            f.add_pill(PillKind::Include, "django")?;
            f.add_pill(PillKind::Exclude, "python")
        });
        assert!(result.is_err());
        assert_eq!(session.filters().include_pills(), ["python".to_string()]);
        assert_eq!(session.page(), 1);
    }

    #[test]
    fn test_view_pages_through_filtered_jobs() {
        let snapshot = JobSnapshot::new(1, jobs(95));
        let searcher = ApproximateSearcher::default();
        let settings = ListingSettings::default();
        let mut session = ListingSession::new(None);

        let view = session.view(&snapshot, &searcher, &settings, Utc::now());
        assert_eq!(view.page.total_pages, 4);
        assert_eq!(view.jobs.len(), 30);
        assert_eq!(view.total_jobs, 95);

        session.set_page(3);
        let view = session.view(&snapshot, &searcher, &settings, Utc::now());
        assert_eq!(view.jobs.len(), 5);

        session.set_page(10);
        let view = session.view(&snapshot, &searcher, &settings, Utc::now());
        assert!(view.jobs.is_empty());
    }

    #[test]
    fn test_view_reflects_filters_and_labels() {
        let snapshot = JobSnapshot::new(1, jobs(10));
        let searcher = ApproximateSearcher::default();
        let settings = ListingSettings::default();
        let mut session = ListingSession::new(None);
        session
            .update_filters(|f| f.add_pill(PillKind::Include, "remote"))
            .unwrap();

        let view = session.view(&snapshot, &searcher, &settings, Utc::now());
        assert_eq!(view.page.total_items, 5);
        assert!(view.jobs.iter().all(|c| c.industry == Industry::Writing));
        assert_eq!(view.filters.include_pills(), ["remote".to_string()]);
    }

    #[test]
    fn test_pipeline_memoised_per_generation_and_filters() {
        let searcher = CountingSearcher(AtomicUsize::new(0));
        let settings = ListingSettings::default();
        let mut session = ListingSession::new(None);
        session
            .update_filters(|f| f.add_pill(PillKind::Include, "remote copywriter"))
            .unwrap();

        let first = JobSnapshot::new(1, jobs(4));
        session.view(&first, &searcher, &settings, Utc::now());
        session.set_page(0);
        session.view(&first, &searcher, &settings, Utc::now());
        assert_eq!(searcher.0.load(Ordering::SeqCst), 1);

        let second = JobSnapshot::new(2, jobs(4));
        session.view(&second, &searcher, &settings, Utc::now());
        assert_eq!(searcher.0.load(Ordering::SeqCst), 2);

        session
            .update_filters(|f| f.add_pill(PillKind::Include, "office bookkeeping"))
            .unwrap();
        session.view(&second, &searcher, &settings, Utc::now());
        assert_eq!(searcher.0.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_new_badge_uses_window() {
        let now = Utc::now();
        let mut fresh = jobs(1);
        fresh[0].created_at = Some((now - Duration::minutes(30)).to_rfc3339());
        let snapshot = JobSnapshot::new(1, fresh);
        let mut session = ListingSession::new(None);
        let view = session.view(
            &snapshot,
            &ApproximateSearcher::default(),
            &ListingSettings::default(),
            now,
        );
        assert!(view.jobs[0].is_new);
    }

    fn registry() -> SessionRegistry {
        SessionRegistry::new(std::time::Duration::from_secs(DEFAULT_SESSION_IDLE_MINUTES * 60))
    }

    #[tokio::test]
    async fn test_registry_create_and_lookup() {
        let registry = registry();
        let id = registry.create(Some("user-1".to_string())).await;
        assert_eq!(registry.len().await, 1);

        let user = registry
            .with_session(id, |s| s.user_id().map(str::to_string))
            .await
            .unwrap();
        assert_eq!(user, Some(Some("user-1".to_string())));
        assert!(registry
            .with_session(Uuid::new_v4(), |_| ())
            .await
            .unwrap()
            .is_none());

        assert!(registry.remove(id).await);
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_busy_session_does_not_block_others() {
        let registry = Arc::new(registry());
        let busy = registry.create(None).await;
        let idle = registry.create(None).await;

        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let held = {
            let registry = registry.clone();
            tokio::spawn(async move {
                registry
                    .with_session(busy, move |_| {
                        started_tx.send(()).unwrap();
                        release_rx.recv().unwrap();
                    })
                    .await
            })
        };
        tokio::task::spawn_blocking(move || started_rx.recv().unwrap())
            .await
            .unwrap();

        let other = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            registry.with_session(idle, |s| s.id()),
        )
        .await
        .expect("other session stayed reachable")
        .unwrap();
        assert_eq!(other, Some(idle));
        assert_eq!(registry.len().await, 2);

        release_tx.send(()).unwrap();
        assert_eq!(held.await.unwrap().unwrap(), Some(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_expire() {
        let registry = SessionRegistry::new(std::time::Duration::from_secs(60));
        let stale = registry.create(None).await;
        let active = registry.create(None).await;

        tokio::time::advance(std::time::Duration::from_secs(45)).await;
        assert!(registry.with_session(active, |_| ()).await.unwrap().is_some());

        tokio::time::advance(std::time::Duration::from_secs(30)).await;
        assert!(registry.with_session(stale, |_| ()).await.unwrap().is_none());
        assert_eq!(registry.len().await, 1);

        // Creating sweeps whatever has gone idle since.
        tokio::time::advance(std::time::Duration::from_secs(61)).await;
        registry.create(None).await;
        assert_eq!(registry.len().await, 1);
        assert!(registry.with_session(active, |_| ()).await.unwrap().is_none());
    }
}
