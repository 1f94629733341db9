use std::sync::Arc;

use crate::activity::ActivityLogger;
use crate::catalog::JobCatalog;
use crate::listing::fuzzy::FuzzySearcher;
use crate::listing::session::{ListingSettings, SessionRegistry};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<JobCatalog>,
    pub sessions: Arc<SessionRegistry>,
    pub activity: ActivityLogger,
    /// Pluggable fuzzy matcher. Default: ApproximateSearcher.
    pub searcher: Arc<dyn FuzzySearcher>,
    pub settings: ListingSettings,
}
