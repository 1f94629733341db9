//! External collaborators: the job table and the activity log tables.
//!
//! Two interchangeable backends sit behind the same traits:
//! - `PgStore`: direct Postgres connection (sqlx)
//! - `RestStore`: PostgREST-style HTTP API (reqwest)
//!
//! `AppState` carries them as `Arc<dyn JobStore>` / `Arc<dyn ActivitySink>`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::listing::filters::FilterState;
use crate::models::job::Job;

#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod rest;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to decode row: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Table names used by both backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    pub jobs: String,
    pub search_logs: String,
    pub job_clicks: String,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            jobs: "Allgigs_All_vacancies_NEW".to_string(),
            search_logs: "search_logs".to_string(),
            job_clicks: "job_clicks".to_string(),
        }
    }
}

/// Bulk read of the complete job dataset. No filtering or paging on the backend side.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn fetch_all_jobs(&self) -> Result<Vec<Job>, StoreError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Row written whenever a user's pills change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchLogEntry {
    pub user_id: String,
    /// `None` rather than an empty list when there are no pills.
    pub search_pills: Option<Vec<String>>,
    pub disregarded_pills: Option<Vec<String>>,
}

impl SearchLogEntry {
    pub fn new(user_id: &str, filters: &FilterState) -> Self {
        Self {
            user_id: user_id.to_string(),
            search_pills: non_empty(filters.include_pills()),
            disregarded_pills: non_empty(filters.exclude_pills()),
        }
    }
}

/// Row written when a user opens a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobClickEntry {
    pub user_id: String,
    pub job_id: String,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub rate: String,
    pub date_posted: String,
    pub summary: String,
    pub url: String,
    pub search_pills: Option<Vec<String>>,
    pub disregarded_pills: Option<Vec<String>>,
}

impl JobClickEntry {
    pub fn new(user_id: &str, job: &Job, filters: &FilterState) -> Self {
        Self {
            user_id: user_id.to_string(),
            job_id: job.id.clone(),
            job_title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            rate: job.rate.clone(),
            date_posted: job.date.clone(),
            summary: job.summary.clone(),
            url: job.url.clone(),
            search_pills: non_empty(filters.include_pills()),
            disregarded_pills: non_empty(filters.exclude_pills()),
        }
    }
}

fn non_empty(pills: &[String]) -> Option<Vec<String>> {
    (!pills.is_empty()).then(|| pills.to_vec())
}

/// Write side for user activity. Callers never wait on it; see `activity::ActivityLogger`.
#[async_trait]
pub trait ActivitySink: Send + Sync {
    async fn record_search(&self, entry: &SearchLogEntry) -> Result<(), StoreError>;

    async fn record_click(&self, entry: &JobClickEntry) -> Result<(), StoreError>;
}
