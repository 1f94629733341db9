use std::future::Future;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::models::job::Job;
use crate::store::{ActivitySink, JobClickEntry, JobStore, SearchLogEntry, StoreError, Tables};

/// Rows requested per page when reading the job table. The server may return fewer.
const PAGE_LIMIT: usize = 1000;

/// Stable ordering for offset paging.
const PAGE_ORDER: &str = "UNIQUE_ID.asc";

#[derive(Debug, Deserialize)]
struct RestErrorBody {
    message: String,
}

/// Client for a PostgREST-style HTTP API (`{base}/rest/v1/{table}`), authenticated with an
/// anon key sent as both `apikey` and bearer token.
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
    tables: Tables,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: String, tables: Tables) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            tables,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn insert<T: serde::Serialize + Sync>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<(), StoreError> {
        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }

    async fn fetch_page(&self, url: &str, offset: usize) -> Result<Vec<Job>, StoreError> {
        let response = self
            .authorized(self.client.get(url))
            .query(&page_query(offset))
            .send()
            .await?;
        let response = check_status(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn page_query(offset: usize) -> [(&'static str, String); 4] {
    [
        ("select", "*".to_string()),
        ("order", PAGE_ORDER.to_string()),
        ("limit", PAGE_LIMIT.to_string()),
        ("offset", offset.to_string()),
    ]
}

/// Reads pages from offset 0 until one comes back empty. A short page does not end the
/// read, since the server's row cap can be below `PAGE_LIMIT`.
async fn collect_pages<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, StoreError>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>, StoreError>>,
{
    let mut rows = Vec::new();
    loop {
        let offset = rows.len();
        let page = fetch_page(offset).await?;
        if page.is_empty() {
            break;
        }
        debug!("Fetched {} rows at offset {}", page.len(), offset);
        rows.extend(page);
    }
    Ok(rows)
}

/// Turns a non-2xx response into `StoreError::Status`, preferring the API's own message.
async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!("REST store returned {}: {}", status, body);
    let message = serde_json::from_str::<RestErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    Err(StoreError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl JobStore for RestStore {
    async fn fetch_all_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let url = self.table_url(&self.tables.jobs);
        let url = url.as_str();
        let jobs = collect_pages(move |offset| self.fetch_page(url, offset)).await?;

        info!("Loaded {} jobs from {}", jobs.len(), self.tables.jobs);
        Ok(jobs)
    }

    fn backend(&self) -> &'static str {
        "rest"
    }
}

#[async_trait]
impl ActivitySink for RestStore {
    async fn record_search(&self, entry: &SearchLogEntry) -> Result<(), StoreError> {
        self.insert(&self.tables.search_logs, entry).await
    }

    async fn record_click(&self, entry: &JobClickEntry) -> Result<(), StoreError> {
        self.insert(&self.tables.job_clicks, entry).await
    }
}
