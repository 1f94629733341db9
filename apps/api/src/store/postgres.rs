use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::models::job::Job;
use crate::store::{ActivitySink, JobClickEntry, JobStore, SearchLogEntry, StoreError, Tables};

/// Reads jobs and writes activity straight from/to Postgres.
///
/// The job table's columns are mixed-case and vary between deployments, so rows are read as
/// `to_jsonb(row)` and decoded with the same serde mapping the REST backend uses.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    tables: Tables,
}

impl PgStore {
    pub fn new(pool: PgPool, tables: Tables) -> Self {
        Self { pool, tables }
    }
}

/// Double-quotes an identifier, escaping embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Pool exhaustion means the database is out of reach; anything else is a query failure.
fn db_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Unavailable(e.to_string())
        }
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl JobStore for PgStore {
    async fn fetch_all_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let sql = format!(
            "SELECT to_jsonb(t) FROM {} t",
            quote_ident(&self.tables.jobs)
        );
        let rows: Vec<Value> = sqlx::query_scalar(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        debug!("Fetched {} raw job rows from Postgres", rows.len());

        let jobs = rows
            .into_iter()
            .map(serde_json::from_value::<Job>)
            .collect::<Result<Vec<_>, _>>()?;
        info!("Loaded {} jobs from table {}", jobs.len(), self.tables.jobs);
        Ok(jobs)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[async_trait]
impl ActivitySink for PgStore {
    async fn record_search(&self, entry: &SearchLogEntry) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO {} (user_id, search_pills, disregarded_pills) VALUES ($1, $2, $3)",
            quote_ident(&self.tables.search_logs)
        );
        sqlx::query(&sql)
            .bind(&entry.user_id)
            .bind(&entry.search_pills)
            .bind(&entry.disregarded_pills)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn record_click(&self, entry: &JobClickEntry) -> Result<(), StoreError> {
        let sql = format!(
            r#"
            INSERT INTO {}
                (user_id, job_id, job_title, company, location, rate, date_posted,
                 summary, url, search_pills, disregarded_pills)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
            quote_ident(&self.tables.job_clicks)
        );
        sqlx::query(&sql)
            .bind(&entry.user_id)
            .bind(&entry.job_id)
            .bind(&entry.job_title)
            .bind(&entry.company)
            .bind(&entry.location)
            .bind(&entry.rate)
            .bind(&entry.date_posted)
            .bind(&entry.summary)
            .bind(&entry.url)
            .bind(&entry.search_pills)
            .bind(&entry.disregarded_pills)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
