use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::listing::pagination::DEFAULT_PAGE_SIZE;
use crate::listing::pipeline::{BASE_FUZZY_THRESHOLD, STRICT_FUZZY_THRESHOLD};
use crate::listing::session::{ListingSettings, DEFAULT_SESSION_IDLE_MINUTES};
use crate::store::Tables;

/// Where jobs are read from and activity is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    Rest { base_url: String, anon_key: String },
}

/// Application configuration loaded from environment variables.
/// Fails at startup if no backend is configured or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: StoreBackend,
    pub tables: Tables,
    pub page_size: usize,
    pub fuzzy_threshold: f64,
    pub base_fuzzy_threshold: f64,
    pub new_job_window_hours: i64,
    pub session_idle_minutes: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so parsing can be tested without
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("DATABASE_URL") {
            Some(database_url) => StoreBackend::Postgres { database_url },
            None => StoreBackend::Rest {
                base_url: require(&lookup, "SUPABASE_URL")
                    .context("Set DATABASE_URL or SUPABASE_URL + SUPABASE_ANON_KEY")?,
                anon_key: require(&lookup, "SUPABASE_ANON_KEY")?,
            },
        };

        let defaults = Tables::default();
        let tables = Tables {
            jobs: lookup("JOBS_TABLE").unwrap_or(defaults.jobs),
            search_logs: lookup("SEARCH_LOG_TABLE").unwrap_or(defaults.search_logs),
            job_clicks: lookup("CLICK_LOG_TABLE").unwrap_or(defaults.job_clicks),
        };

        let config = Config {
            backend,
            tables,
            page_size: parse_or(&lookup, "PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            fuzzy_threshold: parse_or(&lookup, "FUZZY_THRESHOLD", STRICT_FUZZY_THRESHOLD)?,
            base_fuzzy_threshold: parse_or(
                &lookup,
                "BASE_FUZZY_THRESHOLD",
                BASE_FUZZY_THRESHOLD,
            )?,
            new_job_window_hours: parse_or(&lookup, "NEW_JOB_WINDOW_HOURS", 3)?,
            session_idle_minutes: parse_or(
                &lookup,
                "SESSION_IDLE_MINUTES",
                DEFAULT_SESSION_IDLE_MINUTES,
            )?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            bail!("PAGE_SIZE must be at least 1");
        }
        for (key, value) in [
            ("FUZZY_THRESHOLD", self.fuzzy_threshold),
            ("BASE_FUZZY_THRESHOLD", self.base_fuzzy_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{key} must be between 0 and 1, got {value}");
            }
        }
        if self.fuzzy_threshold > self.base_fuzzy_threshold {
            bail!(
                "FUZZY_THRESHOLD ({}) must not exceed BASE_FUZZY_THRESHOLD ({})",
                self.fuzzy_threshold,
                self.base_fuzzy_threshold
            );
        }
        if self.new_job_window_hours < 0 {
            bail!("NEW_JOB_WINDOW_HOURS must not be negative");
        }
        if self.session_idle_minutes == 0 {
            bail!("SESSION_IDLE_MINUTES must be at least 1");
        }
        Ok(())
    }

    pub fn listing_settings(&self) -> ListingSettings {
        ListingSettings {
            page_size: self.page_size,
            strict_threshold: self.fuzzy_threshold,
            base_threshold: self.base_fuzzy_threshold,
            new_job_window: chrono::Duration::hours(self.new_job_window_hours),
        }
    }

    /// How long a listing session may sit unused before it is dropped.
    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_minutes * 60)
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
