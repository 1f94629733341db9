use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A job posting as stored by the backend. Read-only from the listing's point of view.
///
/// Column names in the backing table are mixed-case (`Title`, `UNIQUE_ID`, ...), so every
/// field accepts its column name as an alias. Null or missing text columns decode as empty
/// strings so classification and search never see a hole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(alias = "UNIQUE_ID", default, deserialize_with = "nullable_text")]
    pub id: String,
    #[serde(alias = "Title", default, deserialize_with = "nullable_text")]
    pub title: String,
    #[serde(alias = "Company", default, deserialize_with = "nullable_text")]
    pub company: String,
    #[serde(alias = "Location", default, deserialize_with = "nullable_text")]
    pub location: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub rate: String,
    #[serde(alias = "Summary", default, deserialize_with = "nullable_text")]
    pub summary: String,
    /// Posting date as entered by the poster (free text).
    #[serde(default, deserialize_with = "nullable_text")]
    pub date: String,
    #[serde(alias = "URL", default, deserialize_with = "nullable_text")]
    pub url: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub inserted_at: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub added_by: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub added_by_email: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub poster_name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub tags: Option<String>,
}

/// The text fields the fuzzy searcher may look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobField {
    Title,
    Company,
    Location,
    Summary,
}

impl JobField {
    pub const SEARCHABLE: [JobField; 4] = [
        JobField::Title,
        JobField::Company,
        JobField::Location,
        JobField::Summary,
    ];
}

impl Job {
    pub fn field(&self, field: JobField) -> &str {
        match field {
            JobField::Title => &self.title,
            JobField::Company => &self.company,
            JobField::Location => &self.location,
            JobField::Summary => &self.summary,
        }
    }

    /// `title + " " + summary`, the text industries are inferred from.
    pub fn classification_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }

    /// Lowercased title, company, location and summary for exact pill matching.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.title, self.company, self.location, self.summary
        )
        .to_lowercase()
    }

    /// Lowercased title, company and summary checked against exclude pills.
    pub fn exclusion_text(&self) -> String {
        format!("{} {} {}", self.title, self.company, self.summary).to_lowercase()
    }

    /// Creation timestamp, preferring `created_at` over `inserted_at`.
    /// Unparseable timestamps are treated as absent.
    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .as_deref()
            .or(self.inserted_at.as_deref())
            .and_then(parse_timestamp)
    }

    /// True when the job was created less than `window` before `now`.
    pub fn is_new_at(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.posted_at()
            .map(|posted| posted > now - window)
            .unwrap_or(false)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // Postgres `timestamp without time zone` renders without an offset.
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Accepts any JSON scalar; numbers and booleans keep their textual form.
fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.unwrap_or_default())
}
