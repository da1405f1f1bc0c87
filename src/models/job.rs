use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A normalized job listing, as sent to the backend's batch endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    #[serde(rename = "externalId")]
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub url: String,
    pub source: String,
    pub posted_at: DateTime<Utc>,
    pub scraped_at: DateTime<Utc>,
    pub remote: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Where a listing came from: the source name stamped on every record,
/// the id prefix, and the base URL relative links are resolved against.
#[derive(Debug, Clone)]
pub struct Origin {
    pub source: &'static str,
    pub id_prefix: &'static str,
    pub base: Url,
}

/// A listing as scraped, before normalization.
///
/// Adapters fill in whatever the page offers and convert it with
/// [`RawListing::into_record`], which drops listings without a title or an
/// http(s) URL.
#[derive(Debug, Clone, Default)]
pub struct RawListing {
    /// Stable key for the listing. Derived from the URL when absent.
    pub external_id: Option<String>,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub url: String,
    pub posted_at: Option<DateTime<Utc>>,
    pub salary: Option<String>,
    pub tags: Vec<String>,
}

impl RawListing {
    pub fn into_record(self, origin: &Origin, scraped_at: DateTime<Utc>) -> Option<JobRecord> {
        let title = self.title.trim();
        let href = self.url.trim();
        if title.is_empty() || href.is_empty() {
            return None;
        }

        let url = origin.base.join(href).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        let key = match self.external_id.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => id_from_url(&url),
        };

        let location = self.location.trim().to_string();
        let remote = location.to_lowercase().contains("remote");
        let salary = self
            .salary
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Some(JobRecord {
            id: format!("{}-{key}", origin.id_prefix),
            title: title.to_string(),
            company: self.company.trim().to_string(),
            location,
            description: self.description.trim().to_string(),
            url: url.to_string(),
            source: origin.source.to_string(),
            posted_at: self.posted_at.unwrap_or(scraped_at),
            scraped_at,
            remote,
            salary,
            tags: self.tags,
        })
    }
}

/// Last non-empty path segment of the listing URL, falling back to the
/// whole URL for bare hosts.
fn id_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map(String::from)
        .unwrap_or_else(|| url.to_string())
}
