use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use scraper::Html;
use serde_json::{Value, json};
use url::Url;

use crate::collectors::{JobCollector, ScrapeResult};
use crate::error::ScrapeError;
use crate::models::job::{Origin, RawListing};

pub const SOURCE: &str = "HiringCafe";

/// Characters that encodeURIComponent does NOT encode.
/// RFC 3986 unreserved: A-Z a-z 0-9 - _ . ! ~ * ' ( )
const ENCODE_URI_COMPONENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const BASE_URL: &str = "https://hiring.cafe";
const PAGE_SIZE: u32 = 40;
const TITLE_QUERY: &str = "software engineer";

/// Search API of hiring.cafe. Unlike the HTML boards it returns JSON, with
/// the search filters passed as an encoded state blob.
pub struct HiringCafe {
    client: reqwest::Client,
    base_url: String,
}

impl HiringCafe {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl JobCollector for HiringCafe {
    fn name(&self) -> &str {
        SOURCE
    }

    async fn fetch(&self) -> ScrapeResult {
        let encoded = encode_state(&search_state(TITLE_QUERY))?;
        let url = format!(
            "{}/api/search-jobs?s={}&size={PAGE_SIZE}&page=0",
            self.base_url.trim_end_matches('/'),
            utf8_percent_encode(&encoded, ENCODE_URI_COMPONENT_SET)
        );
        tracing::info!(source = SOURCE, query = TITLE_QUERY, "Querying search API");

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json,text/html,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Sec-Fetch-Dest", "document")
            .header("Sec-Fetch-Mode", "navigate")
            .header("Sec-Fetch-Site", "none")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ScrapeError::Status(resp.status()));
        }

        let data: Value = resp.json().await?;
        parse_results(&data, Utc::now())
    }
}

/// Search filters. Fields the API requires but this scraper does not
/// narrow on are sent with their permissive defaults.
fn search_state(query: &str) -> Value {
    json!({
        "locations": [],
        "workplaceTypes": ["Remote", "Hybrid", "Onsite"],
        "defaultToUserLocation": false,
        "commitmentTypes": ["Full-time", "Part-time", "Contract", "Internship"],
        "jobTitleQuery": query,
        "jobDescriptionQuery": "",
        "dateFetchedPastNDays": 14,
        "currency": { "label": "Any", "value": null },
        "frequency": { "label": "Any", "value": null },
        "restrictJobsToTransparentSalaries": false,
        "calcFrequency": "Yearly",
        "roleYoeRange": [0, 20],
        "excludeIfRoleYoeIsNotSpecified": false,
        "departments": ["Engineering", "Software Development"],
        "industries": [],
        "hideJobTypes": [],
        "languageRequirementsOperator": "OR",
    })
}

/// Encode state as the API expects:
/// JSON.stringify -> encodeURIComponent -> btoa
fn encode_state(state: &Value) -> Result<String, ScrapeError> {
    let json_str =
        serde_json::to_string(state).map_err(|e| ScrapeError::Parse(e.to_string()))?;
    let uri_encoded = utf8_percent_encode(&json_str, ENCODE_URI_COMPONENT_SET).to_string();
    Ok(BASE64.encode(uri_encoded.as_bytes()))
}

pub fn parse_results(data: &Value, now: DateTime<Utc>) -> ScrapeResult {
    let results = data
        .get("results")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ScrapeError::Parse("Missing 'results' in response".to_string()))?;

    let origin = Origin {
        source: SOURCE,
        id_prefix: "hc",
        base: Url::parse(BASE_URL).map_err(|e| ScrapeError::Parse(e.to_string()))?,
    };

    Ok(results
        .iter()
        .filter_map(|raw| parse_job(raw)?.into_record(&origin, now))
        .collect())
}

fn parse_job(raw: &Value) -> Option<RawListing> {
    let str_at = |v: &Value, key: &str| v.get(key).and_then(|v| v.as_str()).map(String::from);

    let vpd = raw.get("v5_processed_job_data")?;
    let info = raw.get("job_information").unwrap_or(raw);

    let object_id = str_at(raw, "objectID").or_else(|| str_at(raw, "requisition_id"))?;

    let title = str_at(vpd, "core_job_title")
        .or_else(|| str_at(info, "title"))
        .unwrap_or_default();

    let company = str_at(vpd, "company_name")
        .or_else(|| {
            raw.get("v5_processed_company_data")
                .and_then(|c| str_at(c, "name"))
        })
        .unwrap_or_else(|| "Unknown".to_string());

    let mut location = str_at(vpd, "formatted_workplace_location").unwrap_or_default();
    let remote_workplace = str_at(vpd, "workplace_type")
        .is_some_and(|t| t.eq_ignore_ascii_case("remote"));
    if remote_workplace && !location.to_lowercase().contains("remote") {
        location = if location.is_empty() {
            "Remote".to_string()
        } else {
            format!("{location} (Remote)")
        };
    }

    let url = str_at(raw, "apply_url").unwrap_or_else(|| format!("/viewjob/{object_id}"));

    let description = str_at(info, "description")
        .map(|html| html_to_text(&html))
        .unwrap_or_default();

    let posted_at = str_at(vpd, "estimated_publish_date")
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|d| d.with_timezone(&Utc));

    Some(RawListing {
        external_id: Some(object_id),
        title,
        company,
        location,
        description,
        url,
        posted_at,
        salary: format_salary(vpd),
        tags: Vec::new(),
    })
}

/// Yearly salary range, e.g. `USD 120000-160000`.
fn format_salary(vpd: &Value) -> Option<String> {
    let num = |key: &str| vpd.get(key).and_then(|v| v.as_f64()).map(|v| v as i64);
    let currency = vpd
        .get("listed_compensation_currency")
        .and_then(|v| v.as_str())
        .unwrap_or("");

    let range = match (num("yearly_min_compensation"), num("yearly_max_compensation")) {
        (Some(min), Some(max)) if min != max => format!("{min}-{max}"),
        (Some(v), _) | (None, Some(v)) => v.to_string(),
        (None, None) => return None,
    };
    Some(format!("{currency} {range}").trim().to_string())
}

fn html_to_text(html: &str) -> String {
    Html::parse_fragment(html)
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
