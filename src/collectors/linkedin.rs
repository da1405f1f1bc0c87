use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use url::Url;

use crate::collectors::html::{ACCEPT_HTML, fetch_page, scrape_cards};
use crate::collectors::{JobCollector, ScrapeResult};
use crate::error::ScrapeError;
use crate::models::job::{Origin, RawListing};

pub const SOURCE: &str = "LinkedIn";

const BASE_URL: &str = "https://www.linkedin.com";
/// Public (logged-out) search for software engineers in India.
const SEARCH_URL: &str = "https://www.linkedin.com/jobs/search?keywords=software%20engineer&location=India&geoId=102713980&trk=public_jobs_jobs-search-bar_search-submit&position=1&pageNum=0";

/// The full description sits behind the detail page's auth wall.
const PLACEHOLDER_DESCRIPTION: &str = "Click to apply on LinkedIn to view full description.";

pub struct LinkedIn {
    client: reqwest::Client,
    target: String,
}

impl LinkedIn {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_target(client, SEARCH_URL)
    }

    pub fn with_target(client: reqwest::Client, target: impl Into<String>) -> Self {
        Self {
            client,
            target: target.into(),
        }
    }
}

#[async_trait]
impl JobCollector for LinkedIn {
    fn name(&self) -> &str {
        SOURCE
    }

    async fn fetch(&self) -> ScrapeResult {
        tracing::info!(source = SOURCE, url = %self.target, "Visiting");
        let html = fetch_page(
            self.client
                .get(&self.target)
                .header("Accept", ACCEPT_HTML)
                .header("Accept-Language", "en-US,en;q=0.9"),
        )
        .await?;
        parse_listings(&html, Utc::now())
    }
}

fn origin() -> Result<Origin, ScrapeError> {
    Ok(Origin {
        source: SOURCE,
        id_prefix: "li",
        base: Url::parse(BASE_URL).map_err(|e| ScrapeError::Parse(e.to_string()))?,
    })
}

pub fn parse_listings(html: &str, now: DateTime<Utc>) -> ScrapeResult {
    let origin = origin()?;
    scrape_cards(html, "ul.jobs-search__results-list li", |card| {
        let title = card.text("h3.base-search-card__title");
        let company = card.text("h4.base-search-card__subtitle");

        // Logged-out pages sometimes mask names with asterisks.
        if title.contains("**") || company.contains("**") {
            return None;
        }

        RawListing {
            title,
            company,
            location: card.text("span.job-search-card__location"),
            url: card.attr("a.base-card__full-link", "href"),
            posted_at: parse_posted(&card.attr("time", "datetime")),
            description: PLACEHOLDER_DESCRIPTION.to_string(),
            ..Default::default()
        }
        .into_record(&origin, now)
    })
}

/// Cards carry the posting day as `YYYY-MM-DD`.
fn parse_posted(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
