use async_trait::async_trait;
use chrono::{DateTime, Utc};
use url::Url;

use crate::collectors::html::{ACCEPT_HTML, fetch_page, scrape_cards};
use crate::collectors::{JobCollector, ScrapeResult};
use crate::error::ScrapeError;
use crate::models::job::{Origin, RawListing};

pub const SOURCE: &str = "Freshersworld";

const BASE_URL: &str = "https://www.freshersworld.com";
const LISTING_URL: &str = "https://www.freshersworld.com/jobs";

pub struct Freshersworld {
    client: reqwest::Client,
    target: String,
}

impl Freshersworld {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_target(client, LISTING_URL)
    }

    pub fn with_target(client: reqwest::Client, target: impl Into<String>) -> Self {
        Self {
            client,
            target: target.into(),
        }
    }
}

#[async_trait]
impl JobCollector for Freshersworld {
    fn name(&self) -> &str {
        SOURCE
    }

    async fn fetch(&self) -> ScrapeResult {
        tracing::info!(source = SOURCE, url = %self.target, "Visiting");
        let html = fetch_page(self.client.get(&self.target).header("Accept", ACCEPT_HTML)).await?;
        parse_listings(&html, Utc::now())
    }
}

pub fn parse_listings(html: &str, now: DateTime<Utc>) -> ScrapeResult {
    let origin = Origin {
        source: SOURCE,
        id_prefix: "fw",
        base: Url::parse(BASE_URL).map_err(|e| ScrapeError::Parse(e.to_string()))?,
    };

    scrape_cards(html, ".job-container", |card| {
        let mut company = card.text(".latest-jobs-company");
        if company.is_empty() {
            company = "Unknown".to_string();
        }

        // Posting dates on the board are relative ("3 days ago"), so
        // posted_at stays at scrape time. Listings are on-site fresher roles.
        let mut record = RawListing {
            title: card.text(".latest-jobs-title"),
            company,
            location: card.text(".job-location"),
            description: card.text(".job-desc"),
            url: card.attr("a[href]", "href"),
            tags: vec!["fresher".to_string(), "india".to_string()],
            ..Default::default()
        }
        .into_record(&origin, now)?;
        record.remote = false;
        Some(record)
    })
}
