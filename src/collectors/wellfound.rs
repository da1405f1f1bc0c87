use async_trait::async_trait;
use chrono::{DateTime, Utc};
use url::Url;

use crate::collectors::html::{ACCEPT_HTML, fetch_page, scrape_cards};
use crate::collectors::{JobCollector, ScrapeResult};
use crate::error::ScrapeError;
use crate::models::job::{Origin, RawListing};

pub const SOURCE: &str = "Wellfound";

const BASE_URL: &str = "https://wellfound.com";
const ROLE_URL: &str = "https://wellfound.com/role/software-engineer";

pub struct Wellfound {
    client: reqwest::Client,
    target: String,
}

impl Wellfound {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_target(client, ROLE_URL)
    }

    pub fn with_target(client: reqwest::Client, target: impl Into<String>) -> Self {
        Self {
            client,
            target: target.into(),
        }
    }
}

#[async_trait]
impl JobCollector for Wellfound {
    fn name(&self) -> &str {
        SOURCE
    }

    /// Wellfound renders mostly client-side; only the server-rendered role
    /// landing page is scraped, which may legitimately yield nothing.
    async fn fetch(&self) -> ScrapeResult {
        tracing::info!(source = SOURCE, url = %self.target, "Visiting");
        let html = fetch_page(
            self.client
                .get(&self.target)
                .header("Accept", ACCEPT_HTML)
                .header("Accept-Language", "en-US,en;q=0.9")
                .header("Referer", "https://google.com")
                .header("Upgrade-Insecure-Requests", "1"),
        )
        .await?;
        parse_listings(&html, Utc::now())
    }
}

pub fn parse_listings(html: &str, now: DateTime<Utc>) -> ScrapeResult {
    let origin = Origin {
        source: SOURCE,
        id_prefix: "wf",
        base: Url::parse(BASE_URL).map_err(|e| ScrapeError::Parse(e.to_string()))?,
    };

    scrape_cards(html, "div[data-test='JobListItem']", |card| {
        RawListing {
            title: card.text("h2"),
            company: card.text("div[data-test='StartupName']"),
            url: card.attr("a", "href"),
            description: "View on Wellfound".to_string(),
            ..Default::default()
        }
        .into_record(&origin, now)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_links() {
        let page = r#"
        <div data-test="JobListItem">
          <a href="/jobs/2841001-senior-backend-engineer"><h2>Senior Backend Engineer</h2></a>
          <div data-test="StartupName">Nimbus</div>
        </div>
        <div data-test="JobListItem">
          <a href="https://wellfound.com/jobs/2841002-designer"></a>
        </div>
        "#;

        let jobs = parse_listings(page, Utc::now()).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(
            jobs[0].url,
            "https://wellfound.com/jobs/2841001-senior-backend-engineer"
        );
        assert_eq!(jobs[0].id, "wf-2841001-senior-backend-engineer");
        assert_eq!(jobs[0].company, "Nimbus");
        assert_eq!(jobs[0].source, "Wellfound");
    }
}
