use std::fmt::Display;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::Deserialize;
use tokio::task::JoinHandle;
use url::Url;

use crate::collectors::{JobCollector, ScrapeResult, USER_AGENT};
use crate::error::ScrapeError;
use crate::models::job::{JobRecord, Origin, RawListing};

pub const SOURCE: &str = "YCombinator";

const BASE_URL: &str = "https://www.ycombinator.com";
const JOBS_URL: &str = "https://www.ycombinator.com/jobs/role/software-engineer";

/// Present once the client-side job list has rendered.
const JOB_LINK_SELECTOR: &str = r#"a[href*="/companies/"]"#;
/// Extra time for lazily rendered rows after the first link shows up.
const SETTLE: Duration = Duration::from_secs(3);
const POLL: Duration = Duration::from_millis(250);
/// Upper bound for each teardown step (close, reap, kill).
const TEARDOWN: Duration = Duration::from_secs(5);

/// Runs in the page and returns `[{title, company, url, location, salary}]`.
const EXTRACT_SCRIPT: &str = r#"
(() => {
  const out = [];
  const links = document.querySelectorAll('a[href*="/companies/"][href*="/jobs/"]');
  for (const link of links) {
    const row = link.closest('div');
    if (!row) continue;
    const companyLink = row.querySelector('a[href*="/companies/"]:not([href*="/jobs/"])');
    const text = row.textContent || '';
    const loc = text.match(/(Remote|[A-Z][a-z]+,\s*[A-Z]{2}|San Francisco|New York|London|Bangalore)/i);
    const pay = text.match(/\$[\d]+K\s*-\s*\$[\d]+K/);
    out.push({
      title: (link.textContent || '').trim(),
      company: companyLink ? (companyLink.textContent || '').trim() : '',
      url: link.getAttribute('href') || '',
      location: loc ? loc[0] : '',
      salary: pay ? pay[0] : '',
    });
  }
  return out;
})()
"#;

/// A job row as returned by [`EXTRACT_SCRIPT`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct YcCard {
    pub title: String,
    pub company: String,
    pub url: String,
    pub location: String,
    pub salary: String,
}

/// Y Combinator's job board renders client-side, so it is scraped through a
/// headless Chromium session bounded by a wall-clock budget.
pub struct YCombinator {
    budget: Duration,
    chrome_path: Option<PathBuf>,
    target: String,
}

impl YCombinator {
    pub fn new(budget: Duration, chrome_path: Option<PathBuf>) -> Self {
        Self::with_target(budget, chrome_path, JOBS_URL)
    }

    pub fn with_target(
        budget: Duration,
        chrome_path: Option<PathBuf>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            budget,
            chrome_path,
            target: target.into(),
        }
    }
}

#[async_trait]
impl JobCollector for YCombinator {
    fn name(&self) -> &str {
        SOURCE
    }

    async fn fetch(&self) -> ScrapeResult {
        tracing::info!(source = SOURCE, url = %self.target, "Fetching with headless browser");
        let started = Instant::now();

        let session = tokio::time::timeout(
            self.budget,
            BrowserSession::launch(self.chrome_path.as_deref()),
        )
        .await
        .map_err(|_| ScrapeError::Timeout(self.budget))??;

        let remaining = self.budget.saturating_sub(started.elapsed());
        let outcome = tokio::time::timeout(remaining, session.extract(&self.target)).await;
        session.close().await;

        let cards = outcome.map_err(|_| ScrapeError::Timeout(self.budget))??;
        cards_to_records(cards, Utc::now())
    }
}

/// One launched browser plus its CDP event loop. Released with [`close`];
/// dropping it also kills the child process.
///
/// [`close`]: BrowserSession::close
struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    async fn launch(chrome_path: Option<&Path>) -> Result<Self, ScrapeError> {
        let mut builder = BrowserConfig::builder()
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={USER_AGENT}"));
        if let Some(path) = chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(ScrapeError::Browser)?;

        let (browser, mut handler) = Browser::launch(config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self { browser, handler })
    }

    async fn extract(&self, target: &str) -> Result<Vec<YcCard>, ScrapeError> {
        let page = self.browser.new_page(target).await?;
        wait_for(&page, JOB_LINK_SELECTOR).await;
        tokio::time::sleep(SETTLE).await;

        page.evaluate(EXTRACT_SCRIPT)
            .await?
            .into_value::<Vec<YcCard>>()
            .map_err(|e| ScrapeError::Parse(format!("unexpected script result: {e}")))
    }

    /// Ask Chromium to exit, falling back to killing the process when it
    /// refuses or hangs. Never takes much longer than a few [`TEARDOWN`]s.
    async fn close(mut self) {
        let closed = bounded(TEARDOWN, "close browser", self.browser.close()).await;
        let exited = match closed {
            Some(_) => bounded(TEARDOWN, "wait for browser exit", self.browser.wait()).await,
            None => None,
        };

        match exited {
            Some(status) => tracing::debug!(source = SOURCE, ?status, "Browser exited"),
            None => {
                let kill = async { self.browser.kill().await.unwrap_or(Ok(())) };
                if bounded(TEARDOWN, "kill browser", kill).await.is_some() {
                    tracing::debug!(source = SOURCE, "Browser killed");
                }
            }
        }
        self.handler.abort();
    }
}

/// Run one teardown step under `limit`. Failures and expiry are logged and
/// reported as `None`.
async fn bounded<T, E: Display>(
    limit: Duration,
    step: &str,
    fut: impl Future<Output = Result<T, E>>,
) -> Option<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            tracing::warn!(source = SOURCE, "Failed to {step}: {e}");
            None
        }
        Err(_) => {
            tracing::warn!(source = SOURCE, "Timed out trying to {step} after {limit:?}");
            None
        }
    }
}

/// Poll until `selector` matches. The caller's timeout bounds the wait.
async fn wait_for(page: &Page, selector: &str) {
    while page.find_element(selector).await.is_err() {
        tokio::time::sleep(POLL).await;
    }
}

pub fn cards_to_records(cards: Vec<YcCard>, now: DateTime<Utc>) -> ScrapeResult {
    let origin = Origin {
        source: SOURCE,
        id_prefix: "yc",
        base: Url::parse(BASE_URL).map_err(|e| ScrapeError::Parse(e.to_string()))?,
    };

    Ok(cards
        .into_iter()
        .filter_map(|card| card_to_record(card, &origin, now))
        .collect())
}

fn card_to_record(card: YcCard, origin: &Origin, now: DateTime<Utc>) -> Option<JobRecord> {
    let company = card.company.trim();
    if company.is_empty() {
        return None;
    }

    let mut tags = vec!["startup".to_string(), "yc".to_string()];
    if let Some(batch) = batch_of(company) {
        tags.push(format!("YC-{batch}"));
    }

    let external_id = origin
        .base
        .join(card.url.trim())
        .ok()
        .and_then(|url| company_job_key(&url));

    RawListing {
        external_id,
        title: card.title,
        company: company.to_string(),
        location: card.location,
        url: card.url,
        salary: Some(card.salary),
        tags,
        ..Default::default()
    }
    .into_record(origin, now)
}

/// Batch label from a company name like `Acme (W24)`.
fn batch_of(company: &str) -> Option<&str> {
    let start = company.find('(')?;
    let end = company[start..].find(')')? + start;
    let batch = company[start + 1..end].trim();
    (!batch.is_empty()).then_some(batch)
}

/// `/companies/acme/jobs/abc-backend` becomes `acme-jobs-abc-backend`.
fn company_job_key(url: &Url) -> Option<String> {
    let rest = url.path().strip_prefix("/companies/")?.trim_matches('/');
    (!rest.is_empty()).then(|| rest.replace('/', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(title: &str, company: &str, url: &str) -> YcCard {
        YcCard {
            title: title.into(),
            company: company.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    #[test]
    fn cards_become_tagged_records() {
        let now = Utc::now();
        let mut first = card(
            "Founding Engineer",
            "Acme (W24)",
            "/companies/acme/jobs/AbC123-founding-engineer",
        );
        first.location = "Remote".into();
        first.salary = "$120K - $160K".into();

        let records = cards_to_records(vec![first], now).unwrap();
        assert_eq!(records.len(), 1);

        let job = &records[0];
        assert_eq!(job.id, "yc-acme-jobs-AbC123-founding-engineer");
        assert_eq!(
            job.url,
            "https://www.ycombinator.com/companies/acme/jobs/AbC123-founding-engineer"
        );
        assert_eq!(job.tags, vec!["startup", "yc", "YC-W24"]);
        assert_eq!(job.salary.as_deref(), Some("$120K - $160K"));
        assert!(job.remote);
        assert_eq!(job.source, "YCombinator");
    }

    #[test]
    fn incomplete_cards_are_dropped() {
        let records = cards_to_records(
            vec![
                card("", "Acme", "/companies/acme/jobs/1"),
                card("Engineer", "", "/companies/acme/jobs/2"),
                card("Engineer", "Acme", ""),
                card("Engineer", "Acme", "/companies/acme/jobs/3"),
            ],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "yc-acme-jobs-3");
        assert_eq!(records[0].salary, None);
        assert_eq!(records[0].tags, vec!["startup", "yc"]);
    }

    #[test]
    fn batch_label_parsing() {
        assert_eq!(batch_of("Acme (S23)"), Some("S23"));
        assert_eq!(batch_of("Acme ()"), None);
        assert_eq!(batch_of("Acme"), None);
        assert_eq!(batch_of("Acme ) ("), None);
    }

    #[tokio::test]
    async fn hung_teardown_step_is_cut_off() {
        let started = Instant::now();
        let hung = std::future::pending::<Result<(), String>>();
        assert_eq!(bounded(Duration::from_millis(50), "close browser", hung).await, None);
        assert!(started.elapsed() < Duration::from_secs(2));

        let failed = async { Err::<(), _>("connection reset") };
        assert_eq!(bounded(TEARDOWN, "close browser", failed).await, None);
        let done = async { Ok::<_, String>(7) };
        assert_eq!(bounded(TEARDOWN, "close browser", done).await, Some(7));
    }

    #[tokio::test]
    async fn missing_browser_binary_is_a_browser_error() {
        let yc = YCombinator::with_target(
            Duration::from_secs(5),
            Some(PathBuf::from("/nonexistent/chromium-for-jobscraper")),
            "http://127.0.0.1:9/jobs",
        );
        assert!(matches!(yc.fetch().await, Err(ScrapeError::Browser(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unresponsive_browser_hits_the_budget() {
        use std::os::unix::fs::PermissionsExt;

        let chrome = std::env::temp_dir()
            .join(format!("jobscraper-stuck-chrome-{}", std::process::id()));
        std::fs::write(&chrome, "#!/bin/sh\nsleep 30\n").unwrap();
        std::fs::set_permissions(&chrome, std::fs::Permissions::from_mode(0o755)).unwrap();

        let budget = Duration::from_secs(1);
        let yc = YCombinator::with_target(budget, Some(chrome.clone()), "http://127.0.0.1:9/jobs");
        let started = Instant::now();
        let result = yc.fetch().await;
        let _ = std::fs::remove_file(&chrome);

        assert!(matches!(result, Err(ScrapeError::Timeout(d)) if d == budget));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn script_result_deserializes_with_missing_fields() {
        let value = serde_json::json!([{ "title": "Engineer", "url": "/companies/x/jobs/1" }]);
        let cards: Vec<YcCard> = serde_json::from_value(value).unwrap();
        assert_eq!(cards[0].company, "");
        assert_eq!(cards[0].title, "Engineer");
    }
}
