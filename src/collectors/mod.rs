// Source adapters. Each collector scrapes one job board and hands back
// normalized records; the runner fans them out and merges the results.

pub mod freshersworld;
pub mod hiringcafe;
mod html;
pub mod linkedin;
pub mod runner;
pub mod wellfound;
pub mod ycombinator;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::ScrapeError;
use crate::models::job::JobRecord;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Outcome of one collector's fetch: a batch or the reason there is none.
pub type ScrapeResult = Result<Vec<JobRecord>, ScrapeError>;

/// Trait that all job sources must implement.
///
/// Implementations bound every network or browser call with a timeout,
/// never emit a record without a title or URL, and keep no state shared
/// with other collectors.
#[async_trait]
pub trait JobCollector: Send + Sync {
    /// Human-readable source name, also stamped on every record.
    fn name(&self) -> &str;

    /// Fetch and normalize the source's current listings.
    async fn fetch(&self) -> ScrapeResult;
}

/// Names of every known collector, in registration order.
pub const COLLECTOR_NAMES: &[&str] = &[
    ycombinator::SOURCE,
    freshersworld::SOURCE,
    linkedin::SOURCE,
    wellfound::SOURCE,
    hiringcafe::SOURCE,
];

/// Build a collector by name (case-insensitive).
pub fn get_collector(name: &str, config: &Config) -> Result<Option<Arc<dyn JobCollector>>, ScrapeError> {
    let collector: Arc<dyn JobCollector> = if name.eq_ignore_ascii_case(ycombinator::SOURCE) {
        Arc::new(ycombinator::YCombinator::new(
            config.browser_timeout(),
            config.chrome_path.clone(),
        ))
    } else if name.eq_ignore_ascii_case(freshersworld::SOURCE) {
        Arc::new(freshersworld::Freshersworld::new(http_client(config.http_timeout())?))
    } else if name.eq_ignore_ascii_case(linkedin::SOURCE) {
        Arc::new(linkedin::LinkedIn::new(http_client(config.http_timeout())?))
    } else if name.eq_ignore_ascii_case(wellfound::SOURCE) {
        Arc::new(wellfound::Wellfound::new(http_client(config.http_timeout())?))
    } else if name.eq_ignore_ascii_case(hiringcafe::SOURCE) {
        Arc::new(hiringcafe::HiringCafe::new(http_client(config.http_timeout())?))
    } else {
        return Ok(None);
    };
    Ok(Some(collector))
}

/// Every collector the configuration enables.
pub fn all_collectors(config: &Config) -> Result<Vec<Arc<dyn JobCollector>>, ScrapeError> {
    for requested in &config.sources {
        if !COLLECTOR_NAMES
            .iter()
            .any(|n| n.eq_ignore_ascii_case(requested.trim()))
        {
            tracing::warn!("Unknown source '{requested}' ignored");
        }
    }

    let mut collectors = Vec::new();
    for name in COLLECTOR_NAMES {
        if !config.source_enabled(name) {
            continue;
        }
        if let Some(collector) = get_collector(name, config)? {
            collectors.push(collector);
        }
    }
    Ok(collectors)
}

/// HTTP client for one collector. Each collector owns its own client so no
/// connection state is shared between sources.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, ScrapeError> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn registry_builds_every_source_by_default() {
        let config = Config::try_parse_from(["jobscraper"]).unwrap();
        let collectors = all_collectors(&config).unwrap();
        let names: Vec<&str> = collectors.iter().map(|c| c.name()).collect();
        assert_eq!(names, COLLECTOR_NAMES);
    }

    #[test]
    fn registry_honours_source_filter() {
        let config =
            Config::try_parse_from(["jobscraper", "--sources", "linkedin,nope"]).unwrap();
        let collectors = all_collectors(&config).unwrap();
        assert_eq!(collectors.len(), 1);
        assert_eq!(collectors[0].name(), linkedin::SOURCE);
    }

    #[test]
    fn unknown_collector_is_none() {
        let config = Config::try_parse_from(["jobscraper"]).unwrap();
        assert!(get_collector("indeed", &config).unwrap().is_none());
    }
}
