use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000/api/jobs/batch";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "jobscraper",
    about = "Scrape software job listings from several boards and publish them to the backend"
)]
pub struct Config {
    /// Batch ingestion endpoint on the backend
    #[arg(long, env = "BACKEND_API_URL", default_value = DEFAULT_BACKEND_URL)]
    pub backend_api_url: String,

    /// Only run these sources (comma separated, case-insensitive). Runs all when empty.
    #[arg(long = "sources", env = "SCRAPER_SOURCES", value_delimiter = ',')]
    pub sources: Vec<String>,

    /// Request timeout for HTTP-backed sources, in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value = "30")]
    pub http_timeout_secs: u64,

    /// Wall-clock budget for a whole headless browser session, in seconds
    #[arg(long, env = "BROWSER_TIMEOUT_SECS", default_value = "45")]
    pub browser_timeout_secs: u64,

    /// Chromium executable; chromiumoxide's own lookup is used when unset
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Print the final batch instead of sending it to the backend
    #[arg(long, env = "DRY_RUN", default_value = "false")]
    pub dry_run: bool,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn browser_timeout(&self) -> Duration {
        Duration::from_secs(self.browser_timeout_secs)
    }

    /// Whether the named source should run given the `--sources` filter.
    pub fn source_enabled(&self, name: &str) -> bool {
        self.sources.is_empty()
            || self
                .sources
                .iter()
                .any(|s| s.trim().eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_arguments() {
        let config = Config::try_parse_from(["jobscraper"]).unwrap();
        assert_eq!(config.backend_api_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.browser_timeout(), Duration::from_secs(45));
        assert!(!config.dry_run);
        assert!(config.source_enabled("LinkedIn"));
    }

    #[test]
    fn source_filter_is_case_insensitive() {
        let config =
            Config::try_parse_from(["jobscraper", "--sources", "linkedin, Wellfound"]).unwrap();
        assert!(config.source_enabled("LinkedIn"));
        assert!(config.source_enabled("wellfound"));
        assert!(!config.source_enabled("YCombinator"));
    }
}
