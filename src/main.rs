use clap::Parser;
use tracing_subscriber::EnvFilter;

use jobscraper::collectors::{self, runner};
use jobscraper::config::{Config, LogFormat};
use jobscraper::publisher::{HttpPublisher, Publisher, StdoutPublisher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    let config = Config::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("jobscraper=info"));
    match config.log_format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }

    if dotenv.is_err() {
        tracing::info!("No .env file found, using environment and defaults");
    }

    let collectors = collectors::all_collectors(&config)?;
    tracing::info!(count = collectors.len(), "Job scraper started");

    let publisher: Box<dyn Publisher> = if config.dry_run {
        Box::new(StdoutPublisher)
    } else {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;
        Box::new(HttpPublisher::new(client, &config.backend_api_url))
    };

    runner::run(collectors, publisher.as_ref()).await;

    Ok(())
}
