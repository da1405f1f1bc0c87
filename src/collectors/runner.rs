use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::collectors::{JobCollector, ScrapeResult};
use crate::models::job::JobRecord;
use crate::publisher::Publisher;
use crate::skills;

/// Run every collector once, classify and tag the merged listings, and
/// publish the survivors.
///
/// Never fails: collector errors cost that source's records, a publish
/// error is logged. Returns the batch that was (or would have been) sent.
pub async fn run(collectors: Vec<Arc<dyn JobCollector>>, publisher: &dyn Publisher) -> Vec<JobRecord> {
    let collected = collect_all(collectors).await;
    let scraped = collected.len();
    let jobs = classify(collected);

    tracing::info!(scraped, kept = jobs.len(), "Classification finished");

    if !jobs.is_empty() {
        tracing::info!("Preparing to send {} valid jobs to backend", jobs.len());
        if let Err(e) = publisher.publish(&jobs).await {
            tracing::error!("Failed to publish jobs: {e}");
        }
    }

    tracing::info!("Scrape finished. Total valid jobs processed: {}", jobs.len());
    jobs
}

/// Fetch from every collector concurrently and merge the batches.
///
/// Order across collectors follows completion; each batch keeps its own order.
/// Failed collectors are logged and contribute nothing.
pub async fn collect_all(collectors: Vec<Arc<dyn JobCollector>>) -> Vec<JobRecord> {
    if collectors.is_empty() {
        tracing::warn!("No collectors registered");
        return Vec::new();
    }

    let (tx, mut rx) = mpsc::channel::<(String, ScrapeResult)>(collectors.len());
    let mut tasks = JoinSet::new();

    for collector in collectors {
        let tx = tx.clone();
        tasks.spawn(async move {
            let name = collector.name().to_string();
            tracing::info!(source = %name, "Starting scraper");
            let result = collector.fetch().await;
            // Capacity equals the task count and the receiver outlives the
            // join below, so this send cannot block or fail.
            let _ = tx.send((name, result)).await;
        });
    }
    // Only the task clones remain: the channel closes when the last task ends.
    drop(tx);

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Scraper task aborted: {e}");
        }
    }

    let mut all = Vec::new();
    while let Some((name, result)) = rx.recv().await {
        match result {
            Ok(jobs) => {
                tracing::info!(source = %name, count = jobs.len(), "Scraper finished");
                all.extend(jobs);
            }
            Err(e) => {
                tracing::error!(source = %name, "Error scraping {name}: {e}");
            }
        }
    }
    all
}

/// Drop non-software listings and replace each survivor's tags with the
/// canonical skills found in its text.
pub fn classify(jobs: Vec<JobRecord>) -> Vec<JobRecord> {
    jobs.into_iter()
        .filter_map(|mut job| {
            let text = format!("{} {} {}", job.title, job.description, job.tags.join(" "));
            if !skills::is_software_job(&text) {
                return None;
            }
            job.tags = skills::extract_skills(&text);
            Some(job)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::error::{PublishError, ScrapeError};

    struct StaticCollector {
        name: &'static str,
        jobs: Vec<JobRecord>,
        delay: Duration,
    }

    #[async_trait]
    impl JobCollector for StaticCollector {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self) -> ScrapeResult {
            tokio::time::sleep(self.delay).await;
            Ok(self.jobs.clone())
        }
    }

    struct FailingCollector;

    #[async_trait]
    impl JobCollector for FailingCollector {
        fn name(&self) -> &str {
            "Broken"
        }

        async fn fetch(&self) -> ScrapeResult {
            Err(ScrapeError::Parse("selector drift".to_string()))
        }
    }

    struct PanickingCollector;

    #[async_trait]
    impl JobCollector for PanickingCollector {
        fn name(&self) -> &str {
            "Panics"
        }

        async fn fetch(&self) -> ScrapeResult {
            panic!("boom")
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        batches: Mutex<Vec<Vec<JobRecord>>>,
        fail: bool,
    }

    #[async_trait]
    impl Publisher for RecordingPublisher {
        async fn publish(&self, jobs: &[JobRecord]) -> Result<(), PublishError> {
            self.batches.lock().unwrap().push(jobs.to_vec());
            if self.fail {
                return Err(PublishError::Status(reqwest::StatusCode::BAD_GATEWAY));
            }
            Ok(())
        }
    }

    fn job(id: &str, title: &str, description: &str) -> JobRecord {
        let now = Utc::now();
        JobRecord {
            id: id.to_string(),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: String::new(),
            description: description.to_string(),
            url: format!("https://example.com/jobs/{id}"),
            source: "Test".to_string(),
            posted_at: now,
            scraped_at: now,
            remote: false,
            salary: None,
            tags: Vec::new(),
        }
    }

    fn collector(name: &'static str, jobs: Vec<JobRecord>, delay_ms: u64) -> Arc<dyn JobCollector> {
        Arc::new(StaticCollector {
            name,
            jobs,
            delay: Duration::from_millis(delay_ms),
        })
    }

    #[tokio::test]
    async fn failed_collectors_contribute_nothing() {
        let collectors: Vec<Arc<dyn JobCollector>> = vec![
            collector("A", vec![job("a1", "x", ""), job("a2", "y", "")], 20),
            Arc::new(FailingCollector),
            collector("B", vec![job("b1", "z", "")], 0),
            Arc::new(PanickingCollector),
            collector("C", vec![], 5),
        ];

        let all = collect_all(collectors).await;
        let mut ids: Vec<&str> = all.iter().map(|j| j.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["a1", "a2", "b1"]);
    }

    #[tokio::test]
    async fn batch_order_is_preserved_within_a_collector() {
        let batch: Vec<JobRecord> = (0..10).map(|i| job(&format!("a{i}"), "t", "")).collect();
        let collectors = vec![collector("A", batch.clone(), 10), collector("B", vec![job("b0", "t", "")], 0)];

        let all = collect_all(collectors).await;
        let from_a: Vec<&str> = all
            .iter()
            .filter(|j| j.id.starts_with('a'))
            .map(|j| j.id.as_str())
            .collect();
        let expected: Vec<&str> = batch.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(from_a, expected);
        assert_eq!(all.len(), 11);
    }

    #[tokio::test]
    async fn no_collectors_yields_empty_batch() {
        assert!(collect_all(Vec::new()).await.is_empty());
    }

    #[test]
    fn classify_replaces_tags_with_skills() {
        let mut tagged = job("1", "Frontend Developer", "Build UIs");
        tagged.tags = vec!["reactjs".to_string(), "startup".to_string()];

        let kept = classify(vec![tagged, job("2", "Barista", "Coffee and smiles")]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "1");
        assert_eq!(kept[0].tags, vec!["React"]);
    }

    #[tokio::test]
    async fn end_to_end_keeps_software_jobs_only() {
        let collectors = vec![
            collector(
                "A",
                vec![job("a1", "Backend Engineer", "Experience with Go and PostgreSQL")],
                10,
            ),
            collector("B", vec![job("b1", "Sales Rep", "Meet quotas")], 0),
        ];
        let publisher = RecordingPublisher::default();

        let jobs = run(collectors, &publisher).await;

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, "a1");
        let mut tags = jobs[0].tags.clone();
        tags.sort();
        assert_eq!(tags, vec!["Go", "PostgreSQL"]);

        let batches = publisher.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], jobs);
    }

    #[tokio::test]
    async fn empty_result_is_not_published() {
        let collectors = vec![collector("B", vec![job("b1", "Sales Rep", "Meet quotas")], 0)];
        let publisher = RecordingPublisher::default();

        let jobs = run(collectors, &publisher).await;
        assert!(jobs.is_empty());
        assert!(publisher.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn publish_failure_does_not_fail_the_run() {
        let collectors = vec![collector("A", vec![job("a1", "Rust Engineer", "docker")], 0)];
        let publisher = RecordingPublisher {
            fail: true,
            ..Default::default()
        };

        let jobs = run(collectors, &publisher).await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(publisher.batches.lock().unwrap().len(), 1);
    }
}
