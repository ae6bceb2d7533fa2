use crate::{Crawler, CrawlerError, Fetcher, MatchStore, PageParser};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{info, warn};

fn scheduler_error(e: impl std::fmt::Debug) -> CrawlerError {
    CrawlerError::Scheduler(format!("{:?}", e))
}

/// Cron job crawling `start_url` at every tick of `cron` (seconds first,
/// e.g. `0 30 3 * * Mon,Wed,Fri`).
///
/// A tick is skipped while the previous crawl of this job is still running.
pub fn crawl_job<F, P, S>(
    crawler: Arc<Crawler<F, P, S>>,
    cron: &str,
    start_url: String,
    page_budget: u32,
) -> Result<Job, CrawlerError>
where
    F: Fetcher + Send + Sync + 'static,
    P: PageParser + Send + Sync + 'static,
    S: MatchStore + ?Sized + 'static,
{
    let running = Arc::new(Mutex::new(()));
    Job::new_async(cron, move |_uuid, _l| {
        let crawler = crawler.clone();
        let running = running.clone();
        let start_url = start_url.clone();
        Box::pin(async move {
            crawl_unless_running(&crawler, &running, &start_url, page_budget).await;
        })
    })
    .map_err(scheduler_error)
}

/// Crawls unless `running` is held by another crawl. Returns whether it crawled.
async fn crawl_unless_running<F, P, S>(
    crawler: &Crawler<F, P, S>,
    running: &Mutex<()>,
    start_url: &str,
    page_budget: u32,
) -> bool
where
    F: Fetcher + Send + Sync,
    P: PageParser + Send + Sync,
    S: MatchStore + ?Sized,
{
    let Ok(_guard) = running.try_lock() else {
        warn!("Previous crawl still running, skip this one");
        return false;
    };
    crawler.crawl(start_url, page_budget).await;
    true
}

/// Runs `job` until Ctrl-C.
pub async fn run(job: Job) -> Result<(), CrawlerError> {
    let mut sched = JobScheduler::new().await.map_err(scheduler_error)?;
    sched.add(job).await.map_err(scheduler_error)?;
    sched.start().await.map_err(scheduler_error)?;
    info!("Scheduler started");

    tokio::signal::ctrl_c().await.map_err(scheduler_error)?;
    info!("Shutting down scheduler");
    sched.shutdown().await.map_err(scheduler_error)?;
    Ok(())
}
