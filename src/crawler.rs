use crate::{
    ingest, CrawlerError, DateNormalizer, Fetcher, MatchCandidate, MatchRecordExtractor,
    MatchStore, PageParser, ParsedPage,
};
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Walks the results pages from a start page backwards through the
/// "previous" links, one page at a time.
///
/// Every page is written to the store as soon as it is read, before the
/// older page is requested. A page that cannot be fetched or parsed ends the
/// walk there; what was read before it is kept and returned.
pub struct Crawler<F, P, S: ?Sized> {
    fetcher: F,
    parser: P,
    store: Arc<S>,
    normalizer: DateNormalizer,
}

impl<F, P, S> Crawler<F, P, S>
where
    F: Fetcher + Send + Sync,
    P: PageParser + Send + Sync,
    S: MatchStore + ?Sized,
{
    pub fn new(fetcher: F, parser: P, store: Arc<S>, normalizer: DateNormalizer) -> Self {
        Self {
            fetcher,
            parser,
            store,
            normalizer,
        }
    }

    /// Visits at most `page_budget` pages. Never fails: page errors are
    /// logged and cut the walk short.
    #[tracing::instrument(skip(self))]
    pub async fn crawl(&self, start_url: &str, page_budget: u32) -> Vec<MatchCandidate> {
        let extractor = MatchRecordExtractor::new(self.normalizer);
        let candidates = self
            .crawl_page(start_url.to_string(), page_budget, extractor)
            .await;
        info!("Crawl done, {} matches read", candidates.len());
        candidates
    }

    fn crawl_page(
        &self,
        url: String,
        page_budget: u32,
        mut extractor: MatchRecordExtractor,
    ) -> BoxFuture<'_, Vec<MatchCandidate>> {
        async move {
            if page_budget == 0 {
                debug!("Page budget exhausted before {}", url);
                return vec![];
            }

            let page = match self.visit(&url).await {
                Ok(page) => page,
                Err(e) => {
                    error!("Stop at {}: {}", url, e);
                    return vec![];
                }
            };

            let has_results = !page.nodes.is_empty();
            let mut candidates = extractor.extract(page.nodes);

            let report = ingest(self.store.as_ref(), &candidates).await;
            info!(
                "{}: {} matches, {} inserted, {} known, {} failed",
                url,
                candidates.len(),
                report.inserted,
                report.skipped,
                report.failed
            );

            match page.previous_page_url {
                Some(previous) if has_results => {
                    let older = self
                        .crawl_page(previous, page_budget - 1, extractor)
                        .await;
                    candidates.extend(older);
                }
                Some(_) => debug!("No results table at {}, stop", url),
                None => debug!("No previous page after {}", url),
            }

            candidates
        }
        .boxed()
    }

    async fn visit(&self, url: &str) -> Result<ParsedPage, CrawlerError> {
        let html = self.fetcher.fetch(url).await?;
        self.parser.parse(&html)
    }
}
