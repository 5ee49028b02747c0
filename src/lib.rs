use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

pub mod assessment;
pub mod checker;
pub mod config;
pub mod fetch;
pub mod filter;
pub mod health;
pub mod notify;
pub mod review;
pub mod store;

mod article;
mod data;
mod error;
mod utils;

pub use article::{ArticleText, NewsLink};
pub use config::{Config, VisitPolicy};
pub use data::Table;
pub use error::MonitorError;

use assessment::{Assessment, Report, Status};
use checker::ViolationChecker;
use filter::FalsePositiveFilter;
use review::{normalize_verdict, ReviewOutcome};
use store::VisitRecord;

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Candidate articles on the listing page, in page order, without duplicates.
    async fn fetch_links(&self) -> Result<Vec<NewsLink>, MonitorError>;
    /// `None` when the page has no extractable body.
    async fn fetch_article(&self, link: &NewsLink) -> Result<Option<ArticleText>, MonitorError>;
}

#[async_trait::async_trait]
pub trait Reviewer: Send + Sync {
    async fn review(&self, text: &ArticleText) -> ReviewOutcome;
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;
    async fn send(&self, subject: &str, body: &str) -> Result<(), MonitorError>;
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    async fn contains(&self, url: &str) -> Result<bool, MonitorError>;
    async fn add(&self, record: &VisitRecord) -> Result<(), MonitorError>;
    async fn warn(&self, url: &str) -> Result<(), MonitorError>;
}

#[async_trait::async_trait]
impl<T: Storage + ?Sized> Storage for Arc<T> {
    async fn contains(&self, url: &str) -> Result<bool, MonitorError> {
        (**self).contains(url).await
    }

    async fn add(&self, record: &VisitRecord) -> Result<(), MonitorError> {
        (**self).add(record).await
    }

    async fn warn(&self, url: &str) -> Result<(), MonitorError> {
        (**self).warn(url).await
    }
}

/// Counters for one pass over the listing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub found: usize,
    pub already_visited: usize,
    pub processed: usize,
    pub cautions: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum ArticleOutcome {
    Checked(Status),
    Skipped,
    /// Recorded with rule findings only.
    ReviewFailed(Status),
}

/// The fetch → check → review → notify → record pipeline.
pub struct Monitor<F, R, N, S> {
    fetcher: F,
    reviewer: R,
    notifier: N,
    storage: S,
    checker: ViolationChecker,
    filter: FalsePositiveFilter,
    policy: VisitPolicy,
    notify_on_clean: bool,
    article_delay: Duration,
}

impl<F, R, N, S> Monitor<F, R, N, S>
where
    F: Fetcher,
    R: Reviewer,
    N: Notifier,
    S: Storage,
{
    pub fn new(fetcher: F, reviewer: R, notifier: N, storage: S, checker: ViolationChecker) -> Self {
        Monitor {
            fetcher,
            reviewer,
            notifier,
            storage,
            checker,
            filter: FalsePositiveFilter::default(),
            policy: VisitPolicy::default(),
            notify_on_clean: false,
            article_delay: Duration::ZERO,
        }
    }

    pub fn with_filter(mut self, filter: FalsePositiveFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_visit_policy(mut self, policy: VisitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_notify_on_clean(mut self, notify_on_clean: bool) -> Self {
        self.notify_on_clean = notify_on_clean;
        self
    }

    pub fn with_article_delay(mut self, delay: Duration) -> Self {
        self.article_delay = delay;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// One pass: every unvisited link on the listing page is handled in order.
    ///
    /// Only storage errors are returned; fetch, review and notification problems are
    /// logged and the pass moves on.
    pub async fn run_once(&self) -> Result<RunSummary, MonitorError> {
        let mut summary = RunSummary::default();

        let links = match self.fetcher.fetch_links().await {
            Ok(links) => links,
            Err(e) => {
                error!(error = %e, "Failed to fetch news links");
                return Ok(summary);
            }
        };
        summary.found = links.len();

        for (i, link) in links.iter().enumerate() {
            if self.storage.contains(&link.url).await? {
                debug!(url = %link.url, "Already processed");
                summary.already_visited += 1;
                continue;
            }

            info!("Processing article {}/{}: {}", i + 1, links.len(), link.title);
            match self.process(i + 1, link).await? {
                ArticleOutcome::Checked(status) => {
                    summary.processed += 1;
                    if status == Status::Caution {
                        summary.cautions += 1;
                    }
                }
                ArticleOutcome::Skipped => summary.skipped += 1,
                ArticleOutcome::ReviewFailed(status) => {
                    summary.failed += 1;
                    if status == Status::Caution {
                        summary.cautions += 1;
                    }
                }
            }

            if !self.article_delay.is_zero() {
                tokio::time::sleep(self.article_delay).await;
            }
        }

        Ok(summary)
    }

    /// Runs a pass now and then once per `period`. Passes never overlap; a pass that
    /// outlasts the period delays the next tick.
    pub async fn run_forever(&self, period: Duration) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            info!("Starting news check");
            match self.run_once().await {
                Ok(s) => info!(
                    found = s.found,
                    already_visited = s.already_visited,
                    processed = s.processed,
                    cautions = s.cautions,
                    skipped = s.skipped,
                    failed = s.failed,
                    "News check finished"
                ),
                Err(e) => error!(error = %e, "News check aborted"),
            }
            info!("Next check in {} minutes", period.as_secs() / 60);
        }
    }

    async fn process(&self, index: usize, link: &NewsLink) -> Result<ArticleOutcome, MonitorError> {
        let text = match self.fetcher.fetch_article(link).await {
            Ok(Some(text)) if !text.is_blank() => text,
            Ok(_) => {
                warn!(url = %link.url, "No content extracted");
                self.skip(link).await?;
                return Ok(ArticleOutcome::Skipped);
            }
            Err(e) => {
                warn!(url = %link.url, error = %e, "Failed to fetch article");
                self.skip(link).await?;
                return Ok(ArticleOutcome::Skipped);
            }
        };

        debug!(
            url = %link.url,
            headline = text.headline().unwrap_or_default(),
            "Checking article"
        );
        let violations = self.checker.check(&text);

        let (assessment, reviewed) = match self.reviewer.review(&text).await {
            ReviewOutcome::Verdict(raw) => (
                Assessment::new(violations, &self.filter.apply(&normalize_verdict(&raw))),
                true,
            ),
            ReviewOutcome::Failure(reason) => {
                error!(url = %link.url, reason = %reason, "Grammar review failed");
                self.storage.warn(&link.url).await?;
                (Assessment::without_review(violations, reason), false)
            }
        };
        let status = assessment.status();
        info!(
            url = %link.url,
            status = %status,
            violations = assessment.violations.len(),
            "Article checked"
        );

        if status == Status::Caution || self.notify_on_clean {
            let report = Report {
                index,
                link,
                assessment: &assessment,
                checked_at: Utc::now(),
            };
            if let Err(e) = self.notifier.send(&report.subject(), &report.body()).await {
                error!(url = %link.url, error = %e, "Failed to send report");
            }
        }

        self.storage
            .add(&VisitRecord {
                url: link.url.clone(),
                title: link.title.clone(),
                status: status.to_string(),
                mistakes: assessment.mistakes(),
            })
            .await?;

        if reviewed {
            Ok(ArticleOutcome::Checked(status))
        } else {
            Ok(ArticleOutcome::ReviewFailed(status))
        }
    }

    async fn skip(&self, link: &NewsLink) -> Result<(), MonitorError> {
        self.storage.warn(&link.url).await?;
        if self.policy == VisitPolicy::MarkAlways {
            self.storage
                .add(&VisitRecord {
                    url: link.url.clone(),
                    title: link.title.clone(),
                    status: Status::Skipped.to_string(),
                    mistakes: None,
                })
                .await?;
        }
        Ok(())
    }
}
