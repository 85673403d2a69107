//! Walk runner
//!
//! Drives the loop: home-page check → boundary check → process → checkpoint →
//! advance, until the most recent item is reached or the walk cannot go on.

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::browser::{bounded, BrowserExecutor, Page, PageProbe};
use crate::core::{ArchiverError, Config, Locator, Outcome, Result, WalkEnd};
use crate::walk::boundary::detect_boundary;
use crate::walk::checkpoint::CheckpointStore;
use crate::walk::machine::NavState;
use crate::walk::navigator::Navigator;
use crate::walk::processor::ItemProcessor;
use crate::walk::progress::{ProgressReporter, RunStats};

/// Result of a finished walk
#[derive(Debug, Clone)]
pub struct WalkSummary {
    /// Why the walk stopped
    pub end: WalkEnd,
    /// Final counters
    pub stats: RunStats,
    /// The item the walk was heading for
    pub boundary: Locator,
}

/// Runs the item loop on an open page
pub struct Walker {
    processor: ItemProcessor,
    navigator: Navigator,
    checkpoint: CheckpointStore,
    reporter: ProgressReporter,
    stats: RunStats,
    /// Last locator known to be persisted
    last_checkpoint: Locator,
    max_items: Option<usize>,
    /// Consecutive unreadable URLs before the walk gives up
    max_url_failures: u32,
    poll_interval: Duration,
    cancel: CancellationToken,
}

impl Walker {
    /// Create a walker resuming from `start`
    pub fn new(
        config: &Config,
        checkpoint: CheckpointStore,
        start: Locator,
        reporter: ProgressReporter,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            processor: ItemProcessor::from_config(config),
            navigator: Navigator::from_config(config),
            checkpoint,
            reporter,
            stats: RunStats::new(config.walk.recent_events),
            last_checkpoint: start,
            max_items: config.walk.max_items,
            max_url_failures: config.walk.max_url_failures.max(1),
            poll_interval: config.timings.poll_interval(),
            cancel,
        }
    }

    /// Counters so far
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Navigator state (visited set, repeat counter)
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Last locator written to the checkpoint
    pub fn last_checkpoint(&self) -> &Locator {
        &self.last_checkpoint
    }

    /// Walk until `boundary` or another stop condition.
    ///
    /// Browser errors never escape: they become outcomes, fallbacks, or a
    /// [`WalkEnd`] once the page stays unreadable.
    pub async fn run<P>(&mut self, page: &P, boundary: &Locator) -> WalkEnd
    where
        P: Page + PageProbe + ?Sized,
    {
        let mut url_failures = 0;

        let end = loop {
            if self.cancel.is_cancelled() {
                break WalkEnd::Interrupted;
            }

            if let Some(max) = self.max_items {
                if self.stats.processed() >= max {
                    break WalkEnd::ItemLimit(max);
                }
            }

            match page.is_home_page().await {
                Ok(true) => {
                    self.reporter
                        .event(&mut self.stats, "Redirected to home page, recovering");
                    let state = self.navigator.recover(page, &self.last_checkpoint).await;
                    if state == NavState::Failed {
                        break WalkEnd::StuckOnHomePage;
                    }
                    continue;
                }
                Ok(false) => {}
                Err(e) => tracing::warn!("Home page probe failed: {}", e),
            }

            let current = match page.current_url().await {
                Ok(url) => {
                    url_failures = 0;
                    Locator::from_url(&url)
                }
                Err(e) => {
                    url_failures += 1;
                    self.reporter.event(
                        &mut self.stats,
                        format!("Could not read page URL ({}/{}): {}", url_failures, self.max_url_failures, e),
                    );
                    if url_failures >= self.max_url_failures {
                        break WalkEnd::PageUnreadable(url_failures);
                    }
                    sleep(self.poll_interval).await;
                    continue;
                }
            };

            if current == *boundary {
                break WalkEnd::BoundaryReached;
            }

            let outcome = self.processor.process(page).await;
            self.reporter.outcome(&mut self.stats, outcome, &current);

            // An archived item no longer resolves by URL, keep the previous checkpoint
            if outcome != Outcome::Archived {
                match self.checkpoint.write(&current) {
                    Ok(true) => self.last_checkpoint = current.clone(),
                    Ok(false) => {}
                    Err(e) => tracing::warn!("{}", e),
                }
            }

            let report = self.navigator.advance(page, &current, outcome).await;
            if report.used_fallback {
                self.stats.fallbacks += 1;
                self.reporter.event(
                    &mut self.stats,
                    format!("Keyboard fallback after {} attempt(s)", report.attempts),
                );
            }
        };

        self.reporter
            .event(&mut self.stats, format!("Walk finished: {}", end));
        end
    }
}

/// Detect the boundary, open the checkpoint and walk.
///
/// The page must already be running; it is not closed here.
pub async fn run_walk<P>(
    page: &P,
    config: &Config,
    checkpoint: CheckpointStore,
    start: Locator,
    reporter: ProgressReporter,
    cancel: CancellationToken,
) -> Result<WalkSummary>
where
    P: Page + PageProbe + ?Sized,
{
    page.goto(&config.library.landing_url).await?;
    let boundary = detect_boundary(page, &config.timings).await?;

    tracing::info!(start = %start, "Resuming from checkpoint");
    page.goto(start.as_str()).await?;
    if let Err(e) = bounded("page load", config.timings.load_timeout(), page.wait_for_load()).await {
        tracing::warn!("Checkpoint page slow to load: {}", e);
    }

    let mut walker = Walker::new(config, checkpoint, start, reporter, cancel);
    let end = walker.run(page, &boundary).await;

    Ok(WalkSummary {
        end,
        stats: walker.stats().clone(),
        boundary,
    })
}

/// Full run against a real browser.
///
/// The checkpoint is read before any browser starts; the browser is closed
/// on every path once it has been launched.
pub async fn archive_library(config: &Config, cancel: CancellationToken) -> Result<WalkSummary> {
    let checkpoint = CheckpointStore::new(
        config.walk.checkpoint_file.clone(),
        config.library.item_prefix.clone(),
    );
    let start = checkpoint.read()?;

    if !BrowserExecutor::is_available().await {
        return Err(ArchiverError::AgentBrowserNotFound);
    }

    let browser = BrowserExecutor::new(config.browser.clone(), config.selectors.clone());

    let result = async {
        browser.launch("about:blank").await?;
        run_walk(
            &browser,
            config,
            checkpoint,
            start,
            ProgressReporter::new(),
            cancel,
        )
        .await
    }
    .await;

    if let Err(e) = browser.close().await {
        tracing::warn!("Failed to close browser: {}", e);
    }

    result
}
