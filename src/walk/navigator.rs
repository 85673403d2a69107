//! Navigation controller
//!
//! Moves the page to the next item and verifies where it actually landed.
//! The previous-item control can silently do nothing, skip ahead twice or
//! bounce to the home page, so every advance is provisional until checked
//! against the visited set.

use std::collections::HashSet;

use tokio::time::sleep;

use crate::browser::{bounded, wait_for_url_change, Page, PageProbe};
use crate::core::config::TimingConfig;
use crate::core::{Config, Locator, Outcome};
use crate::walk::machine::{self, NavPolicy, NavState, Observed};

/// What one advance did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdvanceReport {
    /// Click-and-wait attempts made
    pub attempts: u32,
    /// Whether the keyboard fallback was pressed
    pub used_fallback: bool,
}

/// Advances the walk and detects stuck or backward navigation
#[derive(Debug)]
pub struct Navigator {
    policy: NavPolicy,
    timings: TimingConfig,
    /// Keyboard key for "previous item"
    previous_key: String,
    /// Locators left behind during this run
    visited: HashSet<Locator>,
    /// Consecutive advances that landed on a visited locator
    repeats: u32,
}

impl Navigator {
    /// Create a navigator from configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            policy: NavPolicy {
                max_archive_retries: config.walk.max_archive_retries,
                repeat_threshold: config.walk.repeat_threshold,
            },
            timings: config.timings.clone(),
            previous_key: config.keys.previous.clone(),
            visited: HashSet::new(),
            repeats: 0,
        }
    }

    /// Locators visited so far
    pub fn visited(&self) -> &HashSet<Locator> {
        &self.visited
    }

    /// Current consecutive-repeat count
    pub fn repeats(&self) -> u32 {
        self.repeats
    }

    /// Reload the checkpoint after an unwanted jump to the home page.
    ///
    /// Makes exactly one navigation; returns [`NavState::Done`] if the page
    /// is back on an item and [`NavState::Failed`] otherwise.
    pub async fn recover<P>(&self, page: &P, checkpoint: &Locator) -> NavState
    where
        P: Page + PageProbe + ?Sized,
    {
        tracing::warn!(%checkpoint, "On the home page, reloading checkpoint");

        let reload = async {
            page.goto(checkpoint.as_str()).await?;
            bounded("page load", self.timings.load_timeout(), page.wait_for_load()).await?;
            page.is_home_page().await
        };

        match reload.await {
            Ok(still_home) => machine::recover(still_home),
            Err(e) => {
                tracing::warn!("Recovery navigation failed: {}", e);
                NavState::Failed
            }
        }
    }

    /// Move from `current` to the next item.
    ///
    /// `previous` is the outcome of the item being left; archived items get a
    /// longer settle and a retry loop because the UI reflows after archiving.
    pub async fn advance<P>(&mut self, page: &P, current: &Locator, previous: Outcome) -> AdvanceReport
    where
        P: Page + PageProbe + ?Sized,
    {
        self.visited.insert(current.clone());

        let mut report = AdvanceReport::default();
        let mut state = machine::start(previous);

        if previous == Outcome::Archived {
            sleep(self.timings.post_archive_settle()).await;
        }

        loop {
            match state {
                NavState::Advancing | NavState::Retrying(_) => {
                    let bound = if state == NavState::Advancing {
                        self.timings.url_timeout()
                    } else {
                        self.timings.retry_url_timeout()
                    };
                    report.attempts += 1;
                    let observed = self.attempt(page, bound).await;
                    tracing::debug!(?state, ?observed, repeats = self.repeats, "Advance attempt");

                    let transition = machine::step(state, observed, self.repeats, &self.policy);
                    self.repeats = transition.repeats;
                    state = transition.next;
                }
                NavState::FallbackKeyboard => {
                    tracing::info!(key = %self.previous_key, "Falling back to keyboard navigation");
                    self.press_previous(page).await;
                    report.used_fallback = true;
                    state = machine::step(state, Observed::Fresh, self.repeats, &self.policy).next;
                }
                NavState::Recovering | NavState::Done | NavState::Failed => break,
            }
        }

        report
    }

    /// Press the keyboard "previous" key and wait for the page to leave the item.
    ///
    /// The next iteration reads the URL, so returning before the key lands
    /// would process the same item again.
    async fn press_previous<P>(&self, page: &P)
    where
        P: Page + PageProbe + ?Sized,
    {
        let before = match page.current_url().await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!("Could not read URL before keyboard fallback: {}", e);
                None
            }
        };

        if let Err(e) = page.press(&self.previous_key).await {
            tracing::warn!("Keyboard fallback failed: {}", e);
            return;
        }

        let Some(before) = before else {
            return;
        };

        match wait_for_url_change(page, &before, self.timings.url_timeout(), self.timings.poll_interval()).await {
            Ok(after) => tracing::debug!(%after, "Keyboard fallback moved"),
            Err(e) if e.is_timeout() => tracing::warn!("Keyboard fallback did not change the URL"),
            Err(e) => tracing::warn!("Waiting after keyboard fallback failed: {}", e),
        }
    }

    /// Click the previous-item control once and classify where it led
    async fn attempt<P>(&self, page: &P, bound: std::time::Duration) -> Observed
    where
        P: Page + PageProbe + ?Sized,
    {
        let before = match page.current_url().await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Could not read URL before advancing: {}", e);
                return Observed::Error;
            }
        };

        if let Err(e) = page.click_previous().await {
            tracing::warn!("Previous-item click failed: {}", e);
            return Observed::Error;
        }

        let after = match wait_for_url_change(page, &before, bound, self.timings.poll_interval()).await {
            Ok(url) => url,
            Err(e) if e.is_timeout() => return Observed::Unchanged,
            Err(e) => {
                tracing::warn!("Waiting for navigation failed: {}", e);
                return Observed::Error;
            }
        };

        match page.is_home_page().await {
            Ok(true) => Observed::HomePage,
            Ok(false) if self.visited.contains(&Locator::from_url(&after)) => Observed::Visited,
            Ok(false) => Observed::Fresh,
            Err(e) => {
                tracing::warn!("Home page probe failed: {}", e);
                Observed::Error
            }
        }
    }
}
