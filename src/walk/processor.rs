//! Item processor
//!
//! Decides, for the item currently on screen, whether to archive it.

use tokio::time::sleep;

use crate::browser::{bounded, Page, PageProbe};
use crate::core::config::{KeyConfig, TimingConfig};
use crate::core::{AlbumState, Config, Outcome, Result};

/// Acts on one item at a time
#[derive(Debug, Clone)]
pub struct ItemProcessor {
    timings: TimingConfig,
    keys: KeyConfig,
    /// Evaluate but never press the archive chord
    dry_run: bool,
}

impl ItemProcessor {
    /// Create a processor from configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            timings: config.timings.clone(),
            keys: config.keys.clone(),
            dry_run: config.walk.dry_run,
        }
    }

    /// Process the item on screen.
    ///
    /// Never fails: any error along the way degrades to [`Outcome::Timeout`].
    pub async fn process<P>(&self, page: &P) -> Outcome
    where
        P: Page + PageProbe + ?Sized,
    {
        match self.try_process(page).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Item not processed: {}", e);
                Outcome::Timeout
            }
        }
    }

    async fn try_process<P>(&self, page: &P) -> Result<Outcome>
    where
        P: Page + PageProbe + ?Sized,
    {
        bounded("page load", self.timings.load_timeout(), page.wait_for_load()).await?;

        self.ensure_panel(page).await?;

        let state = bounded(
            "album check",
            self.timings.album_check_timeout(),
            page.album_marker_state(),
        )
        .await?;

        match state {
            AlbumState::Ambiguous { regions } => {
                tracing::warn!(regions, "Expected exactly one info region, leaving item alone");
                Ok(Outcome::Skipped)
            }
            AlbumState::InAlbum => Ok(Outcome::Skipped),
            AlbumState::NotInAlbum if self.dry_run => {
                tracing::info!("Dry run: would archive");
                Ok(Outcome::Skipped)
            }
            AlbumState::NotInAlbum => {
                page.press(&self.keys.archive).await?;
                sleep(self.timings.archive_settle()).await;
                Ok(Outcome::Archived)
            }
        }
    }

    /// Show the info panel if it is hidden
    async fn ensure_panel<P>(&self, page: &P) -> Result<()>
    where
        P: Page + PageProbe + ?Sized,
    {
        let visible = bounded(
            "info panel",
            self.timings.album_check_timeout(),
            page.is_panel_visible(),
        )
        .await?;

        if !visible {
            tracing::debug!("Info panel hidden, toggling");
            page.press(&self.keys.toggle_panel).await?;
            sleep(self.timings.panel_settle()).await;
        }

        Ok(())
    }
}
