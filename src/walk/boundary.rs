//! Boundary detection
//!
//! Finds the most recently added item, which ends the walk.

use tokio::time::sleep;

use crate::browser::{bounded, Page};
use crate::core::config::TimingConfig;
use crate::core::{ArchiverError, Locator, Result};

/// Resolve the most recent item from the landing view.
///
/// The page must already show the library grid. Focus moves onto the first
/// cell and the link behind it becomes the boundary.
pub async fn detect_boundary<P>(page: &P, timings: &TimingConfig) -> Result<Locator>
where
    P: Page + ?Sized,
{
    bounded("landing page load", timings.load_timeout(), page.wait_for_load()).await?;

    page.focus_first_cell().await?;
    sleep(timings.boundary_settle()).await;

    let link = page
        .focused_link()
        .await?
        .ok_or_else(|| ArchiverError::browser("focused grid cell has no link"))?;

    let boundary = Locator::from_url(&link);
    tracing::info!(%boundary, "Most recent item");
    Ok(boundary)
}
