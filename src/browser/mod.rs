//! Browser automation module
//!
//! Wraps agent-browser CLI for driving the library UI. The walk only talks to
//! the [`Page`] and [`PageProbe`] traits, so it can run against a fake page.

mod executor;
mod response;
pub mod scripts;
mod wait;

use async_trait::async_trait;

use crate::core::{AlbumState, Result};

pub use executor::BrowserExecutor;
pub use wait::{bounded, wait_for_url_change};

/// Actions on the single open page
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate to a URL
    async fn goto(&self, url: &str) -> Result<()>;

    /// Get the live page URL
    async fn current_url(&self) -> Result<String>;

    /// Wait until the page reports basic content load (unbounded; callers time it)
    async fn wait_for_load(&self) -> Result<()>;

    /// Press a key or chord such as `Shift+a`
    async fn press(&self, key: &str) -> Result<()>;

    /// Click the previous-item control through the DOM
    async fn click_previous(&self) -> Result<()>;

    /// Move keyboard focus onto the first cell of the landing grid
    async fn focus_first_cell(&self) -> Result<()>;

    /// Link behind the focused element, if any
    async fn focused_link(&self) -> Result<Option<String>>;

    /// Close the page and release the profile
    async fn close(&self) -> Result<()>;
}

/// Read-only sensing of page state
#[async_trait]
pub trait PageProbe: Send + Sync {
    /// Whether the side metadata panel is shown with content
    async fn is_panel_visible(&self) -> Result<bool>;

    /// Album membership as shown by the info panel
    async fn album_marker_state(&self) -> Result<AlbumState>;

    /// Whether the page is the library grid instead of a single item
    async fn is_home_page(&self) -> Result<bool>;
}
