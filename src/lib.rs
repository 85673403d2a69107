//! photo-archiver - archive a cloud photo library through its web UI
//!
//! Drives a real browser (via agent-browser) from a saved position through
//! the library, archiving every item that is not in an album, until the most
//! recently added item is reached. Progress is checkpointed so an interrupted
//! run resumes where it stopped.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **Browser**: The `Page`/`PageProbe` seams and the agent-browser executor
//! - **Walk**: Checkpoint, item processor, navigation state machine, progress
//!
//! # Usage
//!
//! ```rust,no_run
//! use photo_archiver::{archive_library, Config};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load();
//!     let summary = archive_library(&config, CancellationToken::new()).await.unwrap();
//!     println!("{}", summary.stats.summary());
//! }
//! ```

pub mod browser;
pub mod core;
pub mod shutdown;
pub mod walk;

// Re-export commonly used items
pub use core::{ArchiverError, Config, Locator, Outcome, Result, WalkEnd};
pub use walk::{archive_library, run_walk, WalkSummary};
