//! Walk module - the archiving walk through the library
//!
//! Checkpointing, item processing, navigation and progress reporting.

pub mod boundary;
pub mod checkpoint;
pub mod machine;
pub mod navigator;
pub mod processor;
pub mod progress;
mod runner;

pub use boundary::detect_boundary;
pub use checkpoint::CheckpointStore;
pub use machine::{NavPolicy, NavState, Observed};
pub use navigator::{AdvanceReport, Navigator};
pub use processor::ItemProcessor;
pub use progress::{ProgressReporter, RunStats};
pub use runner::{archive_library, run_walk, WalkSummary, Walker};
