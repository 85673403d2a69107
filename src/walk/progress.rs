//! Run statistics and console progress
//!
//! Counts outcomes and keeps a short window of recent event messages.

use std::collections::VecDeque;
use std::io::{IsTerminal, Write};
use std::time::{Duration, Instant};

use crate::core::{Locator, Outcome};

/// Counters and recent events for one run
#[derive(Debug, Clone)]
pub struct RunStats {
    pub archived: usize,
    pub skipped: usize,
    pub timed_out: usize,
    /// Keyboard fallbacks issued by the navigator
    pub fallbacks: usize,
    /// Most recent event messages, oldest first
    recent: VecDeque<String>,
    /// Maximum number of recent events kept
    max_recent: usize,
    started: Instant,
}

impl RunStats {
    /// Create empty stats keeping `max_recent` events
    pub fn new(max_recent: usize) -> Self {
        Self {
            archived: 0,
            skipped: 0,
            timed_out: 0,
            fallbacks: 0,
            recent: VecDeque::with_capacity(max_recent),
            max_recent,
            started: Instant::now(),
        }
    }

    /// Count one processed item
    pub fn record(&mut self, outcome: Outcome, locator: &Locator) {
        match outcome {
            Outcome::Archived => self.archived += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Timeout => self.timed_out += 1,
        }
        self.event(format!("{}: {}", outcome, locator));
    }

    /// Add a free-form event message
    pub fn event(&mut self, message: impl Into<String>) {
        if self.max_recent == 0 {
            return;
        }
        self.recent.push_back(message.into());
        while self.recent.len() > self.max_recent {
            self.recent.pop_front();
        }
    }

    /// Total processed items
    pub fn processed(&self) -> usize {
        self.archived + self.skipped + self.timed_out
    }

    /// Recent event messages, oldest first
    pub fn recent(&self) -> impl Iterator<Item = &str> {
        self.recent.iter().map(String::as_str)
    }

    /// Time since the run started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// One-line count summary
    pub fn summary(&self) -> String {
        format!(
            "archived: {}  skipped: {}  timeout: {}  fallbacks: {}",
            self.archived, self.skipped, self.timed_out, self.fallbacks
        )
    }

    /// Multi-line console view: counts then recent events
    pub fn render(&self) -> String {
        let mut output = String::new();
        output.push_str(&self.summary());
        output.push_str("\n─────────────────────────────\n");
        for message in &self.recent {
            output.push_str("  ");
            output.push_str(message);
            output.push('\n');
        }
        output
    }
}

/// Re-renders [`RunStats`] on the console after each event
pub struct ProgressReporter {
    /// Redraw in place only on an interactive terminal
    interactive: bool,
}

impl ProgressReporter {
    /// Create a reporter for stdout
    pub fn new() -> Self {
        Self {
            interactive: std::io::stdout().is_terminal(),
        }
    }

    /// Create a reporter that never draws (logs only)
    pub fn quiet() -> Self {
        Self { interactive: false }
    }

    /// Log an event, store it and redraw
    pub fn event(&self, stats: &mut RunStats, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        stats.event(message);
        self.redraw(stats);
    }

    /// Log a processed item, count it and redraw
    pub fn outcome(&self, stats: &mut RunStats, outcome: Outcome, locator: &Locator) {
        tracing::info!(%outcome, %locator, "Processed item");
        stats.record(outcome, locator);
        self.redraw(stats);
    }

    fn redraw(&self, stats: &RunStats) {
        if !self.interactive {
            return;
        }
        let mut stdout = std::io::stdout();
        // Clear screen, cursor home
        let _ = write!(stdout, "\x1b[2J\x1b[H{}", stats.render());
        let _ = stdout.flush();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
