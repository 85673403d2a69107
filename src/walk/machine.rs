//! Navigation state machine
//!
//! Pure transitions for one advance step. The navigator performs the page
//! actions; this module only decides what to do next from what was observed.

use crate::core::Outcome;

/// State of a single advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    /// One click-and-wait attempt at the standard bound
    Advancing,
    /// Attempt `n` (1-based) of the post-archive retry loop
    Retrying(u32),
    /// Press the keyboard "previous" key and accept wherever it lands
    FallbackKeyboard,
    /// Reloading the checkpoint after landing on the home page
    Recovering,
    /// The page is on the next item
    Done,
    /// The walk cannot continue
    Failed,
}

/// What an advance attempt produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    /// A locator not seen before this run
    Fresh,
    /// A locator already in the visited set
    Visited,
    /// The library home page
    HomePage,
    /// The URL did not change within the bound
    Unchanged,
    /// The click or a probe failed
    Error,
}

/// Limits for the advance loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavPolicy {
    /// Attempts after an archived item before the keyboard fallback
    pub max_archive_retries: u32,
    /// Consecutive revisits that trigger the keyboard fallback
    pub repeat_threshold: u32,
}

impl Default for NavPolicy {
    fn default() -> Self {
        Self {
            max_archive_retries: 5,
            repeat_threshold: 2,
        }
    }
}

/// Next state plus the updated consecutive-repeat counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: NavState,
    pub repeats: u32,
}

impl Transition {
    fn to(next: NavState, repeats: u32) -> Self {
        Self { next, repeats }
    }
}

/// Initial state of an advance, chosen by the outcome of the item just left
pub fn start(previous: Outcome) -> NavState {
    match previous {
        Outcome::Archived => NavState::Retrying(1),
        Outcome::Skipped | Outcome::Timeout => NavState::Advancing,
    }
}

/// Apply one observation to the current state
pub fn step(state: NavState, observed: Observed, repeats: u32, policy: &NavPolicy) -> Transition {
    match state {
        NavState::Advancing => match observed {
            Observed::Fresh => Transition::to(NavState::Done, 0),
            Observed::Visited => {
                let repeats = repeats + 1;
                if repeats >= policy.repeat_threshold {
                    Transition::to(NavState::FallbackKeyboard, 0)
                } else {
                    Transition::to(NavState::Done, repeats)
                }
            }
            // Picked up by the home-page check at the top of the next iteration
            Observed::HomePage => Transition::to(NavState::Done, repeats),
            Observed::Unchanged | Observed::Error => {
                Transition::to(NavState::FallbackKeyboard, repeats)
            }
        },
        NavState::Retrying(attempt) => match observed {
            Observed::Fresh => Transition::to(NavState::Done, 0),
            Observed::Error => Transition::to(NavState::FallbackKeyboard, repeats),
            Observed::Visited | Observed::HomePage | Observed::Unchanged => {
                if attempt < policy.max_archive_retries {
                    Transition::to(NavState::Retrying(attempt + 1), repeats)
                } else {
                    Transition::to(NavState::FallbackKeyboard, repeats)
                }
            }
        },
        NavState::FallbackKeyboard => Transition::to(NavState::Done, repeats),
        NavState::Recovering | NavState::Done | NavState::Failed => {
            Transition::to(state, repeats)
        }
    }
}

/// Result of reloading the checkpoint from the home page
pub fn recover(still_home: bool) -> NavState {
    if still_home {
        NavState::Failed
    } else {
        NavState::Done
    }
}
