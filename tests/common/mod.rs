//! In-memory photo library that behaves like the web UI
//!
//! Items are ordered oldest first; "previous" moves one item towards the
//! newest, which is also what the landing grid shows first.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use photo_archiver::browser::{Page, PageProbe};
use photo_archiver::core::config::TimingConfig;
use photo_archiver::core::{AlbumState, ArchiverError, Result};
use photo_archiver::Config;

pub const LANDING: &str = "https://service/";
pub const PREFIX: &str = "https://service/photo/";

/// How the next click on the previous-item control behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Click {
    /// Move one item towards the newest
    Normal,
    /// Nothing happens
    NoOp,
    /// Jump to the item at this index
    Jump(usize),
    /// Bounce to the landing grid
    Home,
    /// The control is missing
    Fail,
}

#[derive(Debug, Clone)]
pub struct FakeItem {
    pub id: u32,
    pub in_album: bool,
    pub regions: usize,
    pub hangs: bool,
}

impl FakeItem {
    pub fn plain(id: u32) -> Self {
        Self {
            id,
            in_album: false,
            regions: 1,
            hangs: false,
        }
    }

    pub fn album(id: u32) -> Self {
        Self {
            in_album: true,
            ..Self::plain(id)
        }
    }

    pub fn regions(id: u32, regions: usize) -> Self {
        Self {
            regions,
            ..Self::plain(id)
        }
    }

    pub fn hanging(id: u32) -> Self {
        Self {
            hangs: true,
            ..Self::plain(id)
        }
    }
}

/// Normalized URL of item `id`
pub fn item_url(id: u32) -> String {
    format!("{}{}", PREFIX, id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Item(usize),
    Home,
}

#[derive(Debug)]
struct State {
    items: Vec<FakeItem>,
    position: Position,
    panel_visible: bool,
    clicks: VecDeque<Click>,
    archived: HashSet<u32>,
    gotos: Vec<String>,
    presses: Vec<String>,
    click_count: usize,
    recovery_lands_home: bool,
    focused: Option<usize>,
    url_reads: usize,
    failing_reads: HashSet<usize>,
    key_lag: usize,
    pending_step: Option<usize>,
}

pub struct FakeLibrary {
    state: Mutex<State>,
}

impl FakeLibrary {
    pub fn new(items: Vec<FakeItem>) -> Self {
        Self {
            state: Mutex::new(State {
                items,
                position: Position::Home,
                panel_visible: false,
                clicks: VecDeque::new(),
                archived: HashSet::new(),
                gotos: Vec::new(),
                presses: Vec::new(),
                click_count: 0,
                recovery_lands_home: false,
                focused: None,
                url_reads: 0,
                failing_reads: HashSet::new(),
                key_lag: 0,
                pending_step: None,
            }),
        }
    }

    /// Put the page on item `id` without recording a navigation
    pub fn place_at(&self, id: u32) {
        let mut state = self.state.lock().unwrap();
        let idx = state.items.iter().position(|i| i.id == id).unwrap();
        state.position = Position::Item(idx);
    }

    pub fn place_home(&self) {
        self.state.lock().unwrap().position = Position::Home;
    }

    pub fn script_clicks(&self, clicks: impl IntoIterator<Item = Click>) {
        self.state.lock().unwrap().clicks.extend(clicks);
    }

    pub fn recovery_lands_home(&self) {
        self.state.lock().unwrap().recovery_lands_home = true;
    }

    /// Make the given URL reads fail (1-based, counted over the whole run)
    pub fn fail_url_reads(&self, reads: impl IntoIterator<Item = usize>) {
        self.state.lock().unwrap().failing_reads.extend(reads);
    }

    /// Keyboard navigation shows up only after this many further URL reads
    pub fn lag_key_navigation(&self, reads: usize) {
        self.state.lock().unwrap().key_lag = reads;
    }

    pub fn gotos(&self) -> Vec<String> {
        self.state.lock().unwrap().gotos.clone()
    }

    pub fn presses(&self) -> Vec<String> {
        self.state.lock().unwrap().presses.clone()
    }

    pub fn presses_of(&self, key: &str) -> usize {
        self.presses().iter().filter(|k| k.as_str() == key).count()
    }

    pub fn archived(&self) -> HashSet<u32> {
        self.state.lock().unwrap().archived.clone()
    }

    pub fn click_count(&self) -> usize {
        self.state.lock().unwrap().click_count
    }

    pub fn current_id(&self) -> Option<u32> {
        let state = self.state.lock().unwrap();
        match state.position {
            Position::Item(idx) => Some(state.items[idx].id),
            Position::Home => None,
        }
    }
}

fn step_newer(state: &mut State) {
    if let Position::Item(idx) = state.position {
        state.position = Position::Item((idx + 1).min(state.items.len() - 1));
        state.panel_visible = false;
    }
}

#[async_trait]
impl Page for FakeLibrary {
    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.gotos.push(url.to_string());

        let target = state
            .items
            .iter()
            .position(|i| item_url(i.id) == photo_archiver::core::normalize(url));

        state.position = match target {
            Some(_) if state.recovery_lands_home => Position::Home,
            Some(idx) => Position::Item(idx),
            None => Position::Home,
        };
        state.panel_visible = false;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.url_reads += 1;
        if state.failing_reads.contains(&state.url_reads) {
            return Err(ArchiverError::timeout("agent-browser get", Duration::from_secs(30)));
        }
        match state.pending_step {
            Some(0) => {
                state.pending_step = None;
                step_newer(&mut state);
            }
            Some(left) => state.pending_step = Some(left - 1),
            None => {}
        }
        Ok(match state.position {
            // Routed through account slot 0, like the live service
            Position::Item(idx) => format!("https://service/u/0/photo/{}", state.items[idx].id),
            Position::Home => LANDING.to_string(),
        })
    }

    async fn wait_for_load(&self) -> Result<()> {
        let hangs = {
            let state = self.state.lock().unwrap();
            matches!(state.position, Position::Item(idx) if state.items[idx].hangs)
        };
        if hangs {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn press(&self, key: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.presses.push(key.to_string());
        match key {
            "i" => state.panel_visible = !state.panel_visible,
            "Shift+a" => {
                if let Position::Item(idx) = state.position {
                    let id = state.items[idx].id;
                    state.archived.insert(id);
                }
            }
            "ArrowLeft" if state.key_lag > 0 => state.pending_step = Some(state.key_lag),
            "ArrowLeft" => step_newer(&mut state),
            _ => {}
        }
        Ok(())
    }

    async fn click_previous(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.click_count += 1;
        let click = state.clicks.pop_front().unwrap_or(Click::Normal);
        match click {
            Click::Normal => step_newer(&mut state),
            Click::NoOp => {}
            Click::Jump(idx) => state.position = Position::Item(idx),
            Click::Home => state.position = Position::Home,
            Click::Fail => return Err(ArchiverError::browser("previous-item control not found")),
        }
        Ok(())
    }

    async fn focus_first_cell(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.position != Position::Home || state.items.is_empty() {
            return Err(ArchiverError::browser("no grid cell to focus"));
        }
        state.focused = Some(state.items.len() - 1);
        Ok(())
    }

    async fn focused_link(&self) -> Result<Option<String>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .focused
            .map(|idx| format!("https://service/u/0/photo/{}", state.items[idx].id)))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl PageProbe for FakeLibrary {
    async fn is_panel_visible(&self) -> Result<bool> {
        Ok(self.state.lock().unwrap().panel_visible)
    }

    async fn album_marker_state(&self) -> Result<AlbumState> {
        let state = self.state.lock().unwrap();
        match state.position {
            Position::Item(idx) if state.panel_visible => {
                let item = &state.items[idx];
                Ok(AlbumState::from_probe(item.regions, item.in_album))
            }
            Position::Item(_) => Ok(AlbumState::Ambiguous { regions: 0 }),
            Position::Home => Err(ArchiverError::browser("no item on screen")),
        }
    }

    async fn is_home_page(&self) -> Result<bool> {
        Ok(self.state.lock().unwrap().position == Position::Home)
    }
}

/// Configuration pointed at the fake service with near-zero waits
pub fn test_config(checkpoint: &Path) -> Config {
    let mut config = Config::default();
    config.library.landing_url = LANDING.to_string();
    config.library.item_prefix = PREFIX.to_string();
    config.timings = TimingConfig::instant();
    config.walk.checkpoint_file = checkpoint.to_path_buf();
    config.walk.dry_run = false;
    config.walk.max_items = None;
    config
}
