//! Configuration management for the archiver
//!
//! Supports environment variables, config files, and runtime overrides.
//! Selectors and key bindings live here because the target UI can change
//! them at any time.
//!
//! Config file location: ~/.config/photo-archiver/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{ArchiverError, Result};

/// Main configuration for the archiver
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Target library addresses
    #[serde(default)]
    pub library: LibraryConfig,
    /// Browser configuration
    #[serde(default)]
    pub browser: BrowserConfig,
    /// Waits and settle delays
    #[serde(default)]
    pub timings: TimingConfig,
    /// Walk behaviour
    #[serde(default)]
    pub walk: WalkConfig,
    /// DOM selectors for the target UI
    #[serde(default)]
    pub selectors: SelectorConfig,
    /// Keyboard shortcuts of the target UI
    #[serde(default)]
    pub keys: KeyConfig,
}

/// Addresses of the photo library
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Landing (grid) view of the library
    pub landing_url: String,
    /// Prefix every item detail URL starts with, after normalization
    pub item_prefix: String,
}

/// Browser automation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Session name for agent-browser
    pub session_name: String,
    /// Persistent profile directory (cookies, login state)
    pub profile_dir: PathBuf,
    /// Whether to run in headed mode (visible browser)
    pub headed: bool,
    /// User agent presented to the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
    /// Extra browser launch arguments
    pub launch_args: Vec<String>,
    /// Upper bound for a single agent-browser invocation in ms
    pub command_timeout_ms: u64,
}

/// Bounds for waits and settle delays, all in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Page content load
    pub load_timeout_ms: u64,
    /// Panel visibility and album membership probes
    pub album_check_timeout_ms: u64,
    /// URL change after a single advance
    pub url_timeout_ms: u64,
    /// URL change per retry after archiving
    pub retry_url_timeout_ms: u64,
    /// Pause after toggling the info panel
    pub panel_settle_ms: u64,
    /// Pause after the archive chord
    pub archive_settle_ms: u64,
    /// Pause before advancing away from an archived item
    pub post_archive_settle_ms: u64,
    /// Pause after focusing the first grid cell
    pub boundary_settle_ms: u64,
    /// Interval between URL polls
    pub poll_interval_ms: u64,
}

/// Walk behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Checkpoint file holding the resume position
    pub checkpoint_file: PathBuf,
    /// Advance attempts after an archived item before the keyboard fallback
    pub max_archive_retries: u32,
    /// Consecutive revisits that trigger the keyboard fallback
    pub repeat_threshold: u32,
    /// Number of recent events shown in the console summary
    pub recent_events: usize,
    /// Consecutive failed URL reads before the walk stops
    pub max_url_failures: u32,
    /// Evaluate items without pressing the archive chord
    pub dry_run: bool,
    /// Stop after this many processed items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    /// Whether to show debug output
    pub debug: bool,
}

/// DOM selectors for the target UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// The injected "previous item" control
    pub previous_control: String,
    /// The side metadata panel
    pub info_panel: String,
    /// Info regions inside the panel
    pub info_region: String,
    /// Album membership marker inside an info region
    pub album_marker: String,
    /// Cells of the landing grid
    pub grid_cell: String,
}

/// Keyboard shortcuts of the target UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// Toggles the info panel
    pub toggle_panel: String,
    /// Archives the current item
    pub archive: String,
    /// Moves to the previous item
    pub previous: String,
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name).ok().map(|v| v == "true" || v == "1")
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            landing_url: env::var("ARCHIVER_LANDING_URL")
                .unwrap_or_else(|_| "https://photos.google.com/".to_string()),
            item_prefix: env::var("ARCHIVER_ITEM_PREFIX")
                .unwrap_or_else(|_| "https://photos.google.com/photo/".to_string()),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            session_name: env::var("ARCHIVER_BROWSER_SESSION")
                .unwrap_or_else(|_| "photo-archiver".to_string()),
            profile_dir: env::var("ARCHIVER_PROFILE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("browser-profile")),
            headed: env_flag("ARCHIVER_HEADED").unwrap_or(false),
            user_agent: Some(
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            viewport_width: 1440,
            viewport_height: 900,
            launch_args: vec!["--disable-blink-features=AutomationControlled".to_string()],
            command_timeout_ms: 30000,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            load_timeout_ms: 10000,
            album_check_timeout_ms: 5000,
            url_timeout_ms: 10000,
            retry_url_timeout_ms: 3000,
            panel_settle_ms: 1000,
            archive_settle_ms: 2000,
            post_archive_settle_ms: 3000,
            boundary_settle_ms: 1000,
            poll_interval_ms: 250,
        }
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            checkpoint_file: env::var("ARCHIVER_CHECKPOINT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("checkpoint.txt")),
            max_archive_retries: 5,
            repeat_threshold: 2,
            recent_events: 5,
            max_url_failures: 5,
            dry_run: env_flag("ARCHIVER_DRY_RUN").unwrap_or(false),
            max_items: None,
            debug: env_flag("ARCHIVER_DEBUG").unwrap_or(false),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            previous_control: r#"div[aria-label="View previous photo"]"#.to_string(),
            info_panel: r#"c-wiz[aria-label="Info"]"#.to_string(),
            info_region: r#"c-wiz[aria-label="Info"] div[role="list"]"#.to_string(),
            album_marker: r#"a[href*="/album/"]"#.to_string(),
            grid_cell: r#"a[href*="/photo/"]"#.to_string(),
        }
    }
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            toggle_panel: "i".to_string(),
            archive: "Shift+a".to_string(),
            previous: "ArrowLeft".to_string(),
        }
    }
}

impl TimingConfig {
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn album_check_timeout(&self) -> Duration {
        Duration::from_millis(self.album_check_timeout_ms)
    }

    pub fn url_timeout(&self) -> Duration {
        Duration::from_millis(self.url_timeout_ms)
    }

    pub fn retry_url_timeout(&self) -> Duration {
        Duration::from_millis(self.retry_url_timeout_ms)
    }

    pub fn panel_settle(&self) -> Duration {
        Duration::from_millis(self.panel_settle_ms)
    }

    pub fn archive_settle(&self) -> Duration {
        Duration::from_millis(self.archive_settle_ms)
    }

    pub fn post_archive_settle(&self) -> Duration {
        Duration::from_millis(self.post_archive_settle_ms)
    }

    pub fn boundary_settle(&self) -> Duration {
        Duration::from_millis(self.boundary_settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Near-zero waits, for simulated pages
    pub fn instant() -> Self {
        Self {
            load_timeout_ms: 50,
            album_check_timeout_ms: 50,
            url_timeout_ms: 50,
            retry_url_timeout_ms: 20,
            panel_settle_ms: 0,
            archive_settle_ms: 0,
            post_archive_settle_ms: 0,
            boundary_settle_ms: 0,
            poll_interval_ms: 1,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("photo-archiver")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        match Self::load_from_file() {
            Ok(config) => config,
            Err(e) => {
                if Self::config_exists() {
                    tracing::warn!("Ignoring config file: {}", e);
                }
                Self::default()
            }
        }
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(ArchiverError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| ArchiverError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text; missing sections fall back to defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ArchiverError::config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file())
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)
                    .map_err(|e| ArchiverError::config(format!("Failed to create config dir: {}", e)))?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ArchiverError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| ArchiverError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Check if a config file exists
    pub fn config_exists() -> bool {
        Self::config_file().exists()
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        toml::to_string_pretty(&Config::default())
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let config = Config::default();
        assert_eq!(config.timings.load_timeout(), Duration::from_secs(10));
        assert_eq!(config.timings.album_check_timeout(), Duration::from_secs(5));
        assert_eq!(config.timings.retry_url_timeout(), Duration::from_secs(3));
        assert_eq!(config.walk.max_archive_retries, 5);
        assert_eq!(config.walk.repeat_threshold, 2);
    }

    #[test]
    fn test_default_keys() {
        let keys = KeyConfig::default();
        assert_eq!(keys.toggle_panel, "i");
        assert_eq!(keys.archive, "Shift+a");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [keys]
            toggle_panel = "I"
            "#,
        )
        .unwrap();
        assert_eq!(config.keys.toggle_panel, "I");
        assert_eq!(config.timings.url_timeout_ms, 10000);
        assert_eq!(config.walk.recent_events, 5);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = Config::from_toml("[walk\n").unwrap_err();
        assert!(matches!(err, ArchiverError::Config(_)));
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = Config::default_config_toml();
        assert!(toml_str.contains("landing_url"));
        assert!(toml_str.contains("previous_control"));
    }

    #[test]
    fn test_saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.walk.max_items = Some(40);
        config.keys.archive = "Shift+A".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::from_toml(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.walk.max_items, Some(40));
        assert_eq!(loaded.keys.archive, "Shift+A");
        assert_eq!(loaded.browser.viewport_width, config.browser.viewport_width);
    }

    #[test]
    fn test_config_dir() {
        let dir = Config::config_dir();
        assert!(dir.to_string_lossy().contains("photo-archiver"));
    }
}
