//! Browser executor - wraps agent-browser CLI
//!
//! Owns the persistent browser profile for the run and implements the page
//! traits on top of agent-browser commands.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::browser::response::{eval_value, AlbumProbe};
use crate::browser::{scripts, Page, PageProbe};
use crate::core::config::{BrowserConfig, SelectorConfig};
use crate::core::{AlbumState, ArchiverError, Result};

/// Executor for browser automation via agent-browser CLI
pub struct BrowserExecutor {
    /// Session name for isolation
    session_name: String,
    /// Whether to run in headed mode
    headed: bool,
    /// Launch options applied when the session starts
    browser: BrowserConfig,
    /// Selectors the probe scripts are built from
    selectors: SelectorConfig,
    /// Upper bound for one CLI invocation
    command_timeout: Duration,
}

impl BrowserExecutor {
    /// Create a new browser executor
    pub fn new(browser: BrowserConfig, selectors: SelectorConfig) -> Self {
        Self {
            session_name: browser.session_name.clone(),
            headed: browser.headed,
            command_timeout: Duration::from_millis(browser.command_timeout_ms),
            browser,
            selectors,
        }
    }

    /// Check if agent-browser is installed
    pub async fn is_available() -> bool {
        Command::new("agent-browser")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Global flags used only when the browser process is started
    fn launch_flags(&self) -> Vec<String> {
        let mut flags = vec![
            "--profile".to_string(),
            self.browser.profile_dir.to_string_lossy().into_owned(),
        ];

        if let Some(ref agent) = self.browser.user_agent {
            flags.push("--user-agent".to_string());
            flags.push(agent.clone());
        }

        if !self.browser.launch_args.is_empty() {
            flags.push("--args".to_string());
            flags.push(self.browser.launch_args.join(","));
        }

        flags
    }

    /// Run an agent-browser command
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        self.run_with_flags(&[], args).await
    }

    async fn run_with_flags(&self, flags: &[String], args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("agent-browser");
        cmd.args(["--session", &self.session_name]);

        if self.headed {
            cmd.arg("--headed");
        }

        cmd.args(flags);
        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        tracing::debug!(command = ?args, "agent-browser");

        let output = match tokio::time::timeout(self.command_timeout, cmd.output()).await {
            Ok(output) => output,
            Err(_) => {
                return Err(ArchiverError::timeout(
                    format!("agent-browser {}", args.first().copied().unwrap_or("")),
                    self.command_timeout,
                ))
            }
        };

        let output = output.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ArchiverError::AgentBrowserNotFound
            } else {
                ArchiverError::browser(format!("Failed to run agent-browser: {}", e))
            }
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ArchiverError::browser(format!(
                "agent-browser command failed: {}",
                stderr.trim()
            )))
        }
    }

    /// Evaluate a script and decode its JSON value
    async fn eval<T: serde::de::DeserializeOwned>(&self, script: &str) -> Result<T> {
        let output = self.run_command(&["eval", script, "--json"]).await?;
        eval_value(&output)
    }

    /// Start the browser on the persistent profile and open `url`
    pub async fn launch(&self, url: &str) -> Result<()> {
        if let Err(e) = std::fs::create_dir_all(&self.browser.profile_dir) {
            return Err(ArchiverError::with_context(
                format!(
                    "Failed to create profile dir {}",
                    self.browser.profile_dir.display()
                ),
                e,
            ));
        }

        tracing::info!(
            profile = %self.browser.profile_dir.display(),
            headed = self.headed,
            "Launching browser"
        );
        self.run_with_flags(&self.launch_flags(), &["open", url])
            .await?;

        let width = self.browser.viewport_width.to_string();
        let height = self.browser.viewport_height.to_string();
        self.run_command(&["set", "viewport", &width, &height])
            .await?;

        Ok(())
    }
}

#[async_trait]
impl Page for BrowserExecutor {
    async fn goto(&self, url: &str) -> Result<()> {
        self.run_command(&["open", url]).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        self.run_command(&["get", "url"])
            .await
            .map(|s| s.trim().to_string())
    }

    async fn wait_for_load(&self) -> Result<()> {
        self.run_command(&["wait", "--load", "domcontentloaded"])
            .await?;
        Ok(())
    }

    async fn press(&self, key: &str) -> Result<()> {
        self.run_command(&["press", key]).await?;
        Ok(())
    }

    async fn click_previous(&self) -> Result<()> {
        let clicked: bool = self.eval(&scripts::click_previous(&self.selectors)).await?;
        if clicked {
            Ok(())
        } else {
            Err(ArchiverError::browser("previous-item control not found"))
        }
    }

    async fn focus_first_cell(&self) -> Result<()> {
        let focused: bool = self
            .eval(&scripts::focus_first_cell(&self.selectors))
            .await?;
        if focused {
            Ok(())
        } else {
            Err(ArchiverError::browser("no grid cell to focus"))
        }
    }

    async fn focused_link(&self) -> Result<Option<String>> {
        self.eval(scripts::FOCUSED_LINK).await
    }

    async fn close(&self) -> Result<()> {
        self.run_command(&["close"]).await?;
        tracing::info!("Browser closed");
        Ok(())
    }
}

#[async_trait]
impl PageProbe for BrowserExecutor {
    async fn is_panel_visible(&self) -> Result<bool> {
        self.eval(&scripts::panel_visible(&self.selectors)).await
    }

    async fn album_marker_state(&self) -> Result<AlbumState> {
        let probe: AlbumProbe = self.eval(&scripts::album_probe(&self.selectors)).await?;
        Ok(AlbumState::from_probe(probe.regions, probe.marker))
    }

    async fn is_home_page(&self) -> Result<bool> {
        self.eval(&scripts::home_page(&self.selectors)).await
    }
}
