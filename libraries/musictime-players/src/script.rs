//! Out-of-process script execution for desktop players.

use async_trait::async_trait;
use musictime_core::{MusicTimeError, Result};
use tokio::process::Command;
use tracing::debug;

/// Runs AppleScript snippets and opens URLs on the host.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Run an AppleScript program and return its trimmed stdout.
    async fn run_applescript(&self, script: &str) -> Result<String>;

    /// Open a URL with the system handler.
    async fn open_url(&self, url: &str) -> Result<()>;
}

/// `ScriptRunner` backed by `osascript` and the platform opener.
#[derive(Debug, Clone, Default)]
pub struct OsascriptRunner;

impl OsascriptRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ScriptRunner for OsascriptRunner {
    async fn run_applescript(&self, script: &str) -> Result<String> {
        debug!(len = script.len(), "Running osascript");

        let output = Command::new("osascript")
            .arg("-e")
            .arg(script)
            .output()
            .await
            .map_err(|e| MusicTimeError::script(format!("failed to spawn osascript: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MusicTimeError::script(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn open_url(&self, url: &str) -> Result<()> {
        let opener = if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(windows) {
            "explorer"
        } else {
            "xdg-open"
        };
        debug!(url = %url, opener, "Opening URL");

        let status = Command::new(opener)
            .arg(url)
            .status()
            .await
            .map_err(|e| MusicTimeError::script(format!("failed to spawn {}: {}", opener, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(MusicTimeError::script(format!("{} exited with {}", opener, status)))
        }
    }
}

/// Quote a value as an AppleScript string literal.
pub fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
