/// External player process
use crate::config::PlayerSettings;
use crate::error::{DaemonError, Result};
use airtime_core::PreparedItem;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// Placeholder in player arguments replaced by the item's locator
pub const SOURCE_PLACEHOLDER: &str = "{source}";

/// Plays one item to completion
#[async_trait]
pub trait Playback: Send + Sync {
    /// Play `item`, returning once playback has finished
    async fn play(&self, item: &PreparedItem) -> Result<()>;
}

/// Runs a configurable command per item and waits for it to exit
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    command: String,
    args: Vec<String>,
}

impl CommandPlayer {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_settings(settings: &PlayerSettings) -> Self {
        Self::new(settings.command.clone(), settings.args.clone())
    }

    /// Arguments for playing `locator`
    pub fn args_for(&self, locator: &str) -> Vec<String> {
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| arg.replace(SOURCE_PLACEHOLDER, locator))
            .collect();

        if !self.args.iter().any(|arg| arg.contains(SOURCE_PLACEHOLDER)) {
            args.push(locator.to_string());
        }
        args
    }
}

#[async_trait]
impl Playback for CommandPlayer {
    async fn play(&self, item: &PreparedItem) -> Result<()> {
        let args = self.args_for(&item.source.locator());
        tracing::debug!("Running {} {:?}", self.command, args);

        let status = Command::new(&self.command)
            .args(&args)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| DaemonError::Player(format!("Failed to start {}: {}", self.command, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(DaemonError::Player(format!(
                "{} exited with {} while playing {}",
                self.command, status, item.track.id
            )))
        }
    }
}
