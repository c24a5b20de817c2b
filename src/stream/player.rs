//! Local Player - VLC/mpv launcher
//!
//! Opens a stream in a separate player window without any remote control.
//! Used for VLC, and for mpv where IPC sockets are unavailable.

use std::process::Stdio;
use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{info, warn};

use super::MediaTransport;
use crate::models::{PlaybackState, PlaybackStatus};

/// Supported local players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerType {
    /// mpv media player (default, full remote control)
    #[default]
    Mpv,
    /// VLC media player
    Vlc,
}

impl PlayerType {
    /// Get the command name for this player
    pub fn command(&self) -> &'static str {
        match self {
            PlayerType::Vlc => {
                // On macOS, VLC is an app bundle - check for it
                #[cfg(target_os = "macos")]
                if std::path::Path::new("/Applications/VLC.app").exists() {
                    return "/Applications/VLC.app/Contents/MacOS/VLC";
                }
                "vlc"
            }
            PlayerType::Mpv => "mpv",
        }
    }

    /// Get a display name for this player
    pub fn display_name(&self) -> &'static str {
        match self {
            PlayerType::Vlc => "VLC",
            PlayerType::Mpv => "mpv",
        }
    }

    /// Parse a config value ("mpv", "vlc")
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "mpv" => Some(PlayerType::Mpv),
            "vlc" => Some(PlayerType::Vlc),
            _ => None,
        }
    }

    /// Check if the player is available on the system
    pub async fn is_available(&self) -> bool {
        let cmd = self.command();

        // If it's a full path (macOS app bundle), check if it exists
        if cmd.starts_with('/') {
            return std::path::Path::new(cmd).exists();
        }

        Command::new("which")
            .arg(cmd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl std::fmt::Display for PlayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Errors from local player operations
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Player '{0}' not found. Install it first.")]
    NotFound(String),
    #[error("Failed to start player: {0}")]
    StartFailed(#[from] std::io::Error),
    #[error("Player IPC failed: {0}")]
    Ipc(std::io::Error),
    #[error("Player protocol error: {0}")]
    Protocol(String),
    #[error("{0} is not supported by this player")]
    Unsupported(&'static str),
    #[error("Nothing is playing")]
    NotPlaying,
}

/// Fire-and-forget player process
#[derive(Debug)]
pub struct Launcher {
    player_type: PlayerType,
    child: Option<Child>,
    status: PlaybackStatus,
}

impl Launcher {
    /// Create a launcher for the specified player
    pub fn new(player_type: PlayerType) -> Self {
        Self {
            player_type,
            child: None,
            status: PlaybackStatus::default(),
        }
    }

    /// Get the player type
    pub fn player_type(&self) -> PlayerType {
        self.player_type
    }

    fn spawn(&self, url: &str, title: &str) -> Result<Child, PlayerError> {
        let mut cmd = Command::new(self.player_type.command());

        match self.player_type {
            PlayerType::Vlc => {
                cmd.arg(url)
                    .arg("--no-video-title-show")
                    .arg(format!("--meta-title={}", title));
            }
            PlayerType::Mpv => {
                cmd.arg(url)
                    .arg("--force-window=immediate")
                    .arg(format!("--title={}", title));
            }
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlayerError::NotFound(self.player_type.command().to_string())
            } else {
                PlayerError::StartFailed(e)
            }
        })
    }
}

impl MediaTransport for Launcher {
    async fn open(&mut self, url: &str, title: &str) -> Result<(), PlayerError> {
        self.stop().await?;
        info!(player = %self.player_type, url, "launching player");
        self.child = Some(self.spawn(url, title)?);
        self.status = PlaybackStatus::loading(title);
        self.status.state = PlaybackState::Playing;
        Ok(())
    }

    async fn toggle_pause(&mut self) -> Result<(), PlayerError> {
        Err(PlayerError::Unsupported("pause"))
    }

    async fn stop(&mut self) -> Result<(), PlayerError> {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                warn!(error = %e, "player did not stop cleanly");
            }
            self.status.state = PlaybackState::Stopped;
        }
        Ok(())
    }

    async fn adjust_volume(&mut self, _delta: i16) -> Result<(), PlayerError> {
        Err(PlayerError::Unsupported("volume"))
    }

    async fn seek_relative(&mut self, _seconds: f64) -> Result<(), PlayerError> {
        Err(PlayerError::Unsupported("seek"))
    }

    async fn seek_fraction(&mut self, _fraction: f64) -> Result<(), PlayerError> {
        Err(PlayerError::Unsupported("seek"))
    }

    async fn toggle_fullscreen(&mut self) -> Result<(), PlayerError> {
        Err(PlayerError::Unsupported("fullscreen"))
    }

    async fn poll_status(&mut self) -> PlaybackStatus {
        if let Some(child) = self.child.as_mut() {
            if let Ok(Some(_)) = child.try_wait() {
                self.child = None;
                self.status.state = PlaybackState::Stopped;
            }
        }
        self.status.clone()
    }

    fn is_active(&self) -> bool {
        self.child.is_some()
    }
}
