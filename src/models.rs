//! Playback models shared by the transport, the TUI and the CLI
//!
//! - **PlaybackState**: what the external player is doing
//! - **PlaybackStatus**: polled snapshot (position, duration, volume)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Highest volume the player accepts, in percent
pub const VOLUME_MAX: u8 = 150;

/// Volume a freshly opened stream starts at
pub const VOLUME_DEFAULT: u8 = 100;

// =============================================================================
// Playback State
// =============================================================================

/// Player state as last observed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Nothing opened
    #[default]
    Idle,
    /// Player started, no position reported yet
    Loading,
    Playing,
    Paused,
    Stopped,
    /// Reached end of file
    Ended,
    Error(String),
}

impl PlaybackState {
    /// Whether a stream is open in the player
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            PlaybackState::Loading | PlaybackState::Playing | PlaybackState::Paused
        )
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "Idle"),
            PlaybackState::Loading => write!(f, "Loading..."),
            PlaybackState::Playing => write!(f, "▶ Playing"),
            PlaybackState::Paused => write!(f, "⏸ Paused"),
            PlaybackState::Stopped => write!(f, "⏹ Stopped"),
            PlaybackState::Ended => write!(f, "Ended"),
            PlaybackState::Error(e) => write!(f, "Error: {}", e),
        }
    }
}

// =============================================================================
// Playback Status
// =============================================================================

/// Snapshot of the external player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    pub position: Duration,
    /// Zero until the player reports it
    pub duration: Duration,
    /// Percent, `0..=VOLUME_MAX`
    pub volume: u8,
    pub fullscreen: bool,
    pub title: Option<String>,
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        Self {
            state: PlaybackState::Idle,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            volume: VOLUME_DEFAULT,
            fullscreen: false,
            title: None,
        }
    }
}

impl PlaybackStatus {
    /// Status for a stream that was just handed to the player
    pub fn loading(title: impl Into<String>) -> Self {
        Self {
            state: PlaybackState::Loading,
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Format position as HH:MM:SS
    pub fn format_position(&self) -> String {
        format_duration(self.position)
    }

    /// Format duration as HH:MM:SS
    pub fn format_duration(&self) -> String {
        format_duration(self.duration)
    }

    /// Get progress as fraction (0.0-1.0)
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            0.0
        } else {
            (self.position.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
        }
    }

    /// Format volume as percentage
    pub fn format_volume(&self) -> String {
        format!("{}%", self.volume)
    }

    /// Position after moving `delta_secs`, kept inside the stream.
    ///
    /// With an unknown duration only the lower bound applies.
    pub fn seek_target(&self, delta_secs: f64) -> f64 {
        let target = (self.position.as_secs_f64() + delta_secs).max(0.0);
        if self.duration.is_zero() {
            target
        } else {
            target.min(self.duration.as_secs_f64())
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} / {} ({})",
            self.state,
            self.format_position(),
            self.format_duration(),
            self.format_volume()
        )
    }
}

/// Volume after a relative step, clamped to `0..=VOLUME_MAX`
pub fn step_volume(current: u8, delta: i16) -> u8 {
    (i16::from(current) + delta).clamp(0, i16::from(VOLUME_MAX)) as u8
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Format a Duration as HH:MM:SS or MM:SS
pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn status(position: u64, duration: u64) -> PlaybackStatus {
        PlaybackStatus {
            state: PlaybackState::Playing,
            position: Duration::from_secs(position),
            duration: Duration::from_secs(duration),
            ..PlaybackStatus::default()
        }
    }

    #[test]
    fn test_playback_progress() {
        assert!((status(300, 600).progress() - 0.5).abs() < 0.01);
        assert_eq!(status(10, 0).progress(), 0.0);
    }

    #[test]
    fn test_format_duration_hhmmss() {
        let s = status(3661, 7322);
        assert_eq!(s.format_position(), "01:01:01");
        assert_eq!(s.format_duration(), "02:02:02");
    }

    #[test]
    fn test_format_duration_mmss() {
        let s = status(125, 300);
        assert_eq!(s.format_position(), "02:05");
        assert_eq!(s.format_duration(), "05:00");
    }

    #[test]
    fn test_seek_target_clamps() {
        let s = status(5, 600);
        assert_eq!(s.seek_target(-10.0), 0.0);
        assert_eq!(s.seek_target(10.0), 15.0);
        assert_eq!(status(595, 600).seek_target(10.0), 600.0);
        // Unknown duration: no upper bound
        assert_eq!(status(595, 0).seek_target(10.0), 605.0);
    }

    #[test]
    fn test_step_volume_clamps() {
        assert_eq!(step_volume(100, 10), 110);
        assert_eq!(step_volume(145, 10), VOLUME_MAX);
        assert_eq!(step_volume(5, -10), 0);
        assert_eq!(step_volume(0, -10), 0);
    }

    #[test]
    fn test_state_is_active() {
        assert!(PlaybackState::Playing.is_active());
        assert!(PlaybackState::Paused.is_active());
        assert!(PlaybackState::Loading.is_active());
        assert!(!PlaybackState::Stopped.is_active());
        assert!(!PlaybackState::Ended.is_active());
        assert!(!PlaybackState::Idle.is_active());
    }

    #[test]
    fn test_status_display() {
        let s = status(65, 600);
        assert_eq!(s.to_string(), "▶ Playing 01:05 / 10:00 (100%)");
    }

    #[test]
    fn test_state_serde() {
        let json = serde_json::to_string(&PlaybackState::Paused).unwrap();
        assert_eq!(json, "\"paused\"");
    }
}
