//! Media transport
//!
//! - Mpv: external mpv window controlled over its JSON IPC socket
//! - Player: plain launcher for VLC (or mpv without IPC), no remote control
//!
//! The TUI and CLI only talk to [`MediaTransport`]; nothing here knows about
//! the catalog.

#[cfg(unix)]
pub mod mpv;
pub mod player;

use crate::models::PlaybackStatus;

#[cfg(unix)]
pub use mpv::{MpvOptions, MpvTransport};
pub use player::{Launcher, PlayerError, PlayerType};

/// Controls for an external player showing one stream at a time
#[allow(async_fn_in_trait)]
pub trait MediaTransport {
    /// Open `url`, replacing whatever is playing
    async fn open(&mut self, url: &str, title: &str) -> Result<(), PlayerError>;

    async fn toggle_pause(&mut self) -> Result<(), PlayerError>;

    /// Close the stream; a no-op when nothing is open
    async fn stop(&mut self) -> Result<(), PlayerError>;

    /// Change volume by `delta` percent, clamped to `0..=VOLUME_MAX`
    async fn adjust_volume(&mut self, delta: i16) -> Result<(), PlayerError>;

    /// Move playback by `seconds`, clamped to the stream
    async fn seek_relative(&mut self, seconds: f64) -> Result<(), PlayerError>;

    /// Jump to `fraction` (0.0-1.0) of the stream; ignored while the duration
    /// is still unknown
    async fn seek_fraction(&mut self, fraction: f64) -> Result<(), PlayerError>;

    async fn toggle_fullscreen(&mut self) -> Result<(), PlayerError>;

    /// Drain player events and return the latest snapshot
    async fn poll_status(&mut self) -> PlaybackStatus;

    /// Whether a stream is currently open
    fn is_active(&self) -> bool;
}

/// Transport picked from config
#[derive(Debug)]
pub enum Transport {
    #[cfg(unix)]
    Mpv(MpvTransport),
    Launcher(Launcher),
}

impl Transport {
    /// Build the transport for a player choice.
    ///
    /// mpv gets IPC control where unix sockets exist; everything else is a
    /// plain launch.
    pub fn for_player(player: PlayerType) -> Self {
        match player {
            #[cfg(unix)]
            PlayerType::Mpv => Transport::Mpv(MpvTransport::new(MpvOptions::default())),
            _ => Transport::Launcher(Launcher::new(player)),
        }
    }

    pub fn player_type(&self) -> PlayerType {
        match self {
            #[cfg(unix)]
            Transport::Mpv(_) => PlayerType::Mpv,
            Transport::Launcher(l) => l.player_type(),
        }
    }
}

macro_rules! delegate {
    ($self:ident, $t:ident => $call:expr) => {
        match $self {
            #[cfg(unix)]
            Transport::Mpv($t) => $call,
            Transport::Launcher($t) => $call,
        }
    };
}

impl MediaTransport for Transport {
    async fn open(&mut self, url: &str, title: &str) -> Result<(), PlayerError> {
        delegate!(self, t => t.open(url, title).await)
    }

    async fn toggle_pause(&mut self) -> Result<(), PlayerError> {
        delegate!(self, t => t.toggle_pause().await)
    }

    async fn stop(&mut self) -> Result<(), PlayerError> {
        delegate!(self, t => t.stop().await)
    }

    async fn adjust_volume(&mut self, delta: i16) -> Result<(), PlayerError> {
        delegate!(self, t => t.adjust_volume(delta).await)
    }

    async fn seek_relative(&mut self, seconds: f64) -> Result<(), PlayerError> {
        delegate!(self, t => t.seek_relative(seconds).await)
    }

    async fn seek_fraction(&mut self, fraction: f64) -> Result<(), PlayerError> {
        delegate!(self, t => t.seek_fraction(fraction).await)
    }

    async fn toggle_fullscreen(&mut self) -> Result<(), PlayerError> {
        delegate!(self, t => t.toggle_fullscreen().await)
    }

    async fn poll_status(&mut self) -> PlaybackStatus {
        delegate!(self, t => t.poll_status().await)
    }

    fn is_active(&self) -> bool {
        delegate!(self, t => t.is_active())
    }
}
