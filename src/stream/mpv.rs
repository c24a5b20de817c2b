//! External mpv controlled over JSON IPC
//!
//! mpv is started with `--input-ipc-server`; commands are newline-delimited
//! JSON objects and playback state arrives as `property-change` events for
//! the properties observed right after connecting.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use super::{MediaTransport, PlayerError};
use crate::models::{step_volume, PlaybackState, PlaybackStatus, VOLUME_DEFAULT};

/// Properties observed on every session, ids are position + 1
const OBSERVED: [&str; 6] = [
    "time-pos",
    "duration",
    "pause",
    "volume",
    "fullscreen",
    "eof-reached",
];

/// How long a poll waits for each further event before returning
const DRAIN_WAIT: Duration = Duration::from_millis(10);

/// Launch settings for mpv
#[derive(Debug, Clone)]
pub struct MpvOptions {
    /// mpv binary
    pub command: String,
    /// Directory for the IPC socket
    pub socket_dir: PathBuf,
    /// How long to wait for mpv to open its socket
    pub connect_timeout: Duration,
    /// Passed to mpv before the URL
    pub extra_args: Vec<String>,
}

impl Default for MpvOptions {
    fn default() -> Self {
        Self {
            command: "mpv".to_string(),
            socket_dir: std::env::temp_dir(),
            connect_timeout: Duration::from_secs(5),
            extra_args: Vec::new(),
        }
    }
}

/// One open IPC connection, and the process behind it if we started it
#[derive(Debug)]
struct Session {
    child: Option<Child>,
    /// Removed on drop when we created it
    owned_socket: Option<PathBuf>,
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    next_request: u64,
}

impl Session {
    async fn establish(
        stream: UnixStream,
        child: Option<Child>,
        owned_socket: Option<PathBuf>,
    ) -> Result<Self, PlayerError> {
        let (read, writer) = stream.into_split();
        let mut session = Self {
            child,
            owned_socket,
            lines: BufReader::new(read).lines(),
            writer,
            next_request: 1,
        };

        for (idx, name) in OBSERVED.iter().enumerate() {
            session
                .send(json!(["observe_property", idx + 1, name]))
                .await?;
        }
        Ok(session)
    }

    async fn send(&mut self, command: Value) -> Result<(), PlayerError> {
        let request_id = self.next_request;
        self.next_request += 1;

        let mut line = json!({ "command": command, "request_id": request_id }).to_string();
        debug!(%line, "mpv <-");
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(PlayerError::Ipc)?;
        self.writer.flush().await.map_err(PlayerError::Ipc)
    }

    /// Whether the mpv process we spawned has exited
    fn child_exited(&mut self) -> bool {
        self.child
            .as_mut()
            .map(|c| matches!(c.try_wait(), Ok(Some(_))))
            .unwrap_or(false)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(path) = self.owned_socket.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// mpv window with play/pause, seek, volume and fullscreen control
#[derive(Debug)]
pub struct MpvTransport {
    options: MpvOptions,
    session: Option<Session>,
    status: PlaybackStatus,
}

impl MpvTransport {
    pub fn new(options: MpvOptions) -> Self {
        Self {
            options,
            session: None,
            status: PlaybackStatus::default(),
        }
    }

    /// Connect to an mpv that is already listening on `socket_path`.
    ///
    /// The process is not owned: `stop` asks it to quit but never kills it.
    pub async fn attach(socket_path: &Path, title: &str) -> Result<Self, PlayerError> {
        let stream = UnixStream::connect(socket_path)
            .await
            .map_err(PlayerError::Ipc)?;
        let session = Session::establish(stream, None, None).await?;
        Ok(Self {
            options: MpvOptions::default(),
            session: Some(session),
            status: PlaybackStatus::loading(title),
        })
    }

    fn socket_path(&self) -> PathBuf {
        self.options
            .socket_dir
            .join(format!("sezontui-mpv-{}.sock", std::process::id()))
    }

    fn session_mut(&mut self) -> Result<&mut Session, PlayerError> {
        self.session.as_mut().ok_or(PlayerError::NotPlaying)
    }

    fn spawn(&self, socket: &Path, url: &str, title: &str) -> Result<Child, PlayerError> {
        let mut cmd = Command::new(&self.options.command);
        cmd.arg(format!("--input-ipc-server={}", socket.display()))
            .arg("--force-window=immediate")
            .arg("--keep-open=no")
            .arg("--idle=no")
            .arg(format!("--volume={}", VOLUME_DEFAULT))
            .arg(format!("--title={}", title))
            .args(&self.options.extra_args)
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlayerError::NotFound(self.options.command.clone())
            } else {
                PlayerError::StartFailed(e)
            }
        })
    }

    /// Retry until mpv has created its socket
    async fn connect(&self, socket: &Path, child: &mut Child) -> Result<UnixStream, PlayerError> {
        let deadline = tokio::time::Instant::now() + self.options.connect_timeout;
        loop {
            if let Ok(Some(exit)) = child.try_wait() {
                return Err(PlayerError::Protocol(format!(
                    "mpv exited before opening its socket ({})",
                    exit
                )));
            }
            match UnixStream::connect(socket).await {
                Ok(stream) => return Ok(stream),
                Err(e) if tokio::time::Instant::now() >= deadline => {
                    let _ = child.kill().await;
                    return Err(PlayerError::Ipc(e));
                }
                Err(_) => tokio::time::sleep(Duration::from_millis(100)).await,
            }
        }
    }
}

/// Fold one IPC message into the status snapshot
pub fn apply_event(status: &mut PlaybackStatus, msg: &Value) {
    match msg["event"].as_str() {
        Some("property-change") => {
            let data = &msg["data"];
            match msg["name"].as_str() {
                Some("time-pos") => {
                    if let Some(secs) = data.as_f64().filter(|s| s.is_finite() && *s >= 0.0) {
                        status.position = Duration::from_secs_f64(secs);
                        if status.state == PlaybackState::Loading {
                            status.state = PlaybackState::Playing;
                        }
                    }
                }
                Some("duration") => {
                    if let Some(secs) = data.as_f64().filter(|s| s.is_finite() && *s >= 0.0) {
                        status.duration = Duration::from_secs_f64(secs);
                    }
                }
                Some("pause") => {
                    if let Some(paused) = data.as_bool() {
                        if status.state.is_active() {
                            status.state = if paused {
                                PlaybackState::Paused
                            } else {
                                PlaybackState::Playing
                            };
                        }
                    }
                }
                Some("volume") => {
                    if let Some(vol) = data.as_f64() {
                        status.volume = step_volume(0, vol.round() as i16);
                    }
                }
                Some("fullscreen") => {
                    if let Some(fs) = data.as_bool() {
                        status.fullscreen = fs;
                    }
                }
                Some("eof-reached") => {
                    if data.as_bool() == Some(true) {
                        info!("mpv reached end of file");
                        status.state = PlaybackState::Ended;
                        if !status.duration.is_zero() {
                            status.position = status.duration;
                        }
                    }
                }
                _ => {}
            }
        }
        Some("end-file") => {
            if msg["reason"].as_str() == Some("error") {
                let detail = msg["file_error"].as_str().unwrap_or("playback failed");
                status.state = PlaybackState::Error(detail.to_string());
            }
        }
        Some("shutdown") => {
            if status.state.is_active() {
                status.state = PlaybackState::Stopped;
            }
        }
        Some(_) => {}
        None => {
            if let Some(err) = msg["error"].as_str().filter(|e| *e != "success") {
                warn!(request_id = %msg["request_id"], error = err, "mpv rejected command");
            }
        }
    }
}

impl MediaTransport for MpvTransport {
    async fn open(&mut self, url: &str, title: &str) -> Result<(), PlayerError> {
        self.stop().await?;

        let socket = self.socket_path();
        let _ = std::fs::remove_file(&socket);

        info!(url, title, "starting mpv");
        let mut child = self.spawn(&socket, url, title)?;
        let stream = self.connect(&socket, &mut child).await?;

        self.session = Some(Session::establish(stream, Some(child), Some(socket)).await?);
        self.status = PlaybackStatus::loading(title);
        Ok(())
    }

    async fn toggle_pause(&mut self) -> Result<(), PlayerError> {
        self.session_mut()?.send(json!(["cycle", "pause"])).await
    }

    async fn stop(&mut self) -> Result<(), PlayerError> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };

        if let Err(e) = session.send(json!(["quit"])).await {
            debug!(error = %e, "mpv gone before quit");
        }
        if let Some(child) = session.child.as_mut() {
            match tokio::time::timeout(Duration::from_secs(1), child.wait()).await {
                Ok(_) => {}
                Err(_) => {
                    warn!("mpv ignored quit, killing it");
                    let _ = child.kill().await;
                }
            }
        }

        self.status.state = PlaybackState::Stopped;
        self.status.position = Duration::ZERO;
        Ok(())
    }

    async fn adjust_volume(&mut self, delta: i16) -> Result<(), PlayerError> {
        let target = step_volume(self.status.volume, delta);
        self.session_mut()?
            .send(json!(["set_property", "volume", target]))
            .await?;
        self.status.volume = target;
        Ok(())
    }

    async fn seek_relative(&mut self, seconds: f64) -> Result<(), PlayerError> {
        let target = self.status.seek_target(seconds);
        self.session_mut()?
            .send(json!(["seek", target, "absolute"]))
            .await?;
        self.status.position = Duration::from_secs_f64(target);
        Ok(())
    }

    async fn seek_fraction(&mut self, fraction: f64) -> Result<(), PlayerError> {
        let unknown_duration = self.status.duration.is_zero();
        let session = self.session_mut()?;
        if unknown_duration {
            return Ok(());
        }
        let percent = fraction.clamp(0.0, 1.0) * 100.0;
        session
            .send(json!(["seek", percent, "absolute-percent"]))
            .await
    }

    async fn toggle_fullscreen(&mut self) -> Result<(), PlayerError> {
        self.session_mut()?
            .send(json!(["cycle", "fullscreen"]))
            .await
    }

    async fn poll_status(&mut self) -> PlaybackStatus {
        let mut closed = false;

        if let Some(session) = self.session.as_mut() {
            loop {
                match tokio::time::timeout(DRAIN_WAIT, session.lines.next_line()).await {
                    Ok(Ok(Some(line))) => match serde_json::from_str::<Value>(&line) {
                        Ok(msg) => apply_event(&mut self.status, &msg),
                        Err(e) => debug!(error = %e, %line, "unparseable mpv message"),
                    },
                    Ok(Ok(None)) => {
                        closed = true;
                        break;
                    }
                    Ok(Err(e)) => {
                        warn!(error = %e, "mpv connection failed");
                        closed = true;
                        break;
                    }
                    Err(_) => break,
                }
            }
            closed |= session.child_exited();
        }

        if closed {
            info!("mpv closed");
            self.session = None;
            if self.status.state.is_active() {
                self.status.state = PlaybackState::Stopped;
            }
        }
        self.status.clone()
    }

    fn is_active(&self) -> bool {
        self.session.is_some()
    }
}
