//! Player-related small types and handles.
//!
//! This module defines the command enum, the shared playback snapshot and
//! the handle alias used by the playback worker and the event loop.

use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug)]
pub enum PlayerCmd {
    /// Fetch `url` and swap it in as the active media, starting playback
    /// when `autoplay` is set. Source swap and play are one transition.
    Load { url: String, autoplay: bool },
    /// Toggle pause/resume. Does nothing without loaded media.
    TogglePause,
    /// Drop the active media entirely.
    Stop,
    /// Set the output volume within `0.0..=1.0`.
    SetVolume(f32),
    /// Stop playback and exit the worker thread.
    Quit,
}

#[derive(Debug, Clone)]
/// Runtime playback information shared with the UI.
pub struct PlayerInfo {
    /// URL of the currently loaded media (if any).
    pub url: Option<String>,
    /// Elapsed playback time for the current media.
    pub elapsed: Duration,
    /// Total duration, when the decoder reports one.
    pub duration: Option<Duration>,
    /// Whether playback is currently active.
    pub playing: bool,
    /// Counts natural end-of-track events; the event loop advances the
    /// queue when it sees the counter move.
    pub ended: u64,
}

impl Default for PlayerInfo {
    fn default() -> Self {
        Self {
            url: None,
            elapsed: Duration::ZERO,
            duration: None,
            playing: false,
            ended: 0,
        }
    }
}

pub type PlayerHandle = Arc<Mutex<PlayerInfo>>;

/// True for commands that make an in-flight `Load` stale.
pub(super) fn supersedes_load(cmd: &PlayerCmd) -> bool {
    matches!(cmd, PlayerCmd::Load { .. } | PlayerCmd::Stop | PlayerCmd::Quit)
}
