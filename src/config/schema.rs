use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/vibo/config.toml` or `~/.config/vibo/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `VIBO__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub ui: UiSettings,
    pub playback: PlaybackSettings,
    pub storage: StorageSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            ui: UiSettings::default(),
            playback: PlaybackSettings::default(),
            storage: StorageSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL of the backend, without a trailing slash.
    pub base_url: String,
    /// Timeout for ordinary API calls (seconds).
    pub timeout_secs: u64,
    /// Timeout for multipart uploads (seconds). Uploads move whole media
    /// files, so they get a far bigger budget than plain API calls.
    pub upload_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            upload_timeout_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top "vibo" header box.
    pub header_text: String,
    /// How long a pause in typing arms a tag suggestion lookup (milliseconds).
    pub suggest_debounce_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ upload tracks, ask for a mood, press play ~ ".to_string(),
            suggest_debounce_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Initial output volume, `0.0..=1.0`.
    pub volume: f32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            shuffle: false,
            volume: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory for session state and the log file. Defaults to
    /// `$XDG_DATA_HOME/vibo` when unset.
    pub dir: Option<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self { dir: None }
    }
}
