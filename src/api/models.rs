use serde::{Deserialize, Serialize};

/// A track as the backend reports it.
///
/// Also snapshotted into favorites and persisted playlists, hence
/// `Serialize`. Unknown fields (the server includes a few internal ones,
/// like the raw storage path) are ignored on the way in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Playable media URL. Tracks without one are listed but never probed
    /// or loaded.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    /// Server-side duration in seconds. Unreliable; the displayed value
    /// comes from client-side probing instead.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
    /// How often the mix generator has picked this track.
    #[serde(default)]
    pub times_selected: u64,
}

impl Track {
    /// Tags joined for single-line display.
    pub fn tag_line(&self) -> String {
        self.tags.join(", ")
    }
}

/// One weighted slot of a generated mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub order: u64,
    /// Relevance weight the generator assigned. Heavier tracks matched the
    /// prompt better; the server defaults to 1.0.
    #[serde(default = "default_weight")]
    pub weight: f64,
    pub track: Track,
}

fn default_weight() -> f64 {
    1.0
}

/// A generated mix: the originating prompt plus its ordered items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}
