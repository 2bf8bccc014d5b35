//! Application model types: `App`, `Pane` and `Modal`.
//!
//! The `App` struct holds the catalog, the active queue, the upload form
//! and the transient UI state used by the renderer and the event loop.

use std::collections::HashMap;
use std::time::Duration;

use crate::api::{Playlist, Track};
use crate::storage::{self, SessionStore};

use super::queue::Queue;
use super::upload::UploadForm;

/// Which pane of the main screen has focus.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pane {
    Catalog,
    Upload,
    Prompt,
    Queue,
}

impl Pane {
    pub fn next(self) -> Self {
        match self {
            Self::Catalog => Self::Upload,
            Self::Upload => Self::Prompt,
            Self::Prompt => Self::Queue,
            Self::Queue => Self::Catalog,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Catalog => Self::Queue,
            Self::Upload => Self::Catalog,
            Self::Prompt => Self::Upload,
            Self::Queue => Self::Prompt,
        }
    }
}

/// A transient overlay above the main screen.
#[derive(Clone, Debug)]
pub enum Modal {
    TrackDetail(Track),
    TopTracks,
    Favorites,
    ConfirmDelete(Track),
}

/// The main application model.
pub struct App {
    store: Box<dyn SessionStore>,

    pub tracks: Vec<Track>,
    pub top_tracks: Vec<Track>,
    pub favorites: Vec<Track>,
    pub durations: HashMap<u64, Duration>,

    pub queue: Option<Queue>,
    /// The track shown in the now-playing bar. Direct plays set it without
    /// touching the queue position.
    pub current_track: Option<Track>,
    pub shuffle: bool,
    pub volume: f32,

    pub pane: Pane,
    pub modal: Option<Modal>,
    pub catalog_cursor: usize,
    pub queue_cursor: usize,
    pub modal_cursor: usize,

    pub upload: UploadForm,
    pub uploading: bool,
    pub upload_progress: u8,
    pub suggest_debounce: Duration,

    pub prompt: String,
    pub generating: bool,

    pub light_mode: bool,
    pub error: Option<String>,
}

impl App {
    /// Create a new `App`, restoring favorites, theme and the saved queue
    /// from the provided store.
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        let favorites = storage::load_favorites(store.as_ref());
        let light_mode = storage::load_light_theme(store.as_ref());
        let index = storage::load_index(store.as_ref()).unwrap_or(0);
        let queue = storage::load_playlist(store.as_ref())
            .and_then(|playlist| Queue::restored(playlist, index));
        let current_track = queue.as_ref().map(|q| q.current_track().clone());

        Self {
            store,

            tracks: Vec::new(),
            top_tracks: Vec::new(),
            favorites,
            durations: HashMap::new(),

            queue,
            current_track,
            shuffle: false,
            volume: 1.0,

            pane: Pane::Catalog,
            modal: None,
            catalog_cursor: 0,
            queue_cursor: 0,
            modal_cursor: 0,

            upload: UploadForm::default(),
            uploading: false,
            upload_progress: 0,
            suggest_debounce: Duration::from_millis(250),

            prompt: String::new(),
            generating: false,

            light_mode,
            error: None,
        }
    }

    /// Replace the catalog, keeping the cursor in range.
    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        if self.catalog_cursor >= self.tracks.len() {
            self.catalog_cursor = self.tracks.len().saturating_sub(1);
        }
    }

    /// Tracks that still need a duration probe: playable and not yet cached.
    pub fn probe_targets(&self) -> Vec<Track> {
        self.tracks
            .iter()
            .filter(|t| t.url.is_some() && !self.durations.contains_key(&t.id))
            .cloned()
            .collect()
    }

    /// Record a probed duration.
    pub fn set_duration(&mut self, id: u64, duration: Duration) {
        self.durations.insert(id, duration);
    }

    /// Display duration for a track: probed value first, then whatever the
    /// server reported.
    pub fn duration_for(&self, track: &Track) -> Option<Duration> {
        self.durations.get(&track.id).copied().or_else(|| {
            track
                .duration
                .filter(|d| d.is_finite() && *d >= 0.0)
                .map(Duration::from_secs_f64)
        })
    }

    /// Replace the queue with a freshly generated mix and persist it.
    pub fn apply_mix(&mut self, playlist: Playlist) {
        storage::save_playlist(self.store.as_ref(), &playlist);
        storage::save_index(self.store.as_ref(), 0);
        self.queue = Queue::new(playlist);
        self.queue_cursor = 0;
        if let Some(queue) = &self.queue {
            self.current_track = Some(queue.current_track().clone());
        }
    }

    /// Advance the queue (Next, or natural end of track). Returns the track
    /// to load.
    pub fn play_next(&mut self) -> Option<Track> {
        let shuffle = self.shuffle;
        let queue = self.queue.as_mut()?;
        queue.advance(shuffle);
        self.after_queue_move()
    }

    /// Step the queue backwards. Returns the track to load.
    pub fn play_prev(&mut self) -> Option<Track> {
        let queue = self.queue.as_mut()?;
        queue.step_back();
        self.after_queue_move()
    }

    /// Jump to a specific queue slot. Returns the track to load.
    pub fn play_at(&mut self, index: usize) -> Option<Track> {
        let queue = self.queue.as_mut()?;
        if !queue.jump_to(index) {
            return None;
        }
        self.after_queue_move()
    }

    fn after_queue_move(&mut self) -> Option<Track> {
        let queue = self.queue.as_ref()?;
        let track = queue.current_track().clone();
        storage::save_index(self.store.as_ref(), queue.current_index());
        self.current_track = Some(track.clone());
        Some(track)
    }

    /// Direct play from the catalog or a modal: updates the now-playing
    /// display without touching the queue position.
    pub fn play_direct(&mut self, track: &Track) {
        self.current_track = Some(track.clone());
    }

    /// Toggle a favorite: removing by id, or prepending a snapshot.
    pub fn toggle_favorite(&mut self, track: &Track) {
        if let Some(pos) = self.favorites.iter().position(|t| t.id == track.id) {
            self.favorites.remove(pos);
        } else {
            self.favorites.insert(0, track.clone());
        }
        storage::save_favorites(self.store.as_ref(), &self.favorites);
    }

    pub fn is_favorite(&self, id: u64) -> bool {
        self.favorites.iter().any(|t| t.id == id)
    }

    /// Flip the light/dark theme and persist the flag.
    pub fn toggle_light_mode(&mut self) {
        self.light_mode = !self.light_mode;
        storage::save_light_theme(self.store.as_ref(), self.light_mode);
    }

    /// Drop a deleted track from the catalog, statistics and duration
    /// cache. Favorites keep their snapshot; the queue keeps its item.
    pub fn forget_track(&mut self, id: u64) {
        self.tracks.retain(|t| t.id != id);
        self.top_tracks.retain(|t| t.id != id);
        self.durations.remove(&id);
        if self.catalog_cursor >= self.tracks.len() {
            self.catalog_cursor = self.tracks.len().saturating_sub(1);
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Upload finished (either way): drop the busy flag and the progress.
    pub fn settle_upload(&mut self) {
        self.uploading = false;
        self.upload_progress = 0;
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
    }

    /// Adjust volume by `delta`, clamped to `[0, 1]`.
    pub fn adjust_volume(&mut self, delta: f32) -> f32 {
        self.volume = (self.volume + delta).clamp(0.0, 1.0);
        self.volume
    }

    pub fn has_queue(&self) -> bool {
        self.queue.is_some()
    }

    /// Move the catalog cursor down one row.
    pub fn catalog_down(&mut self) {
        if !self.tracks.is_empty() {
            self.catalog_cursor = (self.catalog_cursor + 1).min(self.tracks.len() - 1);
        }
    }

    /// Move the catalog cursor up one row.
    pub fn catalog_up(&mut self) {
        self.catalog_cursor = self.catalog_cursor.saturating_sub(1);
    }

    /// Move the queue cursor down one row.
    pub fn queue_down(&mut self) {
        if let Some(queue) = &self.queue {
            self.queue_cursor = (self.queue_cursor + 1).min(queue.len() - 1);
        }
    }

    /// Move the queue cursor up one row.
    pub fn queue_up(&mut self) {
        self.queue_cursor = self.queue_cursor.saturating_sub(1);
    }
}
