use rand::RngExt;

use crate::api::{Playlist, PlaylistItem, Track};

/// The active mix and the position within it.
///
/// A queue always has at least one item and a valid current index; an empty
/// mix is modelled as the absence of the whole queue.
#[derive(Debug, Clone)]
pub struct Queue {
    playlist: Playlist,
    current: usize,
}

impl Queue {
    pub fn new(playlist: Playlist) -> Option<Self> {
        if playlist.items.is_empty() {
            None
        } else {
            Some(Self { playlist, current: 0 })
        }
    }

    /// Rebuilds a queue from persisted state. A stale position (the mix
    /// shrank since it was saved) snaps back to the first item.
    pub fn restored(playlist: Playlist, index: usize) -> Option<Self> {
        let mut queue = Self::new(playlist)?;
        if index < queue.playlist.items.len() {
            queue.current = index;
        }
        Some(queue)
    }

    pub fn prompt(&self) -> &str {
        &self.playlist.prompt
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn items(&self) -> &[PlaylistItem] {
        &self.playlist.items
    }

    pub fn len(&self) -> usize {
        self.playlist.items.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_track(&self) -> &Track {
        &self.playlist.items[self.current].track
    }

    pub fn jump_to(&mut self, index: usize) -> bool {
        if index < self.playlist.items.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// Moves forward: circularly when sequential, or to a uniformly random
    /// slot when shuffling. A random pick may land on the slot already
    /// playing; there is no exclusion rule.
    pub fn advance(&mut self, shuffle: bool) {
        let len = self.playlist.items.len();
        if shuffle {
            self.current = rand::rng().random_range(0..len);
        } else {
            self.current = (self.current + 1) % len;
        }
    }

    /// Moves back one slot, wrapping at the front. Shuffle does not apply.
    pub fn step_back(&mut self) {
        let len = self.playlist.items.len();
        self.current = (self.current + len - 1) % len;
    }
}
