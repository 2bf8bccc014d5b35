//! Typed accessors over the session store.
//!
//! Value encodings match what the web client kept in browser storage: JSON
//! for the favorites and playlist, a bare integer string for the queue
//! position and the literal `"1"` for the light theme flag.

use crate::api::{Playlist, Track};

use super::store::SessionStore;

pub mod keys {
    pub const LIGHT: &str = "light";
    pub const FAVORITES: &str = "favorites";
    pub const PLAYLIST: &str = "playlist";
    pub const INDEX: &str = "index";
}

pub fn load_favorites(store: &dyn SessionStore) -> Vec<Track> {
    let Some(raw) = store.read(keys::FAVORITES) else {
        return Vec::new();
    };
    serde_json::from_str(&raw).unwrap_or_else(|err| {
        log::debug!("ignoring unreadable favorites state: {err}");
        Vec::new()
    })
}

pub fn save_favorites(store: &dyn SessionStore, favorites: &[Track]) {
    match serde_json::to_string(favorites) {
        Ok(raw) => store.write(keys::FAVORITES, &raw),
        Err(err) => log::warn!("could not encode favorites state: {err}"),
    }
}

pub fn load_playlist(store: &dyn SessionStore) -> Option<Playlist> {
    let raw = store.read(keys::PLAYLIST)?;
    match serde_json::from_str(&raw) {
        Ok(playlist) => Some(playlist),
        Err(err) => {
            log::debug!("ignoring unreadable playlist state: {err}");
            None
        }
    }
}

pub fn save_playlist(store: &dyn SessionStore, playlist: &Playlist) {
    match serde_json::to_string(playlist) {
        Ok(raw) => store.write(keys::PLAYLIST, &raw),
        Err(err) => log::warn!("could not encode playlist state: {err}"),
    }
}

pub fn load_index(store: &dyn SessionStore) -> Option<usize> {
    store.read(keys::INDEX)?.trim().parse().ok()
}

pub fn save_index(store: &dyn SessionStore, index: usize) {
    store.write(keys::INDEX, &index.to_string());
}

pub fn load_light_theme(store: &dyn SessionStore) -> bool {
    store.read(keys::LIGHT).as_deref() == Some("1")
}

pub fn save_light_theme(store: &dyn SessionStore, light: bool) {
    if light {
        store.write(keys::LIGHT, "1");
    } else {
        store.clear(keys::LIGHT);
    }
}
