use std::sync::Arc;

use tempfile::tempdir;

use crate::api::{Playlist, PlaylistItem, Track};

use super::*;

fn t(id: u64, title: &str) -> Track {
    Track {
        id,
        title: title.to_string(),
        tags: Vec::new(),
        url: None,
        cover_url: None,
        duration: None,
        uploaded_at: None,
        times_selected: 0,
    }
}

#[test]
fn file_store_round_trips_values() {
    let dir = tempdir().unwrap();
    let store = FileStore::new(dir.path().to_path_buf()).unwrap();
    assert!(store.read("light").is_none());
    store.write("light", "1");
    assert_eq!(store.read("light").as_deref(), Some("1"));
    store.clear("light");
    assert!(store.read("light").is_none());
}

#[test]
fn file_store_survives_reopening() {
    let dir = tempdir().unwrap();
    {
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        store.write("index", "4");
    }
    let store = FileStore::new(dir.path().to_path_buf()).unwrap();
    assert_eq!(load_index(&store), Some(4));
}

#[test]
fn favorites_round_trip_through_json() {
    let store = MemoryStore::default();
    save_favorites(&store, &[t(3, "A"), t(9, "B")]);
    let restored = load_favorites(&store);
    assert_eq!(restored.len(), 2);
    assert_eq!(restored[0].id, 3);
    assert_eq!(restored[1].title, "B");
}

#[test]
fn mangled_favorites_fall_back_to_empty() {
    let store = MemoryStore::default();
    store.write(keys::FAVORITES, "not json at all");
    assert!(load_favorites(&store).is_empty());
}

#[test]
fn playlist_round_trip_keeps_prompt_and_order() {
    let store = MemoryStore::default();
    let playlist = Playlist {
        id: None,
        name: None,
        prompt: "rainy evening".to_string(),
        created_at: None,
        items: vec![
            PlaylistItem { order: 0, weight: 0.9, track: t(5, "first") },
            PlaylistItem { order: 1, weight: 0.6, track: t(2, "second") },
        ],
    };
    save_playlist(&store, &playlist);
    let restored = load_playlist(&store).unwrap();
    assert_eq!(restored.prompt, "rainy evening");
    let ids: Vec<u64> = restored.items.iter().map(|item| item.track.id).collect();
    assert_eq!(ids, vec![5, 2]);
    assert_eq!(restored.items[0].weight, 0.9);
}

#[test]
fn mangled_playlist_reads_as_absent() {
    let store = MemoryStore::default();
    assert!(load_playlist(&store).is_none());
    store.write(keys::PLAYLIST, "{broken");
    assert!(load_playlist(&store).is_none());
}

#[test]
fn index_parses_bare_integer_string() {
    let store = MemoryStore::default();
    assert_eq!(load_index(&store), None);
    store.write(keys::INDEX, "3");
    assert_eq!(load_index(&store), Some(3));
    store.write(keys::INDEX, "three");
    assert_eq!(load_index(&store), None);
}

#[test]
fn light_theme_flag_is_literal_one() {
    let store = MemoryStore::default();
    assert!(!load_light_theme(&store));
    save_light_theme(&store, true);
    assert_eq!(store.read(keys::LIGHT).as_deref(), Some("1"));
    save_light_theme(&store, false);
    assert!(store.read(keys::LIGHT).is_none());
}

#[test]
fn arc_wrapped_store_shares_state() {
    let store = Arc::new(MemoryStore::default());
    let boxed: Box<dyn SessionStore> = Box::new(store.clone());
    boxed.write("index", "2");
    assert_eq!(store.read("index").as_deref(), Some("2"));
}
