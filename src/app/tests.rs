use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::api::{Playlist, PlaylistItem, Track};
use crate::storage::{self, MemoryStore, SessionStore};

use super::*;

fn t(id: u64, title: &str) -> Track {
    Track {
        id,
        title: title.into(),
        tags: Vec::new(),
        url: Some(format!("http://localhost:8000/media/{id}.mp3")),
        cover_url: None,
        duration: None,
        uploaded_at: None,
        times_selected: 0,
    }
}

fn mix(prompt: &str, tracks: Vec<Track>) -> Playlist {
    Playlist {
        id: None,
        name: None,
        prompt: prompt.into(),
        created_at: None,
        items: tracks
            .into_iter()
            .enumerate()
            .map(|(i, track)| PlaylistItem {
                order: i as u64,
                weight: 1.0,
                track,
            })
            .collect(),
    }
}

fn fresh_app() -> App {
    App::new(Box::new(MemoryStore::default()))
}

fn app_with_store() -> (App, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    (App::new(Box::new(store.clone())), store)
}

#[test]
fn parsed_tags_drop_empties_keep_duplicates() {
    let mut form = UploadForm::default();
    form.tags = "calm, focus,,calm".into();
    assert_eq!(form.parsed_tags(), vec!["calm", "focus", "calm"]);
}

#[test]
fn to_request_requires_an_audio_file() {
    let mut form = UploadForm::default();
    assert!(form.to_request().is_none());

    form.file = "/music/a.mp3".into();
    form.title = "   ".into();
    let req = form.to_request().unwrap();
    assert_eq!(req.file, PathBuf::from("/music/a.mp3"));
    assert!(req.title.is_none());
    assert!(req.cover.is_none());
    assert!(req.tags.is_empty());
}

#[test]
fn debounce_holds_lookup_until_window_passes() {
    let mut form = UploadForm::default();
    let start = Instant::now();
    form.tags = "ca".into();
    form.note_tags_edited(start, Duration::from_millis(250));

    assert!(form.due_lookup(start + Duration::from_millis(100)).is_none());
    let (_, fragment) = form.due_lookup(start + Duration::from_millis(260)).unwrap();
    assert_eq!(fragment, "ca");
    // it fires once
    assert!(form.due_lookup(start + Duration::from_millis(300)).is_none());
}

#[test]
fn retyping_rearms_the_debounce() {
    let mut form = UploadForm::default();
    let start = Instant::now();
    let debounce = Duration::from_millis(250);
    form.tags = "c".into();
    form.note_tags_edited(start, debounce);
    form.tags = "ca".into();
    form.note_tags_edited(start + Duration::from_millis(100), debounce);

    assert!(form.due_lookup(start + Duration::from_millis(300)).is_none());
    let (_, fragment) = form.due_lookup(start + Duration::from_millis(400)).unwrap();
    assert_eq!(fragment, "ca");
}

#[test]
fn lookup_keys_on_fragment_after_last_comma() {
    let mut form = UploadForm::default();
    let start = Instant::now();
    form.tags = "calm, focus, ra".into();
    form.note_tags_edited(start, Duration::from_millis(250));
    let (_, fragment) = form.due_lookup(start + Duration::from_millis(260)).unwrap();
    assert_eq!(fragment, "ra");
}

#[test]
fn stale_suggestion_response_is_discarded() {
    let mut form = UploadForm::default();
    let start = Instant::now();
    let debounce = Duration::from_millis(250);

    form.tags = "ca".into();
    form.note_tags_edited(start, debounce);
    let (first, _) = form.due_lookup(start + debounce).unwrap();

    form.tags = "calm, f".into();
    form.note_tags_edited(start + Duration::from_millis(400), debounce);
    let (second, _) = form.due_lookup(start + Duration::from_millis(700)).unwrap();

    // the older response lands after the newer request fired
    assert!(!form.accept_suggestions(first, vec!["calm".into()]));
    assert!(form.suggestions.is_empty());
    assert!(form.accept_suggestions(second, vec!["focus".into()]));
    assert_eq!(form.suggestions, vec!["focus"]);
}

#[test]
fn response_arriving_behind_a_pending_lookup_is_discarded() {
    let mut form = UploadForm::default();
    let start = Instant::now();
    let debounce = Duration::from_millis(250);

    form.tags = "ca".into();
    form.note_tags_edited(start, debounce);
    let (seq, _) = form.due_lookup(start + debounce).unwrap();

    // more typing before the response lands
    form.tags = "cal".into();
    form.note_tags_edited(start + Duration::from_millis(300), debounce);
    assert!(!form.accept_suggestions(seq, vec!["calm".into()]));
    assert!(form.suggestions.is_empty());
}

#[test]
fn empty_fragment_clears_dropdown_and_orphans_lookup() {
    let mut form = UploadForm::default();
    let start = Instant::now();
    let debounce = Duration::from_millis(250);

    form.tags = "ca".into();
    form.note_tags_edited(start, debounce);
    let (seq, _) = form.due_lookup(start + debounce).unwrap();
    assert!(form.accept_suggestions(seq, vec!["calm".into(), "canon".into()]));

    form.tags = "calm, ".into();
    form.note_tags_edited(start + Duration::from_millis(600), debounce);
    assert!(form.suggestions.is_empty());
    assert!(form.due_lookup(start + Duration::from_secs(5)).is_none());
    // a response for the orphaned lookup changes nothing
    assert!(!form.accept_suggestions(seq, vec!["calm".into()]));
    assert!(form.suggestions.is_empty());
}

#[test]
fn highlight_stays_within_suggestions() {
    let mut form = UploadForm::default();
    form.highlight_next();
    assert_eq!(form.highlighted, None);

    form.suggestions = vec!["calm".into(), "canon".into()];
    form.highlight_prev();
    assert_eq!(form.highlighted, Some(0));
    form.highlight_next();
    form.highlight_next();
    form.highlight_next();
    assert_eq!(form.highlighted, Some(1));
    form.highlight_prev();
    form.highlight_prev();
    assert_eq!(form.highlighted, Some(0));
}

#[test]
fn picking_appends_unless_already_present() {
    let mut form = UploadForm::default();
    form.tags = "calm, fo".into();
    form.suggestions = vec!["focus".into()];
    form.highlighted = Some(0);
    assert!(form.pick_highlighted());
    assert_eq!(form.tags, "calm, fo, focus");
    assert!(form.suggestions.is_empty());
    assert_eq!(form.highlighted, None);

    form.suggestions = vec!["focus".into()];
    form.highlighted = Some(0);
    form.pick_highlighted();
    assert_eq!(form.tags, "calm, fo, focus");
}

#[test]
fn picking_without_a_highlight_does_nothing() {
    let mut form = UploadForm::default();
    form.tags = "ca".into();
    form.suggestions = vec!["calm".into()];
    assert!(!form.pick_highlighted());
    assert_eq!(form.tags, "ca");
}

#[test]
fn reset_clears_every_field() {
    let mut form = UploadForm::default();
    form.file = "/music/a.mp3".into();
    form.title = "A".into();
    form.tags = "calm".into();
    form.cover = "/music/a.png".into();
    form.suggestions = vec!["calm".into()];
    form.reset();
    assert!(form.file.is_empty());
    assert!(form.title.is_empty());
    assert!(form.tags.is_empty());
    assert!(form.cover.is_empty());
    assert!(form.suggestions.is_empty());
}

#[test]
fn queue_needs_at_least_one_item() {
    assert!(Queue::new(mix("m", Vec::new())).is_none());
}

#[test]
fn sequential_advance_wraps_around() {
    let mut queue = Queue::new(mix("m", vec![t(1, "A"), t(2, "B"), t(3, "C")])).unwrap();
    queue.advance(false);
    assert_eq!(queue.current_index(), 1);
    queue.advance(false);
    queue.advance(false);
    assert_eq!(queue.current_index(), 0);
}

#[test]
fn step_back_wraps_at_the_front() {
    let mut queue = Queue::new(mix("m", vec![t(1, "A"), t(2, "B"), t(3, "C")])).unwrap();
    queue.step_back();
    assert_eq!(queue.current_index(), 2);
    assert_eq!(queue.current_track().id, 3);
}

#[test]
fn shuffle_advance_stays_in_bounds() {
    let tracks = (1..=5).map(|i| t(i, "x")).collect();
    let mut queue = Queue::new(mix("m", tracks)).unwrap();
    for _ in 0..100 {
        queue.advance(true);
        assert!(queue.current_index() < queue.len());
    }
}

#[test]
fn restored_queue_clamps_stale_index() {
    let queue = Queue::restored(mix("m", vec![t(1, "A"), t(2, "B")]), 7).unwrap();
    assert_eq!(queue.current_index(), 0);
    let queue = Queue::restored(mix("m", vec![t(1, "A"), t(2, "B")]), 1).unwrap();
    assert_eq!(queue.current_index(), 1);
}

#[test]
fn jump_to_rejects_out_of_bounds() {
    let mut queue = Queue::new(mix("m", vec![t(1, "A"), t(2, "B")])).unwrap();
    assert!(!queue.jump_to(5));
    assert_eq!(queue.current_index(), 0);
    assert!(queue.jump_to(1));
    assert_eq!(queue.current_index(), 1);
}

#[test]
fn apply_mix_resets_position_and_persists() {
    let (mut app, store) = app_with_store();
    let playlist = Playlist {
        id: None,
        name: None,
        prompt: "calm focus".into(),
        created_at: None,
        items: vec![
            PlaylistItem { order: 0, weight: 0.9, track: t(1, "A") },
            PlaylistItem { order: 1, weight: 0.6, track: t(2, "B") },
        ],
    };
    app.apply_mix(playlist);

    let queue = app.queue.as_ref().unwrap();
    assert_eq!(queue.current_index(), 0);
    assert_eq!(queue.current_track().id, 1);
    assert_eq!(app.current_track.as_ref().unwrap().id, 1);
    assert_eq!(store.read("index").as_deref(), Some("0"));

    let saved = storage::load_playlist(store.as_ref()).unwrap();
    assert_eq!(saved.prompt, "calm focus");
    assert_eq!(saved.items.len(), 2);
}

#[test]
fn next_and_prev_persist_the_position() {
    let (mut app, store) = app_with_store();
    app.apply_mix(mix("m", vec![t(1, "A"), t(2, "B"), t(3, "C")]));

    assert_eq!(app.play_next().unwrap().id, 2);
    assert_eq!(store.read("index").as_deref(), Some("1"));
    assert_eq!(app.play_prev().unwrap().id, 1);
    assert_eq!(store.read("index").as_deref(), Some("0"));
}

#[test]
fn prev_wraps_and_ignores_shuffle() {
    let mut app = fresh_app();
    app.apply_mix(mix("m", vec![t(1, "A"), t(2, "B"), t(3, "C")]));
    app.shuffle = true;
    assert_eq!(app.play_prev().unwrap().id, 3);
    assert_eq!(app.play_prev().unwrap().id, 2);
}

#[test]
fn restore_reproduces_the_saved_position() {
    let store = Arc::new(MemoryStore::default());
    {
        let mut app = App::new(Box::new(store.clone()));
        app.apply_mix(mix("evening", vec![t(1, "A"), t(2, "B"), t(3, "C")]));
        app.play_next();
    }

    let app = App::new(Box::new(store.clone()));
    let queue = app.queue.as_ref().unwrap();
    assert_eq!(queue.prompt(), "evening");
    assert_eq!(queue.current_index(), 1);
    assert_eq!(app.current_track.as_ref().unwrap().id, 2);
}

#[test]
fn restore_with_stale_index_snaps_to_first() {
    let store = Arc::new(MemoryStore::default());
    storage::save_playlist(store.as_ref(), &mix("m", vec![t(1, "A"), t(2, "B")]));
    storage::save_index(store.as_ref(), 9);

    let app = App::new(Box::new(store.clone()));
    assert_eq!(app.queue.as_ref().unwrap().current_index(), 0);
}

#[test]
fn favorites_toggle_twice_restores_the_set() {
    let (mut app, store) = app_with_store();
    app.toggle_favorite(&t(4, "Keep"));
    app.toggle_favorite(&t(9, "New"));
    assert_eq!(app.favorites[0].id, 9);

    app.toggle_favorite(&t(9, "New"));
    assert_eq!(app.favorites.len(), 1);
    assert!(app.is_favorite(4));

    let persisted = storage::load_favorites(store.as_ref());
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].id, 4);
}

#[test]
fn light_theme_persists_as_a_flag() {
    let (mut app, store) = app_with_store();
    assert!(!app.light_mode);
    app.toggle_light_mode();
    assert_eq!(store.read("light").as_deref(), Some("1"));
    app.toggle_light_mode();
    assert!(store.read("light").is_none());
}

#[test]
fn probe_targets_skip_cached_and_unplayable() {
    let mut app = fresh_app();
    let mut no_url = t(3, "C");
    no_url.url = None;
    app.set_tracks(vec![t(1, "A"), t(2, "B"), no_url]);
    app.set_duration(1, Duration::from_secs(200));

    let targets = app.probe_targets();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].id, 2);
}

#[test]
fn empty_catalog_probes_nothing() {
    let mut app = fresh_app();
    app.set_tracks(Vec::new());
    assert!(app.probe_targets().is_empty());
    assert!(app.error.is_none());
}

#[test]
fn duration_prefers_probe_over_server_value() {
    let mut app = fresh_app();
    let mut track = t(1, "A");
    track.duration = Some(100.0);
    assert_eq!(app.duration_for(&track), Some(Duration::from_secs(100)));
    app.set_duration(1, Duration::from_secs(150));
    assert_eq!(app.duration_for(&track), Some(Duration::from_secs(150)));
}

#[test]
fn forget_track_spares_favorites_and_queue() {
    let mut app = fresh_app();
    app.set_tracks(vec![t(1, "A"), t(2, "B")]);
    app.set_duration(1, Duration::from_secs(90));
    app.toggle_favorite(&t(1, "A"));
    app.apply_mix(mix("m", vec![t(1, "A")]));

    app.forget_track(1);
    assert!(app.tracks.iter().all(|t| t.id != 1));
    assert!(!app.durations.contains_key(&1));
    assert!(app.is_favorite(1));
    assert_eq!(app.queue.as_ref().unwrap().current_track().id, 1);
}

#[test]
fn volume_adjustment_clamps() {
    let mut app = fresh_app();
    app.adjust_volume(0.5);
    assert_eq!(app.volume, 1.0);
    app.adjust_volume(-0.3);
    assert!((app.volume - 0.7).abs() < 1e-6);
    app.adjust_volume(-2.0);
    assert_eq!(app.volume, 0.0);
}

#[test]
fn settle_upload_resets_progress() {
    let mut app = fresh_app();
    app.uploading = true;
    app.upload_progress = 80;
    app.settle_upload();
    assert!(!app.uploading);
    assert_eq!(app.upload_progress, 0);
}

#[test]
fn play_direct_leaves_the_queue_position() {
    let mut app = fresh_app();
    app.apply_mix(mix("m", vec![t(1, "A"), t(2, "B")]));
    app.play_direct(&t(9, "Solo"));
    assert_eq!(app.current_track.as_ref().unwrap().id, 9);
    assert_eq!(app.queue.as_ref().unwrap().current_index(), 0);
}

#[test]
fn pane_cycle_round_trips() {
    let mut pane = Pane::Catalog;
    for _ in 0..4 {
        pane = pane.next();
    }
    assert_eq!(pane, Pane::Catalog);
    assert_eq!(Pane::Catalog.prev(), Pane::Queue);
    assert_eq!(Pane::Queue.next(), Pane::Catalog);
}
