use std::io::Read;
use std::sync::{Arc, Mutex};

use super::client::CountingReader;
use super::*;

#[test]
fn track_deserializes_backend_shape() {
    let body = r#"{
        "id": 7,
        "title": "Night Drive",
        "file": "tracks/night-drive.mp3",
        "tags": ["synth", "calm"],
        "url": "http://localhost:8000/media/tracks/night-drive.mp3",
        "cover_url": null,
        "duration": 214.5,
        "uploaded_at": "2024-11-02T10:15:00Z",
        "times_selected": 3
    }"#;
    let track: Track = serde_json::from_str(body).unwrap();
    assert_eq!(track.id, 7);
    assert_eq!(track.title, "Night Drive");
    assert_eq!(track.tags, vec!["synth", "calm"]);
    assert_eq!(track.duration, Some(214.5));
    assert_eq!(track.times_selected, 3);
    assert!(track.cover_url.is_none());
}

#[test]
fn track_tolerates_missing_optionals() {
    let track: Track = serde_json::from_str(r#"{"id": 1, "title": "Bare"}"#).unwrap();
    assert!(track.tags.is_empty());
    assert!(track.url.is_none());
    assert!(track.duration.is_none());
    assert_eq!(track.times_selected, 0);
}

#[test]
fn tag_line_joins_with_commas() {
    let track: Track =
        serde_json::from_str(r#"{"id": 1, "title": "T", "tags": ["lofi", "rain", "focus"]}"#)
            .unwrap();
    assert_eq!(track.tag_line(), "lofi, rain, focus");
}

#[test]
fn playlist_deserializes_generate_mix_response() {
    let body = r#"{
        "id": 12,
        "name": "mix",
        "prompt": "rainy evening",
        "created_at": "2024-11-02T10:15:00Z",
        "items": [
            {"order": 0, "weight": 0.9, "track": {"id": 3, "title": "A"}},
            {"order": 1, "weight": 0.4, "track": {"id": 5, "title": "B"}}
        ]
    }"#;
    let playlist: Playlist = serde_json::from_str(body).unwrap();
    assert_eq!(playlist.prompt, "rainy evening");
    assert_eq!(playlist.items.len(), 2);
    assert_eq!(playlist.items[0].track.id, 3);
    assert_eq!(playlist.items[1].weight, 0.4);
}

#[test]
fn playlist_item_weight_defaults_to_one() {
    let body = r#"{"prompt": "p", "items": [{"order": 0, "track": {"id": 1, "title": "A"}}]}"#;
    let playlist: Playlist = serde_json::from_str(body).unwrap();
    assert_eq!(playlist.items[0].weight, 1.0);
}

#[test]
fn counting_reader_reports_cumulative_percent() {
    let progress: ProgressHandle = Arc::new(Mutex::new(0));
    let data = vec![0u8; 200];
    let mut reader = CountingReader {
        inner: &data[..],
        sent: 0,
        offset: 0,
        total: 400,
        progress: progress.clone(),
    };
    let mut buf = [0u8; 100];
    reader.read(&mut buf).unwrap();
    assert_eq!(*progress.lock().unwrap(), 25);
    reader.read(&mut buf).unwrap();
    assert_eq!(*progress.lock().unwrap(), 50);

    // A later part picks up where the first left off.
    let mut second = CountingReader {
        inner: &data[..],
        sent: 0,
        offset: 200,
        total: 400,
        progress: progress.clone(),
    };
    let mut rest = Vec::new();
    second.read_to_end(&mut rest).unwrap();
    assert_eq!(*progress.lock().unwrap(), 100);
}
