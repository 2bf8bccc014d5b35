use super::*;
use std::sync::mpsc;
use std::time::Duration;

fn make_track() -> Track {
    Track {
        id: 7,
        title: "Night Drive".to_string(),
        tags: vec!["chill".to_string()],
        url: Some("http://localhost:8000/media/tracks/7.mp3".to_string()),
        cover_url: None,
        duration: Some(183.0),
        uploaded_at: None,
        times_selected: 0,
    }
}

fn make_handle() -> (MprisHandle, Arc<Mutex<SharedState>>, mpsc::Receiver<()>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();
    let handle = MprisHandle {
        state: state.clone(),
        notify: notify_tx,
    };
    (handle, state, notify_rx)
}

#[test]
fn set_track_metadata_sets_and_clears_shared_state() {
    let (handle, state, _notify_rx) = make_handle();

    let track = make_track();
    handle.set_track_metadata(Some(&track), Some(Duration::from_micros(1_234_567)));

    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Night Drive"));
        assert_eq!(
            s.url.as_deref(),
            Some("http://localhost:8000/media/tracks/7.mp3")
        );
        assert_eq!(s.length_micros, Some(1_234_567));
        assert_eq!(
            s.track_id.as_ref().map(|p| p.as_str()),
            Some("/org/mpris/MediaPlayer2/track/7")
        );
    }

    handle.set_track_metadata(None, None);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title, None);
        assert_eq!(s.url, None);
        assert_eq!(s.length_micros, None);
        assert!(s.track_id.is_none());
    }
}

#[test]
fn setters_notify_only_on_change() {
    let (handle, _state, notify_rx) = make_handle();

    handle.set_playback(PlaybackState::Playing, true);
    assert!(notify_rx.try_recv().is_ok());

    handle.set_playback(PlaybackState::Playing, true);
    assert!(notify_rx.try_recv().is_err());

    let track = make_track();
    handle.set_track_metadata(Some(&track), None);
    assert!(notify_rx.try_recv().is_ok());

    handle.set_track_metadata(Some(&track), None);
    assert!(notify_rx.try_recv().is_err());
}

#[test]
fn playback_status_maps_state_to_mpris_strings() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    {
        let mut s = state.lock().unwrap();
        s.playback = PlaybackState::Stopped;
    }
    assert_eq!(iface.playback_status(), "Stopped");

    {
        let mut s = state.lock().unwrap();
        s.playback = PlaybackState::Playing;
    }
    assert_eq!(iface.playback_status(), "Playing");

    {
        let mut s = state.lock().unwrap();
        s.playback = PlaybackState::Paused;
    }
    assert_eq!(iface.playback_status(), "Paused");
}

#[test]
fn skip_capabilities_follow_queue_presence_flag() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    assert!(!iface.can_go_next());
    assert!(!iface.can_go_previous());

    {
        let mut s = state.lock().unwrap();
        s.can_skip = true;
    }
    assert!(iface.can_go_next());
    assert!(iface.can_go_previous());
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    assert!(iface.metadata().is_empty());

    {
        let mut s = state.lock().unwrap();
        s.title = Some("Night Drive".to_string());
        s.url = Some("http://localhost:8000/media/tracks/7.mp3".to_string());
        s.length_micros = Some(42);
        s.track_id = ObjectPath::try_from("/org/mpris/MediaPlayer2/track/7")
            .ok()
            .map(|p| p.to_owned());
    }

    let map = iface.metadata();
    for k in ["mpris:trackid", "xesam:title", "xesam:url", "mpris:length"] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}
