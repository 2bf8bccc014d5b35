//! MPRIS (`org.mpris.MediaPlayer2`) bridge so desktop media keys and
//! `playerctl` can drive playback.

use std::collections::HashMap;
use std::sync::mpsc::{Sender, TryRecvError};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use async_io::{Timer, block_on};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::api::Track;

const MPRIS_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.vibo";

/// Remote commands arriving over D-Bus, handled by the main event loop.
#[derive(Clone, Debug)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackState,
    can_skip: bool,
    title: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<ObjectPath<'static>>,
}

/// Main-thread side of the bridge. Setters deduplicate, so they are safe
/// to call once per frame; a change pokes the bus thread to emit
/// `PropertiesChanged`.
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: PlaybackState, can_skip: bool) {
        if let Ok(mut s) = self.state.lock() {
            if s.playback != playback || s.can_skip != can_skip {
                s.playback = playback;
                s.can_skip = can_skip;
                let _ = self.notify.send(());
            }
        }
    }

    pub fn set_track_metadata(&self, track: Option<&Track>, length: Option<Duration>) {
        let title = track.map(|t| t.title.clone());
        let url = track.and_then(|t| t.url.clone());
        let length_micros = length.map(|d| d.as_micros() as i64);
        let track_id =
            track.and_then(|t| ObjectPath::try_from(format!("{MPRIS_PATH}/track/{}", t.id)).ok());

        if let Ok(mut s) = self.state.lock() {
            if s.title != title
                || s.url != url
                || s.length_micros != length_micros
                || s.track_id != track_id
            {
                s.title = title;
                s.url = url;
                s.length_micros = length_micros;
                s.track_id = track_id;
                let _ = self.notify.send(());
            }
        }
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "vibo"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        self.state.lock().map(|s| s.can_skip).unwrap_or(false)
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        self.state.lock().map(|s| s.can_skip).unwrap_or(false)
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };
        if let Some(id) = &s.track_id {
            put(&mut map, "mpris:trackid", Value::from(id.clone()));
        }
        if let Some(title) = &s.title {
            put(&mut map, "xesam:title", Value::from(title.clone()));
        }
        if let Some(url) = &s.url {
            put(&mut map, "xesam:url", Value::from(url.clone()));
        }
        if let Some(length) = s.length_micros {
            put(&mut map, "mpris:length", Value::from(length));
        }
        map
    }
}

fn put(map: &mut HashMap<String, OwnedValue>, key: &str, value: Value<'_>) {
    if let Ok(v) = OwnedValue::try_from(value) {
        map.insert(key.to_string(), v);
    }
}

/// Registers the service on the session bus from a background thread.
/// Registration failure (no bus, name already taken) downgrades to a
/// warning; playback keeps working without desktop integration.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    log::warn!("mpris: failed to connect to session bus: {e}");
                    return;
                }
            };

            if let Err(e) = connection.request_name(BUS_NAME).await {
                log::warn!("mpris: failed to acquire name: {e}");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server
                .at(MPRIS_PATH, RootIface { tx: tx.clone() })
                .await
            {
                log::warn!("mpris: failed to register root iface: {e}");
                return;
            }

            if let Err(e) = object_server
                .at(
                    MPRIS_PATH,
                    PlayerIface {
                        tx,
                        state: state_for_thread,
                    },
                )
                .await
            {
                log::warn!("mpris: failed to register player iface: {e}");
                return;
            }

            let player_ref = match object_server.interface::<_, PlayerIface>(MPRIS_PATH).await {
                Ok(r) => r,
                Err(e) => {
                    log::warn!("mpris: failed to look up player iface: {e}");
                    return;
                }
            };

            // Serve until the handle is dropped, flushing property change
            // signals whenever the main thread poked us.
            loop {
                Timer::after(Duration::from_millis(500)).await;
                let mut dirty = false;
                loop {
                    match notify_rx.try_recv() {
                        Ok(()) => dirty = true,
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => return,
                    }
                }
                if dirty {
                    let iface = player_ref.get().await;
                    let emitter = player_ref.signal_emitter();
                    let _ = iface.playback_status_changed(emitter).await;
                    let _ = iface.metadata_changed(emitter).await;
                    let _ = iface.can_go_next_changed(emitter).await;
                    let _ = iface.can_go_previous_changed(emitter).await;
                }
            }
        });
    });

    MprisHandle {
        state,
        notify: notify_tx,
    }
}

#[cfg(test)]
mod tests;
