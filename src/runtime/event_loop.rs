use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::api::Track;
use crate::app::{App, Modal, Pane, UploadField};
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::net::{ApiEvent, ApiRequest, Dispatcher};
use crate::player::{Player, PlayerCmd, PlayerInfo};
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Last observed value of the media thread's end-of-track counter;
    /// a moving counter triggers the queue auto-advance.
    last_ended: u64,
}

/// Main terminal event loop: drains backend completions, syncs with the
/// media thread and MPRIS, draws, and handles input. Returns `Ok(())` when
/// shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    dispatcher: &Dispatcher,
    player: &Player,
    mpris: &MprisHandle,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
    net_rx: &mpsc::Receiver<ApiEvent>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    let player_info = player.info_handle();
    let progress = dispatcher.upload_progress();

    loop {
        while let Ok(event) = net_rx.try_recv() {
            handle_api_event(event, app, dispatcher, player);
        }

        // Debounced tag autocomplete.
        if let Some((seq, fragment)) = app.upload.due_lookup(Instant::now()) {
            dispatcher.dispatch(ApiRequest::SuggestTags { seq, fragment });
        }

        let info = player_info.lock().map(|i| i.clone()).unwrap_or_default();

        // Natural end of track advances the queue like Next would.
        if info.ended != state.last_ended {
            state.last_ended = info.ended;
            if let Some(track) = app.play_next() {
                load_track(player, &track, true);
            }
        }

        if app.uploading {
            if let Ok(p) = progress.lock() {
                app.upload_progress = *p;
            }
        }

        update_mpris(mpris, app, &info);

        terminal.draw(|f| ui::draw(f, app, &info, &settings.ui))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app, player, &info) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, dispatcher, player, control_tx) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn load_track(player: &Player, track: &Track, autoplay: bool) {
    if let Some(url) = &track.url {
        let _ = player.send(PlayerCmd::Load {
            url: url.clone(),
            autoplay,
        });
    }
}

/// Start the queue's current item from a stopped state.
fn start_current(app: &App, player: &Player) {
    if let Some(queue) = &app.queue {
        load_track(player, queue.current_track(), true);
    }
}

fn handle_api_event(event: ApiEvent, app: &mut App, dispatcher: &Dispatcher, player: &Player) {
    match event {
        ApiEvent::Tracks(Ok(tracks)) => {
            app.set_tracks(tracks);
            let targets = app.probe_targets();
            if !targets.is_empty() {
                dispatcher.dispatch(ApiRequest::ProbeDurations(targets));
            }
        }
        ApiEvent::Tracks(Err(e)) => {
            log::warn!("track fetch failed: {e}");
            app.set_error("Failed to fetch tracks");
        }
        ApiEvent::TopTracks(Ok(tracks)) => app.top_tracks = tracks,
        ApiEvent::TopTracks(Err(e)) => log::debug!("top tracks fetch failed: {e}"),
        ApiEvent::Suggestions { seq, matches } => {
            app.upload.accept_suggestions(seq, matches);
        }
        ApiEvent::UploadDone(Ok(track)) => {
            log::info!("uploaded {}", track.title);
            app.settle_upload();
            app.upload.reset();
            dispatcher.dispatch(ApiRequest::FetchTracks);
        }
        ApiEvent::UploadDone(Err(e)) => {
            log::warn!("upload failed: {e}");
            app.settle_upload();
            app.set_error("Upload failed");
        }
        ApiEvent::MixDone(Ok(playlist)) => {
            app.generating = false;
            app.apply_mix(playlist);
            start_current(app, player);
            dispatcher.dispatch(ApiRequest::FetchTopTracks);
        }
        ApiEvent::MixDone(Err(e)) => {
            log::warn!("mix generation failed: {e}");
            app.generating = false;
            app.set_error("Failed to generate mix");
        }
        ApiEvent::DeleteDone { id, result: Ok(()) } => {
            app.forget_track(id);
            dispatcher.dispatch(ApiRequest::FetchTracks);
            dispatcher.dispatch(ApiRequest::FetchTopTracks);
        }
        ApiEvent::DeleteDone { result: Err(e), .. } => {
            log::warn!("delete failed: {e}");
            app.set_error("Failed to delete");
        }
        ApiEvent::DurationProbed { id, duration } => app.set_duration(id, duration),
    }
}

/// Handle a command arriving over D-Bus. Returns `true` on quit.
fn handle_control_cmd(cmd: ControlCmd, app: &mut App, player: &Player, info: &PlayerInfo) -> bool {
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => {
            if info.url.is_some() {
                if !info.playing {
                    let _ = player.send(PlayerCmd::TogglePause);
                }
            } else {
                start_current(app, player);
            }
        }
        ControlCmd::Pause => {
            if info.url.is_some() && info.playing {
                let _ = player.send(PlayerCmd::TogglePause);
            }
        }
        ControlCmd::PlayPause => {
            if info.url.is_some() {
                let _ = player.send(PlayerCmd::TogglePause);
            } else {
                start_current(app, player);
            }
        }
        ControlCmd::Stop => {
            let _ = player.send(PlayerCmd::Stop);
        }
        ControlCmd::Next => {
            if let Some(track) = app.play_next() {
                load_track(player, &track, true);
            }
        }
        ControlCmd::Prev => {
            if let Some(track) = app.play_prev() {
                load_track(player, &track, true);
            }
        }
    }

    false
}

/// Handle a keyboard event. Returns `true` on quit.
fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    dispatcher: &Dispatcher,
    player: &Player,
    control_tx: &mpsc::Sender<ControlCmd>,
) -> bool {
    if app.modal.is_some() {
        handle_modal_key(key, app, dispatcher, player);
        return false;
    }

    match app.pane {
        Pane::Upload => {
            handle_upload_key(key, app, dispatcher);
            return false;
        }
        Pane::Prompt => {
            handle_prompt_key(key, app, dispatcher);
            return false;
        }
        Pane::Catalog | Pane::Queue => {}
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => app.pane = app.pane.next(),
        KeyCode::BackTab => app.pane = app.pane.prev(),
        KeyCode::Char('j') => match app.pane {
            Pane::Queue => app.queue_down(),
            _ => app.catalog_down(),
        },
        KeyCode::Char('k') => match app.pane {
            Pane::Queue => app.queue_up(),
            _ => app.catalog_up(),
        },
        KeyCode::Enter => match app.pane {
            Pane::Queue => {
                if let Some(track) = app.play_at(app.queue_cursor) {
                    load_track(player, &track, true);
                }
            }
            _ => {
                if let Some(track) = app.tracks.get(app.catalog_cursor).cloned() {
                    app.play_direct(&track);
                    load_track(player, &track, true);
                    app.modal = Some(Modal::TrackDetail(track));
                }
            }
        },
        KeyCode::Char(' ') => {
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('l') => {
            let _ = control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('h') => {
            let _ = control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('s') => app.toggle_shuffle(),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let v = app.adjust_volume(0.05);
            let _ = player.send(PlayerCmd::SetVolume(v));
        }
        KeyCode::Char('-') => {
            let v = app.adjust_volume(-0.05);
            let _ = player.send(PlayerCmd::SetVolume(v));
        }
        KeyCode::Char('f') => {
            let track = match app.pane {
                Pane::Queue => app
                    .queue
                    .as_ref()
                    .and_then(|q| q.items().get(app.queue_cursor))
                    .map(|item| item.track.clone()),
                _ => app.tracks.get(app.catalog_cursor).cloned(),
            };
            if let Some(track) = track {
                app.toggle_favorite(&track);
            }
        }
        KeyCode::Char('d') => {
            if app.pane == Pane::Catalog {
                if let Some(track) = app.tracks.get(app.catalog_cursor).cloned() {
                    app.modal = Some(Modal::ConfirmDelete(track));
                }
            }
        }
        KeyCode::Char('T') => {
            app.modal = Some(Modal::TopTracks);
            app.modal_cursor = 0;
        }
        KeyCode::Char('F') => {
            app.modal = Some(Modal::Favorites);
            app.modal_cursor = 0;
        }
        KeyCode::Char('m') => app.toggle_light_mode(),
        KeyCode::Char('u') => app.pane = Pane::Upload,
        KeyCode::Char('g') => app.pane = Pane::Prompt,
        KeyCode::Esc => app.clear_error(),
        _ => {}
    }

    false
}

fn handle_upload_key(key: KeyEvent, app: &mut App, dispatcher: &Dispatcher) {
    let debounce = app.suggest_debounce;
    match key.code {
        KeyCode::Tab => {
            app.upload.hide_suggestions();
            app.pane = app.pane.next();
        }
        KeyCode::BackTab => {
            app.upload.hide_suggestions();
            app.pane = app.pane.prev();
        }
        KeyCode::Esc => {
            if app.upload.suggestions.is_empty() {
                app.pane = Pane::Catalog;
            } else {
                app.upload.hide_suggestions();
            }
        }
        KeyCode::Down => {
            if app.upload.field == UploadField::Tags && !app.upload.suggestions.is_empty() {
                app.upload.highlight_next();
            } else {
                app.upload.field = app.upload.field.next();
            }
        }
        KeyCode::Up => {
            if app.upload.field == UploadField::Tags && !app.upload.suggestions.is_empty() {
                app.upload.highlight_prev();
            } else {
                app.upload.field = app.upload.field.prev();
            }
        }
        KeyCode::Enter => {
            // A highlighted suggestion wins over form submission.
            if app.upload.pick_highlighted() {
                return;
            }
            if app.uploading {
                return;
            }
            if let Some(request) = app.upload.to_request() {
                app.uploading = true;
                app.clear_error();
                dispatcher.dispatch(ApiRequest::Upload(request));
            }
        }
        KeyCode::Backspace => {
            app.upload.focused_value_mut().pop();
            if app.upload.field == UploadField::Tags {
                app.upload.note_tags_edited(Instant::now(), debounce);
            }
        }
        KeyCode::Char(c) if !c.is_control() => {
            app.upload.focused_value_mut().push(c);
            if app.upload.field == UploadField::Tags {
                app.upload.note_tags_edited(Instant::now(), debounce);
            }
        }
        _ => {}
    }
}

fn handle_prompt_key(key: KeyEvent, app: &mut App, dispatcher: &Dispatcher) {
    match key.code {
        KeyCode::Tab => app.pane = app.pane.next(),
        KeyCode::BackTab => app.pane = app.pane.prev(),
        KeyCode::Esc => app.pane = Pane::Catalog,
        KeyCode::Enter => {
            let prompt = app.prompt.trim().to_string();
            if prompt.is_empty() || app.generating {
                return;
            }
            app.generating = true;
            app.clear_error();
            dispatcher.dispatch(ApiRequest::GenerateMix(prompt));
        }
        KeyCode::Backspace => {
            app.prompt.pop();
        }
        KeyCode::Char(c) if !c.is_control() => app.prompt.push(c),
        _ => {}
    }
}

fn handle_modal_key(key: KeyEvent, app: &mut App, dispatcher: &Dispatcher, player: &Player) {
    let Some(modal) = app.modal.clone() else {
        return;
    };

    match modal {
        Modal::ConfirmDelete(track) => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                dispatcher.dispatch(ApiRequest::DeleteTrack(track.id));
                app.modal = None;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.modal = None,
            _ => {}
        },
        Modal::TrackDetail(track) => match key.code {
            KeyCode::Esc | KeyCode::Enter => app.modal = None,
            KeyCode::Char('f') => app.toggle_favorite(&track),
            _ => {}
        },
        Modal::TopTracks => match key.code {
            KeyCode::Char('j') => {
                if !app.top_tracks.is_empty() {
                    app.modal_cursor = (app.modal_cursor + 1).min(app.top_tracks.len() - 1);
                }
            }
            KeyCode::Char('k') => app.modal_cursor = app.modal_cursor.saturating_sub(1),
            KeyCode::Enter => {
                if let Some(track) = app.top_tracks.get(app.modal_cursor).cloned() {
                    app.play_direct(&track);
                    load_track(player, &track, true);
                }
            }
            KeyCode::Char('f') => {
                if let Some(track) = app.top_tracks.get(app.modal_cursor).cloned() {
                    app.toggle_favorite(&track);
                }
            }
            KeyCode::Esc => app.modal = None,
            _ => {}
        },
        Modal::Favorites => match key.code {
            KeyCode::Char('j') => {
                if !app.favorites.is_empty() {
                    app.modal_cursor = (app.modal_cursor + 1).min(app.favorites.len() - 1);
                }
            }
            KeyCode::Char('k') => app.modal_cursor = app.modal_cursor.saturating_sub(1),
            KeyCode::Enter => {
                if let Some(track) = app.favorites.get(app.modal_cursor).cloned() {
                    app.play_direct(&track);
                    load_track(player, &track, true);
                }
            }
            KeyCode::Char('f') => {
                if let Some(track) = app.favorites.get(app.modal_cursor).cloned() {
                    app.toggle_favorite(&track);
                    if app.modal_cursor >= app.favorites.len() {
                        app.modal_cursor = app.favorites.len().saturating_sub(1);
                    }
                }
            }
            KeyCode::Esc => app.modal = None,
            _ => {}
        },
    }
}
