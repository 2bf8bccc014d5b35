use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::api::ApiClient;
use crate::app::App;
use crate::mpris::ControlCmd;
use crate::net::{ApiEvent, Dispatcher};
use crate::player::Player;
use crate::storage::{FileStore, default_data_path};

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();

    let data_dir = settings
        .storage
        .dir
        .clone()
        .or_else(default_data_path)
        .unwrap_or_else(|| PathBuf::from(".vibo"));
    let store = FileStore::new(data_dir.clone())?;
    init_logging(&data_dir);

    let mut app = App::new(Box::new(store));
    app.shuffle = settings.playback.shuffle;
    app.volume = settings.playback.volume;
    app.suggest_debounce = Duration::from_millis(settings.ui.suggest_debounce_ms);

    let client = ApiClient::new(
        &settings.server.base_url,
        Duration::from_secs(settings.server.timeout_secs),
        Duration::from_secs(settings.server.upload_timeout_secs),
    )?;
    let (net_tx, net_rx) = mpsc::channel::<ApiEvent>();
    let dispatcher = Dispatcher::new(client, net_tx);

    let player = Player::new(app.volume);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx.clone());

    startup::restore_session(&app, &dispatcher, &player);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();

        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &dispatcher,
            &player,
            &mpris,
            &control_tx,
            &control_rx,
            &net_rx,
            &mut state,
        )
    })();

    player.quit();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

/// The terminal is owned by the TUI, so logs go to a file in the data
/// directory instead of stderr.
fn init_logging(dir: &Path) {
    let Ok(file) = std::fs::File::create(dir.join("vibo.log")) else {
        return;
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}
