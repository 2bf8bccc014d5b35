use crate::app::App;
use crate::net::{ApiRequest, Dispatcher};
use crate::player::{Player, PlayerCmd};

/// Kick off the initial backend fetches and prime the media thread with the
/// restored queue position. The restored track is fetched paused; playback
/// never starts on its own after a restart.
pub fn restore_session(app: &App, dispatcher: &Dispatcher, player: &Player) {
    dispatcher.dispatch(ApiRequest::FetchTracks);
    dispatcher.dispatch(ApiRequest::FetchTopTracks);

    if let Some(queue) = &app.queue {
        if let Some(url) = &queue.current_track().url {
            let _ = player.send(PlayerCmd::Load {
                url: url.clone(),
                autoplay: false,
            });
        }
    }
}
