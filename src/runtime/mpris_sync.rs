use crate::app::App;
use crate::mpris::{MprisHandle, PlaybackState};
use crate::player::PlayerInfo;

pub fn update_mpris(mpris: &MprisHandle, app: &App, player: &PlayerInfo) {
    let playback = if player.url.is_none() {
        PlaybackState::Stopped
    } else if player.playing {
        PlaybackState::Playing
    } else {
        PlaybackState::Paused
    };

    let track = app.current_track.as_ref();
    let length = player
        .duration
        .or_else(|| track.and_then(|t| app.duration_for(t)));

    mpris.set_track_metadata(track, length);
    mpris.set_playback(playback, app.has_queue());
}
