//! Background execution of backend calls.
//!
//! The event loop must never block on the network, so every call runs on a
//! short-lived worker thread that reports back over a channel. Duration
//! probes run sequentially on one worker so the media server is not
//! hammered with parallel downloads.

use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::api::{ApiClient, ApiError, Playlist, ProgressHandle, Track, UploadRequest};
use crate::player;

/// Requests the event loop can dispatch.
#[derive(Debug)]
pub enum ApiRequest {
    FetchTracks,
    FetchTopTracks,
    SuggestTags { seq: u64, fragment: String },
    Upload(UploadRequest),
    GenerateMix(String),
    DeleteTrack(u64),
    ProbeDurations(Vec<Track>),
}

/// Results flowing back to the event loop.
#[derive(Debug)]
pub enum ApiEvent {
    Tracks(Result<Vec<Track>, ApiError>),
    TopTracks(Result<Vec<Track>, ApiError>),
    Suggestions { seq: u64, matches: Vec<String> },
    UploadDone(Result<Track, ApiError>),
    MixDone(Result<Playlist, ApiError>),
    DeleteDone { id: u64, result: Result<(), ApiError> },
    DurationProbed { id: u64, duration: Duration },
}

/// Hands backend work to worker threads and funnels results back.
pub struct Dispatcher {
    client: ApiClient,
    events: Sender<ApiEvent>,
    progress: ProgressHandle,
}

impl Dispatcher {
    pub fn new(client: ApiClient, events: Sender<ApiEvent>) -> Self {
        Self {
            client,
            events,
            progress: ProgressHandle::default(),
        }
    }

    /// Shared upload progress, read by the UI every frame.
    pub fn upload_progress(&self) -> ProgressHandle {
        self.progress.clone()
    }

    pub fn dispatch(&self, request: ApiRequest) {
        let client = self.client.clone();
        let events = self.events.clone();
        let progress = self.progress.clone();
        thread::spawn(move || {
            let event = match request {
                ApiRequest::FetchTracks => ApiEvent::Tracks(client.list_tracks()),
                ApiRequest::FetchTopTracks => ApiEvent::TopTracks(client.top_tracks()),
                ApiRequest::SuggestTags { seq, fragment } => {
                    // suggestions are best effort; failures read as "none"
                    let matches = client.search_tags(&fragment).unwrap_or_else(|err| {
                        log::debug!("tag lookup failed: {err}");
                        Vec::new()
                    });
                    ApiEvent::Suggestions { seq, matches }
                }
                ApiRequest::Upload(upload) => {
                    let result = client.upload_track(&upload, &progress);
                    // leave no stale percentage behind for the next upload
                    if let Ok(mut p) = progress.lock() {
                        *p = 0;
                    }
                    ApiEvent::UploadDone(result)
                }
                ApiRequest::GenerateMix(prompt) => ApiEvent::MixDone(client.generate_mix(&prompt)),
                ApiRequest::DeleteTrack(id) => ApiEvent::DeleteDone {
                    id,
                    result: client.delete_track(id),
                },
                ApiRequest::ProbeDurations(tracks) => {
                    for track in tracks {
                        let Some(url) = track.url.as_deref() else {
                            continue;
                        };
                        if let Some(duration) = player::probe_duration(client.media_http(), url) {
                            let _ = events.send(ApiEvent::DurationProbed {
                                id: track.id,
                                duration,
                            });
                        }
                    }
                    return;
                }
            };
            let _ = events.send(event);
        });
    }
}
