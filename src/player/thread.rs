use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{Decoder, OutputStreamBuilder, Sink, Source};

use super::types::{PlayerCmd, PlayerHandle, supersedes_load};

pub(super) fn spawn_player_thread(rx: Receiver<PlayerCmd>, info: PlayerHandle) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream =
            OutputStreamBuilder::open_default_stream().expect("ERR: No audio output device");
        // rodio logs to stderr when OutputStream is dropped. That's useful in
        // debugging, but noisy for a TUI app.
        let mut stream = stream;
        stream.log_on_drop(false);

        // Media is fetched whole before decoding. No read timeout: large
        // files on slow links are expected.
        let http = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .expect("ERR: No HTTP client");

        let mut sink: Option<Sink> = None;
        let mut paused = true;
        // Latches the empty-sink observation so one finished track bumps
        // the ended counter exactly once.
        let mut finished = false;
        let mut volume: f32 = 1.0;
        let mut pending: VecDeque<PlayerCmd> = VecDeque::new();

        // Spawn a ticker thread to update info.elapsed periodically.
        let info_for_ticker = info.clone();
        thread::spawn(move || loop {
            thread::sleep(Duration::from_millis(500));
            let mut info = info_for_ticker.lock().unwrap();
            if info.playing {
                info.elapsed = info.elapsed + Duration::from_millis(500);
            }
        });

        fn do_load(
            bytes: Vec<u8>,
            url: &str,
            autoplay: bool,
            volume: f32,
            stream: &rodio::OutputStream,
            sink: &mut Option<Sink>,
            paused: &mut bool,
            finished: &mut bool,
            info: &PlayerHandle,
        ) {
            let source = match Decoder::new(Cursor::new(bytes)) {
                Ok(s) => s,
                Err(err) => {
                    log::warn!("cannot decode {url}: {err}");
                    return;
                }
            };
            let duration = source.total_duration();

            // Old sink goes away in the same transition that installs the
            // new one; there is no window where both play.
            if let Some(old) = sink.as_ref() {
                old.stop();
            }
            let new_sink = Sink::connect_new(stream.mixer());
            new_sink.set_volume(volume);
            new_sink.append(source);
            if autoplay {
                new_sink.play();
            } else {
                new_sink.pause();
            }

            *sink = Some(new_sink);
            *paused = !autoplay;
            *finished = false;

            if let Ok(mut i) = info.lock() {
                i.url = Some(url.to_string());
                i.elapsed = Duration::ZERO;
                i.duration = duration;
                i.playing = autoplay;
            }
        }

        fn do_stop(
            sink: &mut Option<Sink>,
            paused: &mut bool,
            finished: &mut bool,
            info: &PlayerHandle,
        ) {
            if let Some(s) = sink.take() {
                s.stop();
            }
            *paused = true;
            *finished = false;
            if let Ok(mut i) = info.lock() {
                i.url = None;
                i.elapsed = Duration::ZERO;
                i.duration = None;
                i.playing = false;
            }
        }

        'main: loop {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(cmd) => pending.push_back(cmd),
                Err(RecvTimeoutError::Timeout) => {
                    // periodic check for natural end of track
                    if let Some(ref s) = sink {
                        if !paused && !finished && s.empty() {
                            finished = true;
                            if let Ok(mut i) = info.lock() {
                                i.playing = false;
                                i.ended += 1;
                            }
                        }
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }

            while let Some(cmd) = pending.pop_front() {
                match cmd {
                    PlayerCmd::Load { url, autoplay } => {
                        let bytes = match fetch_media(&http, &url) {
                            Ok(b) => b,
                            Err(err) => {
                                log::warn!("cannot fetch {url}: {err}");
                                continue;
                            }
                        };
                        // Commands queued up during the download may have
                        // made this load stale; look before swapping.
                        while let Ok(queued) = rx.try_recv() {
                            pending.push_back(queued);
                        }
                        if pending.iter().any(supersedes_load) {
                            log::debug!("discarding superseded load of {url}");
                            continue;
                        }
                        do_load(
                            bytes,
                            &url,
                            autoplay,
                            volume,
                            &stream,
                            &mut sink,
                            &mut paused,
                            &mut finished,
                            &info,
                        );
                    }

                    PlayerCmd::TogglePause => {
                        if let Some(ref s) = sink {
                            if paused {
                                s.play();
                                if let Ok(mut i) = info.lock() {
                                    i.playing = true;
                                }
                            } else {
                                s.pause();
                                if let Ok(mut i) = info.lock() {
                                    i.playing = false;
                                }
                            }
                            paused = !paused;
                        }
                    }

                    PlayerCmd::Stop => {
                        do_stop(&mut sink, &mut paused, &mut finished, &info);
                    }

                    PlayerCmd::SetVolume(v) => {
                        volume = v.clamp(0.0, 1.0);
                        if let Some(ref s) = sink {
                            s.set_volume(volume);
                        }
                    }

                    PlayerCmd::Quit => {
                        if let Some(ref s) = sink {
                            s.stop();
                        }
                        // Update shared state so UI/MPRIS don't keep showing
                        // Playing.
                        if let Ok(mut i) = info.lock() {
                            i.playing = false;
                        }
                        break 'main;
                    }
                }
            }
        }
    })
}

fn fetch_media(http: &reqwest::blocking::Client, url: &str) -> reqwest::Result<Vec<u8>> {
    let resp = http.get(url).send()?.error_for_status()?;
    Ok(resp.bytes()?.to_vec())
}
