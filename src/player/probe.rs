//! Best-effort duration probing for catalog tracks.
//!
//! The backend does not always know a track's length, so the client fetches
//! the media and reads the duration out of the container metadata itself.

use std::io::Cursor;
use std::time::Duration;

use lofty::prelude::*;
use lofty::probe::Probe;

/// Download `url` and read its duration from the container metadata.
///
/// Every failure mode simply yields `None`; probing never surfaces errors.
pub fn probe_duration(http: &reqwest::blocking::Client, url: &str) -> Option<Duration> {
    let resp = http.get(url).send().ok()?.error_for_status().ok()?;
    let bytes = resp.bytes().ok()?;
    duration_from_bytes(&bytes)
}

pub(super) fn duration_from_bytes(bytes: &[u8]) -> Option<Duration> {
    let tagged = Probe::new(Cursor::new(bytes))
        .guess_file_type()
        .ok()?
        .read()
        .ok()?;
    Some(tagged.properties().duration())
}
