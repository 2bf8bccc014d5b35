//! Streaming playback worker.
//!
//! A dedicated thread owns the audio output; the UI talks to it through
//! `PlayerCmd` messages and reads back a shared `PlayerInfo` snapshot.
//! `probe` holds the metadata probing used for catalog durations.

mod handle;
mod probe;
mod thread;
mod types;

pub use handle::*;
pub use probe::*;
pub use types::*;
