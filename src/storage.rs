//! Local persistence for session state.
//!
//! `store` defines the key/value backends, `session` the typed accessors
//! for the handful of keys the app actually keeps.

mod session;
mod store;

pub use session::*;
pub use store::*;

#[cfg(test)]
mod tests;
