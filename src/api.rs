//! Backend REST client and wire types.
//!
//! `models` mirrors the server's serializers; `client` performs the blocking
//! HTTP calls that `net` runs on worker threads.

mod client;
mod models;

pub use client::*;
pub use models::*;

#[cfg(test)]
mod tests;
