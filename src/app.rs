//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the catalog, the active
//! queue, the upload form and everything else the UI renders. `app::queue`
//! and `app::upload` carry the two stateful sub-machines.

mod model;
mod queue;
mod upload;

pub use model::*;
pub use queue::*;
pub use upload::*;

#[cfg(test)]
mod tests;
