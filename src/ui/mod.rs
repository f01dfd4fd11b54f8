//! Progress display for long-running waits
//!
//! Spinners on interactive terminals, plain lines in CI and when embedded.

mod context;
mod progress;

pub use context::UiContext;
pub use progress::TaskSpinner;
