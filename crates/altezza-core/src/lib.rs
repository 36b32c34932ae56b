#![forbid(unsafe_code)]

//! Core: the timer-coordinated state machines behind the splash screen.
//!
//! Every component here is deterministic and single-threaded. Time only moves
//! when a caller passes a later `now`, so the whole crate can be driven by a
//! virtual clock in tests.

pub mod assistant;
pub mod audio;
pub mod background;
pub mod event;
pub mod geometry;
pub mod logging;
pub mod press_hold;
pub mod sequencer;
#[cfg(not(target_arch = "wasm32"))]
pub mod terminal_session;
pub mod timer;
pub mod vibrant;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, info, info_span, trace, warn};
