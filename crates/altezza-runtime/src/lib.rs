#![forbid(unsafe_code)]

//! Altezza Runtime
//!
//! Ties the coordination core to a terminal: a [`Model`] trait, [`Cmd`]
//! side effects, a cell [`Frame`] with a diffing [`Presenter`], the real
//! [`Program`] loop, and a virtual-time [`ProgramSimulator`] for tests.
//!
//! # Role
//! The runtime owns the clock. Models never read it; they are handed the
//! instant of every update and draw, and report their next timer deadline
//! so the runtime knows when to wake them.

pub mod cell;
pub mod error;
pub mod frame;
pub mod presenter;
pub mod program;
pub mod simulator;

pub use cell::{Cell, Rgb, Style, StyleFlags};
pub use error::{Result, RuntimeError};
pub use frame::Frame;
pub use presenter::Presenter;
pub use program::{Cmd, Model, Program, ProgramConfig};
pub use simulator::{CmdRecord, ProgramSimulator};
