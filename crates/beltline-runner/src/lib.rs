//! Real-time driver for the beltline simulation.
//!
//! The core crate is a pure tick function; this crate gives it a wall clock,
//! a save file and a command line:
//!
//! - [`config::RunnerConfig`] from TOML
//! - [`layout::Layout`] starting placements from RON
//! - [`persistence::SaveStore`] with atomic replace-on-write
//! - [`scheduler::Scheduler`] with start, pause, speed and reset

pub mod config;
pub mod error;
pub mod layout;
pub mod persistence;
pub mod report;
pub mod scheduler;

pub use error::RunnerError;
pub use scheduler::Scheduler;
