//! Support library for the chunglu CLI binary.
//!
//! Exposes the command pipeline so doctests and tests can drive it without
//! forking a subprocess.

pub mod cli;
pub mod logging;
pub mod progress;
