//! Command-line interface for generating and inspecting Chung–Lu graphs.
//!
//! `generate` streams a graph into a SQLite edge store; `inspect` reads a
//! store back.

mod commands;

pub use commands::{
    Cli, CliError, Command, CommandSummary, GenerateCommand, GenerateSummary, InspectCommand,
    InspectSummary, REFERENCE_COUNTS, REFERENCE_DEGREES, render_summary, run_cli,
};

#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod tests;
