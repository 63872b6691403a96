//! Small helpers shared across CLI tests.

use std::num::{NonZeroU32, NonZeroUsize};
use std::path::Path;

use tempfile::TempDir;

use super::{CliError, CommandSummary, GenerateCommand, GenerateSummary, InspectSummary};

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

/// A quiet, small `generate` command writing into `store`.
pub(super) fn small_generate(store: &Path) -> GenerateCommand {
    GenerateCommand {
        degrees: Some(vec![1.0, 4.0, 20.0]),
        counts: Some(vec![200, 50, 8]),
        seed: 8989,
        store: store.to_path_buf(),
        channel_capacity: 8,
        batch_size: NonZeroUsize::new(16).expect("non-zero"),
        max_attempts: NonZeroU32::new(2).expect("non-zero"),
        quiet: true,
    }
}

pub(super) fn expect_generate(result: Result<CommandSummary, CliError>) -> GenerateSummary {
    match result {
        Ok(CommandSummary::Generate(summary)) => summary,
        Ok(other) => panic!("expected a generate summary, got {other:?}"),
        Err(err) => panic!("generate failed: {err}"),
    }
}

pub(super) fn expect_inspect(result: Result<CommandSummary, CliError>) -> InspectSummary {
    match result {
        Ok(CommandSummary::Inspect(summary)) => summary,
        Ok(other) => panic!("expected an inspect summary, got {other:?}"),
        Err(err) => panic!("inspect failed: {err}"),
    }
}
