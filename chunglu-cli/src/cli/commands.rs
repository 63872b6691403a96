//! Command implementations and argument parsing for the chunglu CLI.

use std::io::{self, Write};
use std::num::{NonZeroU32, NonZeroUsize};
use std::path::PathBuf;

pub use chunglu_core::{REFERENCE_COUNTS, REFERENCE_DEGREES};

use chunglu_core::{ChungLu, ChungLuBuilder, Edge, GeneratorError, RetryPolicy, RunReport};
use chunglu_sinks_sqlite::{SqliteEdgeStore, SqliteSinkError};
use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

use crate::progress::PairProgress;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "chunglu", about = "Generate Chung–Lu random graphs by edge skipping.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate a graph into an edge store.
    Generate(GenerateCommand),
    /// Print the record count and leading edges of an edge store.
    Inspect(InspectCommand),
}

/// Options accepted by the `generate` command.
#[derive(Debug, Args, Clone)]
pub struct GenerateCommand {
    /// Expected degree of every class, comma separated.
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub degrees: Option<Vec<f64>>,

    /// Vertex count of every class, comma separated.
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub counts: Option<Vec<u64>>,

    /// Seed of the random stream.
    #[arg(long, env = "CHUNGLU_SEED", default_value_t = ChungLuBuilder::DEFAULT_SEED)]
    pub seed: u64,

    /// SQLite store file, or a directory to hold `edges.sqlite3`.
    #[arg(long, env = "CHUNGLU_STORE", default_value = "edges.sqlite3")]
    pub store: PathBuf,

    /// Edges buffered between generation and storage; 0 hands off each edge directly.
    #[arg(long, default_value_t = ChungLuBuilder::DEFAULT_CHANNEL_CAPACITY)]
    pub channel_capacity: usize,

    /// Records committed per storage transaction.
    #[arg(long, default_value_t = SqliteEdgeStore::DEFAULT_BATCH_SIZE)]
    pub batch_size: NonZeroUsize,

    /// Attempts per storage operation before a transient failure aborts the run.
    #[arg(long, default_value_t = RetryPolicy::default().max_attempts())]
    pub max_attempts: NonZeroU32,

    /// Suppress the progress bar.
    #[arg(long, short)]
    pub quiet: bool,
}

/// Options accepted by the `inspect` command.
#[derive(Debug, Args, Clone)]
pub struct InspectCommand {
    /// SQLite store file, or a directory holding `edges.sqlite3`.
    pub store: PathBuf,

    /// Number of leading edges to print.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Generation failed or was misconfigured.
    #[error(transparent)]
    Core(#[from] GeneratorError),
    /// The edge store could not be opened or read.
    #[error(transparent)]
    Store(#[from] SqliteSinkError),
}

/// Outcome of a `generate` run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateSummary {
    /// Where the edges were written.
    pub store: String,
    /// Number of degree classes.
    pub classes: usize,
    /// Number of vertices across all classes.
    pub vertices: u64,
    /// Mean edge count of the configured model.
    pub expected_edges: f64,
    /// Totals reported by the run.
    pub report: RunReport,
}

/// Outcome of an `inspect` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectSummary {
    /// Store that was read.
    pub store: String,
    /// Committed records in the store.
    pub records: u64,
    /// Leading edges in insertion order.
    pub edges: Vec<Edge>,
}

/// Summary of whichever command ran.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandSummary {
    /// `generate` finished.
    Generate(GenerateSummary),
    /// `inspect` finished.
    Inspect(InspectSummary),
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when configuration, generation, or storage fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use std::num::{NonZeroU32, NonZeroUsize};
/// # use chunglu_cli::cli::{Cli, Command, CommandSummary, GenerateCommand, run_cli};
/// # use tempfile::TempDir;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = TempDir::new()?;
/// let cli = Cli {
///     command: Command::Generate(GenerateCommand {
///         degrees: Some(vec![2.0, 6.0]),
///         counts: Some(vec![40, 10]),
///         seed: 8989,
///         store: dir.path().to_path_buf(),
///         channel_capacity: 16,
///         batch_size: NonZeroUsize::new(32).expect("non-zero"),
///         max_attempts: NonZeroU32::new(3).expect("non-zero"),
///         quiet: true,
///     }),
/// };
/// let CommandSummary::Generate(summary) = run_cli(cli)? else {
///     unreachable!("generate yields a generate summary");
/// };
/// assert_eq!(summary.report.stats.pairs_processed, 4);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<CommandSummary, CliError> {
    match cli.command {
        Command::Generate(command) => {
            Span::current().record("command", field::display("generate"));
            run_generate(command).map(CommandSummary::Generate)
        }
        Command::Inspect(command) => {
            Span::current().record("command", field::display("inspect"));
            run_inspect(command).map(CommandSummary::Inspect)
        }
    }
}

pub(super) fn build_chunglu(command: &GenerateCommand) -> Result<ChungLu, CliError> {
    let degrees = command
        .degrees
        .clone()
        .unwrap_or_else(|| REFERENCE_DEGREES.to_vec());
    let counts = command
        .counts
        .clone()
        .unwrap_or_else(|| REFERENCE_COUNTS.to_vec());
    let retry = RetryPolicy::new(command.max_attempts);
    Ok(ChungLuBuilder::new()
        .with_class_sizes(counts)
        .with_degrees(degrees)
        .with_seed(command.seed)
        .with_channel_capacity(command.channel_capacity)
        .with_retry_policy(retry)
        .build()?)
}

#[instrument(
    name = "cli.generate",
    err,
    skip(command),
    fields(store = field::Empty, seed = command.seed, classes = field::Empty),
)]
pub(super) fn run_generate(command: GenerateCommand) -> Result<GenerateSummary, CliError> {
    let chunglu = build_chunglu(&command)?;
    let model = chunglu.model();
    let store = SqliteEdgeStore::open(&command.store)?.with_batch_size(command.batch_size);
    let location = store.location().to_owned();

    let span = Span::current();
    span.record("store", field::display(&location));
    span.record("classes", model.class_count());

    let total_pairs = chunglu.generator().counter().total();
    let report = match PairProgress::new(total_pairs, command.quiet) {
        Some(progress) => chunglu.run_with_observer(store, progress)?,
        None => chunglu.run(store)?,
    };

    info!(
        store = %location,
        persisted = report.persisted,
        discarded = report.stats.self_pairs_discarded,
        "generate completed"
    );
    Ok(GenerateSummary {
        store: location,
        classes: model.class_count(),
        vertices: model.vertex_count(),
        expected_edges: model.expected_edge_count(),
        report,
    })
}

#[instrument(name = "cli.inspect", err, skip(command), fields(limit = command.limit))]
pub(super) fn run_inspect(command: InspectCommand) -> Result<InspectSummary, CliError> {
    let store = SqliteEdgeStore::open(&command.store)?;
    let summary = InspectSummary {
        store: store.location().to_owned(),
        records: store.count()?,
        edges: store.edges_limited(command.limit)?,
    };
    info!(store = %summary.store, records = summary.records, "inspect completed");
    Ok(summary)
}

/// Renders `summary` to `writer` as plain text.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use chunglu_cli::cli::{CommandSummary, InspectSummary, render_summary};
/// # use chunglu_core::Edge;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = CommandSummary::Inspect(InspectSummary {
///     store: "edges.sqlite3".into(),
///     records: 2,
///     edges: vec![Edge::new(2, 1)],
/// });
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert_eq!(
///     String::from_utf8(buffer)?,
///     "store: edges.sqlite3\nrecords: 2\n2\t1\n"
/// );
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &CommandSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        CommandSummary::Generate(generate) => {
            let stats = &generate.report.stats;
            writeln!(writer, "store: {}", generate.store)?;
            writeln!(writer, "classes: {}", generate.classes)?;
            writeln!(writer, "vertices: {}", generate.vertices)?;
            writeln!(writer, "expected edges: {:.1}", generate.expected_edges)?;
            writeln!(writer, "pairs processed: {}", stats.pairs_processed)?;
            writeln!(writer, "edges emitted: {}", stats.edges_emitted)?;
            writeln!(writer, "edges persisted: {}", generate.report.persisted)?;
            writeln!(writer, "self pairs discarded: {}", stats.self_pairs_discarded)?;
        }
        CommandSummary::Inspect(inspect) => {
            writeln!(writer, "store: {}", inspect.store)?;
            writeln!(writer, "records: {}", inspect.records)?;
            for edge in &inspect.edges {
                writeln!(writer, "{}\t{}", edge.from(), edge.to())?;
            }
        }
    }
    Ok(())
}
