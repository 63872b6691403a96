//! Unit tests for CLI parsing, execution, and rendering.

use super::commands::build_chunglu;
use super::test_helpers::{expect_generate, expect_inspect, small_generate, temp_dir};
use super::{
    Cli, CliError, Command, CommandSummary, GenerateSummary, InspectCommand, REFERENCE_COUNTS,
    REFERENCE_DEGREES, render_summary, run_cli,
};

use chunglu_core::{ConfigErrorCode, Edge, GenerationStats, GeneratorErrorCode, RunReport};
use chunglu_sinks_sqlite::{DEFAULT_STORE_FILE_NAME, SqliteEdgeStore};
use chunglu_test_support::tracing::RecordingLayer;
use clap::Parser;
use rstest::rstest;
use tracing_subscriber::layer::SubscriberExt;

#[test]
fn generate_defaults_to_the_reference_table() {
    let cli = Cli::try_parse_from(["chunglu", "generate", "--store", "graph.sqlite3"])
        .expect("arguments must parse");
    let Command::Generate(command) = cli.command else {
        panic!("expected generate");
    };
    assert_eq!(command.degrees, None);
    assert_eq!(command.counts, None);
    assert_eq!(command.channel_capacity, 1024);
    assert_eq!(command.batch_size.get(), 1024);
    assert_eq!(command.max_attempts.get(), 5);
    assert!(!command.quiet);

    let chunglu = build_chunglu(&command).expect("reference table is valid");
    let model = chunglu.model();
    assert_eq!(model.sizes(), REFERENCE_COUNTS.as_slice());
    assert_eq!(model.degrees(), REFERENCE_DEGREES.as_slice());
    assert_eq!(model.vertex_count(), 36_025);
}

#[rstest]
#[case(&["--degrees", "1,2.5,10", "--counts", "5,4,3"], vec![1.0, 2.5, 10.0], vec![5, 4, 3])]
#[case(&["--degrees", "7", "--counts", "12"], vec![7.0], vec![12])]
fn generate_parses_comma_separated_tables(
    #[case] args: &[&str],
    #[case] degrees: Vec<f64>,
    #[case] counts: Vec<u64>,
) {
    let cli = Cli::try_parse_from(
        ["chunglu", "generate", "--seed", "42", "-q"]
            .iter()
            .chain(args),
    )
    .expect("arguments must parse");
    let Command::Generate(command) = cli.command else {
        panic!("expected generate");
    };
    assert_eq!(command.degrees, Some(degrees));
    assert_eq!(command.counts, Some(counts));
    assert_eq!(command.seed, 42);
    assert!(command.quiet);
}

#[rstest]
#[case(&["generate", "--batch-size", "0"])]
#[case(&["generate", "--max-attempts", "0"])]
#[case(&["generate", "--counts", "4,x"])]
#[case(&["inspect"])]
fn rejects_malformed_arguments(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(std::iter::once(&"chunglu").chain(args)).is_err());
}

#[rstest]
#[case(Some(vec![1.0, 2.0]), Some(vec![3]), ConfigErrorCode::LengthMismatch)]
#[case(Some(vec![0.0]), Some(vec![3]), ConfigErrorCode::InvalidDegree)]
#[case(Some(vec![2.0]), Some(vec![0]), ConfigErrorCode::ZeroClassSize)]
#[case(None, Some(vec![3]), ConfigErrorCode::LengthMismatch)]
fn generate_rejects_invalid_tables_before_touching_the_store(
    #[case] degrees: Option<Vec<f64>>,
    #[case] counts: Option<Vec<u64>>,
    #[case] expected: ConfigErrorCode,
) {
    let dir = temp_dir();
    let store = dir.path().join("never.sqlite3");
    let mut command = small_generate(&store);
    command.degrees = degrees;
    command.counts = counts;

    let err = run_cli(Cli {
        command: Command::Generate(command),
    })
    .expect_err("invalid tables must be rejected");
    match err {
        CliError::Core(core) => {
            assert_eq!(core.code(), GeneratorErrorCode::InvalidConfig);
            assert_eq!(core.config_code(), Some(expected));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!store.exists());
}

#[test]
fn generate_then_inspect_round_trips_through_the_store() {
    let dir = temp_dir();
    let command = small_generate(dir.path());
    let expected = build_chunglu(&command)
        .expect("valid tables")
        .generator()
        .collect_edges()
        .0;

    let generated = expect_generate(run_cli(Cli {
        command: Command::Generate(command),
    }));
    assert_eq!(generated.classes, 3);
    assert_eq!(generated.vertices, 258);
    assert_eq!(generated.report.stats.pairs_processed, 9);
    assert_eq!(generated.report.persisted, expected.len() as u64);
    assert!(generated.store.ends_with(DEFAULT_STORE_FILE_NAME));

    let inspected = expect_inspect(run_cli(Cli {
        command: Command::Inspect(InspectCommand {
            store: dir.path().to_path_buf(),
            limit: 5,
        }),
    }));
    assert_eq!(inspected.records, expected.len() as u64);
    assert_eq!(inspected.edges.as_slice(), &expected[..expected.len().min(5)]);
}

#[test]
fn inspect_reports_store_failures() {
    let dir = temp_dir();
    let path = dir.path().join("garbage.sqlite3");
    std::fs::write(&path, "not a database\n".repeat(64)).expect("write file");
    let err = run_cli(Cli {
        command: Command::Inspect(InspectCommand {
            store: path,
            limit: 1,
        }),
    })
    .expect_err("garbage must not open as a store");
    assert!(matches!(err, CliError::Store(_)));
}

#[test]
fn generate_records_cli_spans() {
    let dir = temp_dir();
    let command = small_generate(dir.path());
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    let summary = tracing::subscriber::with_default(subscriber, || {
        expect_generate(run_cli(Cli {
            command: Command::Generate(command),
        }))
    });

    let run_span = layer.span_named("cli.run").expect("cli.run span must exist");
    assert_eq!(run_span.fields.get("command"), Some(&"generate".to_owned()));
    let generate_span = layer
        .span_named("cli.generate")
        .expect("cli.generate span must exist");
    assert_eq!(generate_span.fields.get("seed"), Some(&"8989".to_owned()));
    assert_eq!(generate_span.fields.get("classes"), Some(&"3".to_owned()));
    assert_eq!(generate_span.fields.get("store"), Some(&summary.store));

    let completed = layer.events_with_message("generate completed");
    assert_eq!(completed.len(), 1);
    assert_eq!(
        completed[0].fields.get("persisted"),
        Some(&summary.report.persisted.to_string())
    );
}

#[test]
fn generate_summary_renders_every_total() {
    let summary = CommandSummary::Generate(GenerateSummary {
        store: "out/edges.sqlite3".into(),
        classes: 2,
        vertices: 50,
        expected_edges: 24.5,
        report: RunReport {
            persisted: 23,
            stats: GenerationStats {
                pairs_processed: 4,
                edges_emitted: 23,
                self_pairs_discarded: 0,
            },
        },
    });
    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer).expect("render");
    let rendered = String::from_utf8(buffer).expect("utf-8 output");
    assert_eq!(
        rendered,
        "store: out/edges.sqlite3\n\
         classes: 2\n\
         vertices: 50\n\
         expected edges: 24.5\n\
         pairs processed: 4\n\
         edges emitted: 23\n\
         edges persisted: 23\n\
         self pairs discarded: 0\n"
    );
}

#[test]
fn inspect_of_an_empty_store_prints_no_edges() {
    let dir = temp_dir();
    drop(SqliteEdgeStore::open(dir.path()).expect("create store"));
    let summary = expect_inspect(run_cli(Cli {
        command: Command::Inspect(InspectCommand {
            store: dir.path().to_path_buf(),
            limit: 10,
        }),
    }));
    assert_eq!(summary.records, 0);
    assert_eq!(summary.edges, Vec::<Edge>::new());
}
