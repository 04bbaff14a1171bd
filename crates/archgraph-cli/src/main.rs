//! archgraph CLI - Check, reconcile and diff architecture graphs

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use archgraph::load::DEFAULT_CONFIG;
use archgraph::{check, load_dependency_versions, load_descriptors, load_options, LoadError};
use archgraph_differ::{diff_source, DiffResult};
use archgraph_model::{render, Entity};
use archgraph_parser::{parse, parse_declarations, ParseError};
use archgraph_reconciler::{resolve, ReconcileOptions, ReconcileResult};

#[derive(Parser)]
#[command(name = "archgraph")]
#[command(about = "Keep architecture as a checked artifact", long_about = None, version)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a design file: syntax, duplicates, cycles, orphans, references
    Check {
        /// Design file
        file: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse a design file and print its entities as JSON
    Parse {
        /// Design file
        file: PathBuf,
        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Reconcile module descriptors into a canonical entity graph
    Reconcile {
        /// Descriptor JSON files or directories containing them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[command(flatten)]
        options: OptionArgs,
        /// Print entities and diagnostics as JSON instead of design text
        #[arg(long)]
        json: bool,
    },
    /// Reconcile module descriptors and diff them against a design file
    Diff {
        /// Descriptor JSON files or directories containing them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Expected design file
        #[arg(long)]
        expected: PathBuf,
        #[command(flatten)]
        options: OptionArgs,
        /// Print the diff result as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Reconciliation settings; flags override the config file
#[derive(Args, Default)]
struct OptionArgs {
    /// JSON config file (defaults to archgraph.json when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Synthesize a Program per entry point
    #[arg(long)]
    programs: bool,
    /// Explicit entry module path (repeatable)
    #[arg(long = "entry")]
    entry_points: Vec<String>,
    /// Prefix stripped from module paths when resolving imports
    #[arg(long)]
    source_root: Option<String>,
    /// Keep private methods and constructors
    #[arg(long)]
    include_private: bool,
    /// Version stamped onto synthesized Programs
    #[arg(long)]
    program_version: Option<String>,
    /// package.json to read dependency versions from
    #[arg(long)]
    package_json: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write report: {0}")]
    Report(io::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.log_level);

    match execute(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing subscriber on stderr.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Run one command; `Ok(false)` means the input was processed but is invalid.
fn execute(command: Commands) -> Result<bool, CliError> {
    match command {
        Commands::Check { file, json } => cmd_check(&file, json),
        Commands::Parse { file, pretty } => cmd_parse(&file, pretty),
        Commands::Reconcile {
            inputs,
            options,
            json,
        } => cmd_reconcile(&inputs, &options, json),
        Commands::Diff {
            inputs,
            expected,
            options,
            json,
        } => cmd_diff(&inputs, &expected, &options, json),
    }
}

fn read_source(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn cmd_check(file: &Path, json: bool) -> Result<bool, CliError> {
    let source = read_source(file)?;

    if let Err(err) = parse_declarations(&source) {
        if json {
            println!("{}", serde_json::to_string_pretty(&check(&source))?);
        } else {
            report_parse_error(&source, file, &err)?;
        }
        return Ok(false);
    }

    let report = check(&source);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.errors.is_empty() {
        println!("✓ {}", file.display());
    } else {
        let mark = if report.valid { "✓" } else { "✗" };
        eprintln!("{} {} - {} findings:", mark, file.display(), report.errors.len());
        for diagnostic in &report.errors {
            eprintln!("  {}", diagnostic.format_simple());
        }
    }
    Ok(report.valid)
}

/// Parsed design keyed by entity name
#[derive(Serialize)]
struct ParseOutput<'a> {
    entities: BTreeMap<&'a str, &'a Entity>,
}

fn cmd_parse(file: &Path, pretty: bool) -> Result<bool, CliError> {
    let source = read_source(file)?;
    match parse(&source) {
        Ok(graph) => {
            let output = ParseOutput {
                entities: graph.iter().map(|e| (e.name.as_str(), e)).collect(),
            };
            let json = if pretty {
                serde_json::to_string_pretty(&output)?
            } else {
                serde_json::to_string(&output)?
            };
            println!("{json}");
            Ok(true)
        }
        Err(err) => {
            report_parse_error(&source, file, &err)?;
            Ok(false)
        }
    }
}

/// Merge the config file with command-line flags
fn reconcile_options(args: &OptionArgs) -> Result<ReconcileOptions, CliError> {
    let config = args.config.clone().or_else(|| {
        let default = PathBuf::from(DEFAULT_CONFIG);
        default.is_file().then_some(default)
    });
    let base = match config {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_options(&path)?
        }
        None => ReconcileOptions::default(),
    };

    let mut overlay = ReconcileOptions {
        generate_programs: args.programs,
        entry_points: args.entry_points.clone(),
        source_root: args.source_root.clone(),
        include_private_methods: args.include_private,
        program_version: args.program_version.clone(),
        ..Default::default()
    };
    if let Some(manifest) = &args.package_json {
        overlay.dependency_versions = load_dependency_versions(manifest)?;
    }
    Ok(base.merge(overlay))
}

fn reconcile_inputs(inputs: &[PathBuf], args: &OptionArgs) -> Result<ReconcileResult, CliError> {
    let options = reconcile_options(args)?;
    let modules = load_descriptors(inputs)?;
    let result = resolve(&modules, &options);
    info!(
        modules = modules.len(),
        entities = result.entities.len(),
        success = result.success,
        "reconciled"
    );
    Ok(result)
}

fn print_reconcile_diagnostics(result: &ReconcileResult) {
    for diagnostic in &result.diagnostics {
        let level = if diagnostic.is_hard_error() { "error" } else { "warning" };
        eprintln!("{}[{}]: {}", level, diagnostic.code(), diagnostic);
    }
}

#[derive(Serialize)]
struct ReconcileDiagnosticOutput {
    code: &'static str,
    severity: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
}

#[derive(Serialize)]
struct ReconcileOutput<'a> {
    success: bool,
    entities: &'a [Entity],
    diagnostics: Vec<ReconcileDiagnosticOutput>,
}

fn cmd_reconcile(inputs: &[PathBuf], args: &OptionArgs, json: bool) -> Result<bool, CliError> {
    let result = reconcile_inputs(inputs, args)?;

    if json {
        let output = ReconcileOutput {
            success: result.success,
            entities: &result.entities,
            diagnostics: result
                .diagnostics
                .iter()
                .map(|d| ReconcileDiagnosticOutput {
                    code: d.code(),
                    severity: if d.is_hard_error() { "error" } else { "warning" },
                    message: d.to_string(),
                    file: d.file().map(str::to_string),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_reconcile_diagnostics(&result);
        if result.success {
            print!("{}", render(&result.entities));
        }
    }
    Ok(result.success)
}

fn cmd_diff(
    inputs: &[PathBuf],
    expected: &Path,
    args: &OptionArgs,
    json: bool,
) -> Result<bool, CliError> {
    let reconciled = reconcile_inputs(inputs, args)?;
    if !reconciled.success {
        print_reconcile_diagnostics(&reconciled);
        return Ok(false);
    }

    let source = read_source(expected)?;
    let result = diff_source(&reconciled.entities, &source);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_diff(&result);
    }
    Ok(result.success)
}

fn print_diff(result: &DiffResult) {
    for name in &result.missing_entities {
        eprintln!("missing: {name}");
    }
    for name in &result.extra_entities {
        eprintln!("extra: {name}");
    }
    for deviation in &result.deviations {
        eprintln!("{}", deviation.format_simple());
    }
    if result.success {
        println!("✓ matches design ({} warnings)", result.warnings().count());
    } else {
        println!(
            "✗ {} errors, {} missing, {} extra",
            result.errors().count(),
            result.missing_entities.len(),
            result.extra_entities.len()
        );
    }
}

fn report_parse_error(source: &str, file: &Path, error: &ParseError) -> Result<(), CliError> {
    let name = file.to_string_lossy().to_string();
    let span = error.span();
    Report::build(ReportKind::Error, name.clone(), span.start)
        .with_message(error.to_string())
        .with_label(
            Label::new((name.clone(), span.start..span.end))
                .with_message(error.to_string())
                .with_color(Color::Red),
        )
        .finish()
        .eprint((name, Source::from(source)))
        .map_err(CliError::Report)
}
