//! dewrap CLI - Command-line tool for unwrapping reactive state snapshots
//!
//! This binary provides command-line interfaces for:
//! - unwrap: envelope JSON/NDJSON → plain JSON/NDJSON
//! - inspect: count wrappers, value kinds and opaque classes
//! - check: fail when any record still holds a wrapper

mod config;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use config::CliConfig;
use dewrap_io::{
    check_input, execute_unwrap, inspect_input, InputShape, InputSource, InspectReport,
    KindFilter, Limits, OutputFormat, OutputSink, StrategyChoice, UnwrapOptions, UnwrapRequest,
    UnwrapSummary, WrapperKind,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "dewrap")]
#[command(about = "Deep-unwrap reactive state snapshots into plain JSON")]
#[command(version)]
struct Cli {
    /// TOML config file; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Unwrap every record into plain JSON
    ///
    /// Examples:
    ///   dewrap unwrap snapshot.json -o plain.json
    ///   dewrap unwrap events.ndjson --only reactive,proxy --threads 4
    ///   dewrap unwrap app.json --pointer /stores --format ndjson
    Unwrap {
        /// Input file (envelope JSON or NDJSON, `-` for stdin)
        input: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Treat input as NDJSON regardless of extension
        #[arg(long, conflicts_with = "json")]
        ndjson: bool,
        /// Treat input as a single JSON document regardless of extension
        #[arg(long)]
        json: bool,
        /// JSON Pointer selecting the records in each document
        #[arg(long)]
        pointer: Option<String>,
        /// Collapse only these wrapper kinds (comma separated)
        #[arg(long, value_delimiter = ',', value_parser = parse_wrapper_kind)]
        only: Vec<WrapperKind>,
        /// Skip records that do not unwrap to a mapping
        #[arg(long)]
        skip_invalid: bool,
        /// Worker threads
        #[arg(long)]
        threads: Option<usize>,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
        /// Output layout
        #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
        format: FormatArg,
        /// Display a progress spinner while unwrapping
        #[arg(long)]
        progress: bool,
        /// Print wrapper counts per kind after the run
        #[arg(long)]
        stats: bool,
    },
    /// Report what an input contains without unwrapping it
    ///
    /// Examples:
    ///   dewrap inspect snapshot.json
    ///   dewrap inspect events.ndjson --format json
    Inspect {
        /// Input file (envelope JSON or NDJSON, `-` for stdin)
        input: PathBuf,
        /// Output format (table, json)
        #[arg(long, value_enum, default_value_t = InspectFormat::Table)]
        format: InspectFormat,
        /// JSON Pointer selecting the records in each document
        #[arg(long)]
        pointer: Option<String>,
    },
    /// Exit with status 2 when any record still holds a wrapper
    ///
    /// Status 1 is left for errors such as unreadable input.
    Check {
        /// Input file (envelope JSON or NDJSON, `-` for stdin)
        input: PathBuf,
        /// JSON Pointer selecting the records in each document
        #[arg(long)]
        pointer: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum FormatArg {
    Auto,
    Ndjson,
    #[value(name = "json-array")]
    JsonArray,
    Document,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Auto => OutputFormat::Auto,
            FormatArg::Ndjson => OutputFormat::Ndjson,
            FormatArg::JsonArray => OutputFormat::JsonArray,
            FormatArg::Document => OutputFormat::Document,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum InspectFormat {
    Table,
    Json,
}

fn parse_wrapper_kind(s: &str) -> Result<WrapperKind, String> {
    s.parse()
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    debug!(?config, "loaded configuration");

    match cli.command {
        Commands::Unwrap {
            input,
            output,
            ndjson,
            json,
            pointer,
            only,
            skip_invalid,
            threads,
            pretty,
            format,
            progress,
            stats,
        } => {
            let input_source = resolve_input_source(&input, ndjson, json)?;
            let options = build_unwrap_options(
                &config,
                pointer,
                only,
                skip_invalid,
                threads,
                pretty,
                format.into(),
            )?;
            handle_unwrap(input_source, output, options, progress, stats, cli.quiet)?;
        }
        Commands::Inspect {
            input,
            format,
            pointer,
        } => {
            let input_source = resolve_input_source(&input, false, false)?;
            let pointer = pointer.or_else(|| config.pointer.clone());
            handle_inspect(input_source, format, pointer, &config.limits())?;
        }
        Commands::Check { input, pointer } => {
            let input_source = resolve_input_source(&input, false, false)?;
            let pointer = pointer.or_else(|| config.pointer.clone());
            if !handle_check(input_source, pointer, &config.limits())? {
                std::process::exit(EXIT_WRAPPER_FOUND);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    // A subscriber may already be installed when embedded in tests
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn build_unwrap_options(
    config: &CliConfig,
    pointer: Option<String>,
    only: Vec<WrapperKind>,
    skip_invalid: bool,
    threads: Option<usize>,
    pretty: bool,
    format: OutputFormat,
) -> Result<UnwrapOptions, Box<dyn Error>> {
    let only = if only.is_empty() {
        config.only_kinds()?.unwrap_or_default()
    } else {
        only
    };
    let strategy = if only.is_empty() {
        StrategyChoice::All
    } else {
        StrategyChoice::Only(KindFilter::new(only))
    };

    let threads = threads.or(config.threads).unwrap_or(1);
    if threads == 0 {
        return Err("--threads must be at least 1".into());
    }

    Ok(UnwrapOptions {
        pointer: pointer.or_else(|| config.pointer.clone()),
        strategy,
        skip_invalid: skip_invalid || config.skip_invalid.unwrap_or(false),
        threads,
        pretty: pretty || config.pretty.unwrap_or(false),
        format,
        limits: config.limits(),
        ..UnwrapOptions::default()
    })
}

fn handle_unwrap(
    input: InputSource,
    output: Option<PathBuf>,
    options: UnwrapOptions,
    show_progress: bool,
    show_stats: bool,
    quiet: bool,
) -> Result<(), Box<dyn Error>> {
    let sink = match &output {
        Some(path) => OutputSink::Path(path.clone()),
        None => OutputSink::Writer(Box::new(std::io::stdout())),
    };
    let request = UnwrapRequest {
        input,
        output: sink,
        options,
    };

    let mut progress_bar = show_progress.then(|| create_spinner("Unwrapping records"));
    let summary = execute_unwrap(request)?;
    let secs = summary.elapsed.as_secs_f64().max(f64::EPSILON);
    let rec_rate = summary.records_read as f64 / secs;
    if let Some(pb) = progress_bar.take() {
        pb.finish_with_message(format!(
            "Unwrapped {} records in {:.2?} ({:.1} rec/s)",
            summary.records_written, summary.elapsed, rec_rate
        ));
    }

    if !quiet {
        report_unwrap_summary(&summary, output.as_deref(), rec_rate)?;
    }
    if show_stats {
        report_unwrap_stats(&summary)?;
    }
    Ok(())
}

fn resolve_input_source(
    path: &Path,
    force_ndjson: bool,
    force_json: bool,
) -> Result<InputSource, Box<dyn Error>> {
    if force_ndjson && force_json {
        return Err("--ndjson and --json are mutually exclusive".into());
    }

    if path == Path::new("-") {
        let stdin = Box::new(std::io::stdin());
        return Ok(if force_json {
            InputSource::JsonReader(stdin)
        } else {
            InputSource::NdjsonReader(stdin)
        });
    }

    if force_ndjson {
        return Ok(InputSource::NdjsonPath(path.to_path_buf()));
    }
    if force_json {
        return Ok(InputSource::JsonPath(path.to_path_buf()));
    }

    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_ascii_lowercase())
    {
        Some(ext) if ext == "json" => Ok(InputSource::JsonPath(path.to_path_buf())),
        Some(ext) if ext == "ndjson" || ext == "jsonl" => {
            Ok(InputSource::NdjsonPath(path.to_path_buf()))
        }
        _ => Ok(InputSource::NdjsonPath(path.to_path_buf())),
    }
}

fn report_unwrap_summary(
    summary: &UnwrapSummary,
    output: Option<&Path>,
    rec_rate: f64,
) -> Result<(), Box<dyn Error>> {
    let target = output
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    let mut stderr = std::io::stderr().lock();
    writeln!(
        &mut stderr,
        "Unwrapped to {} (records: {}, written: {}, rejected: {}, wrappers: {}, elapsed: {:.2?}, {:.1} rec/s)",
        target,
        summary.records_read,
        summary.records_written,
        summary.records_rejected,
        summary.stats.wrappers.total(),
        summary.elapsed,
        rec_rate
    )?;
    Ok(())
}

fn report_unwrap_stats(summary: &UnwrapSummary) -> Result<(), Box<dyn Error>> {
    let mut stderr = std::io::stderr().lock();
    writeln!(&mut stderr, "Wrapper\tCollapsed")?;
    for kind in WrapperKind::ALL {
        writeln!(&mut stderr, "{}\t{}", kind, summary.stats.wrappers.get(kind))?;
    }
    if summary.stats.wrappers.custom > 0 {
        writeln!(&mut stderr, "custom\t{}", summary.stats.wrappers.custom)?;
    }
    writeln!(&mut stderr, "Nodes visited: {}", summary.stats.nodes_visited)?;
    writeln!(&mut stderr, "Longest wrapper chain: {}", summary.stats.max_layers)?;
    Ok(())
}

fn handle_inspect(
    input: InputSource,
    format: InspectFormat,
    pointer: Option<String>,
    limits: &Limits,
) -> Result<(), Box<dyn Error>> {
    let report = inspect_input(input, pointer.as_deref(), limits)?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    match format {
        InspectFormat::Table => print_inspect_table(&mut handle, &report)?,
        InspectFormat::Json => print_inspect_json(&mut handle, &report)?,
    }
    Ok(())
}

fn shape_name(shape: Option<InputShape>) -> &'static str {
    match shape {
        Some(InputShape::SingleRecord) => "single record",
        Some(InputShape::RecordSequence) => "record sequence",
        Some(InputShape::Stream) => "stream",
        None => "unknown",
    }
}

fn print_inspect_table(writer: &mut dyn Write, report: &InspectReport) -> Result<(), Box<dyn Error>> {
    let census = &report.census;
    writeln!(writer, "Records:\t{}", report.records)?;
    writeln!(writer, "Layout:\t{}", shape_name(report.shape))?;
    writeln!(writer, "Values:\t{}", census.total_values())?;
    writeln!(writer, "Max depth:\t{}", census.max_depth)?;
    writeln!(writer, "Longest wrapper chain:\t{}", census.max_layers)?;

    writeln!(writer)?;
    writeln!(writer, "Kind\tCount")?;
    for (kind, count) in &census.kinds {
        writeln!(writer, "{}\t{}", kind, count)?;
    }

    writeln!(writer)?;
    writeln!(writer, "Wrapper\tCount")?;
    for kind in WrapperKind::ALL {
        writeln!(writer, "{}\t{}", kind, census.wrappers.get(kind))?;
    }

    if !census.opaque_classes.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Opaque class\tCount")?;
        for (class, count) in &census.opaque_classes {
            writeln!(writer, "{}\t{}", class, count)?;
        }
    }
    Ok(())
}

fn print_inspect_json(writer: &mut dyn Write, report: &InspectReport) -> Result<(), Box<dyn Error>> {
    let census = &report.census;
    let kinds: serde_json::Map<String, serde_json::Value> = census
        .kinds
        .iter()
        .map(|(kind, count)| (kind.name().to_string(), json!(count)))
        .collect();
    let wrappers: serde_json::Map<String, serde_json::Value> = WrapperKind::ALL
        .iter()
        .map(|kind| (kind.name().to_string(), json!(census.wrappers.get(*kind))))
        .collect();

    let value = json!({
        "records": report.records,
        "layout": shape_name(report.shape),
        "values": census.total_values(),
        "max_depth": census.max_depth,
        "max_layers": census.max_layers,
        "kinds": kinds,
        "wrappers": wrappers,
        "opaque_classes": census.opaque_classes,
    });
    serde_json::to_writer_pretty(&mut *writer, &value)?;
    writeln!(writer)?;
    Ok(())
}

/// Exit status of `check` when a wrapper was found
const EXIT_WRAPPER_FOUND: i32 = 2;

/// Returns false when a wrapper was found
fn handle_check(
    input: InputSource,
    pointer: Option<String>,
    limits: &Limits,
) -> Result<bool, Box<dyn Error>> {
    let report = check_input(input, pointer.as_deref(), limits)?;
    let mut stdout = std::io::stdout().lock();
    match &report.first_wrapper {
        None => {
            writeln!(&mut stdout, "plain: {} records", report.records)?;
            Ok(true)
        }
        Some((index, path)) => {
            let location = if path.is_empty() { "<root>" } else { path.as_str() };
            writeln!(
                &mut stdout,
                "wrapper found in record {} at {} ({} of {} records plain)",
                index, location, report.plain_records, report.records
            )?;
            stdout.flush()?;
            Ok(false)
        }
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
