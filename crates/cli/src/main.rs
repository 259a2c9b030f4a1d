//! Cache hierarchy simulator CLI.
//!
//! This binary replays a memory-access trace against an L1 cache and an optional L2. It performs:
//! 1. **Positional run:** `sim BLOCKSIZE L1_SIZE L1_ASSOC L2_SIZE L2_ASSOC PREF_N PREF_M TRACE_FILE`.
//! 2. **JSON run:** `sim --config hierarchy.json TRACE_FILE`.
//! 3. **Report:** Configuration echo, per-level contents and measurements, as text or JSON.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use cachesim_core::common::SimError;
use cachesim_core::config::{Config, RecencyTracking};
use cachesim_core::sim::{CacheHierarchy, TraceReader};
use cachesim_core::stats::{REPORT_SECTIONS, Report};

#[derive(Parser, Debug)]
#[command(
    name = "sim",
    author,
    version,
    about = "Trace-driven two-level WBWA cache simulator",
    long_about = "Replay a memory-access trace against an L1 cache and an optional L2 (write-back, write-allocate, LRU).\n\nAn L2 size or associativity of 0 disables L2.\n\nExamples:\n  sim 32 8192 4 262144 8 3 10 gcc_trace.txt\n  sim --config hierarchy.json gcc_trace.txt\n  sim --json 16 1024 2 0 0 0 0 trace.txt"
)]
struct Cli {
    /// JSON hierarchy configuration; replaces the positional geometry parameters.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// BLOCKSIZE L1_SIZE L1_ASSOC L2_SIZE L2_ASSOC PREF_N PREF_M TRACE_FILE
    /// (only TRACE_FILE when `--config` is given).
    #[arg(value_name = "ARGS", required = true, num_args = 1..=8)]
    args: Vec<String>,

    /// LRU bookkeeping mechanism (overrides the configuration file).
    #[arg(long, value_parser = ["age", "stack"])]
    recency: Option<String>,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Report sections to print (configuration, contents, measurements); all by default.
    #[arg(long, value_delimiter = ',')]
    sections: Vec<String>,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(bad) = cli
        .sections
        .iter()
        .find(|s| !REPORT_SECTIONS.contains(&s.as_str()))
    {
        eprintln!(
            "Error: unknown report section '{bad}' (expected one of {})",
            REPORT_SECTIONS.join(", ")
        );
        process::exit(2);
    }

    let invocation = match Invocation::from_cli(&cli) {
        Ok(invocation) => invocation,
        Err(msg) => {
            eprintln!("Error: {msg}");
            eprintln!("Usage: sim BLOCKSIZE L1_SIZE L1_ASSOC L2_SIZE L2_ASSOC PREF_N PREF_M TRACE_FILE");
            eprintln!("       sim --config <FILE> TRACE_FILE");
            process::exit(2);
        }
    };

    if let Err(e) = run(&cli, &invocation) {
        error!("{e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Positional arguments after validation.
#[derive(Debug)]
struct Invocation {
    /// The seven geometry parameters, absent when `--config` is used.
    params: Option<[u64; 7]>,
    trace_file: PathBuf,
}

impl Invocation {
    fn from_cli(cli: &Cli) -> Result<Self, String> {
        let expected = if cli.config.is_some() { 1 } else { 8 };
        if cli.args.len() != expected {
            return Err(format!(
                "expected {expected} positional argument(s) but was provided {}",
                cli.args.len()
            ));
        }

        let (trace, numbers) = cli
            .args
            .split_last()
            .ok_or_else(|| "missing trace file".to_owned())?;

        let params = if numbers.is_empty() {
            None
        } else {
            let mut params = [0u64; 7];
            for (slot, arg) in params.iter_mut().zip(numbers) {
                *slot = arg
                    .parse()
                    .map_err(|_| format!("'{arg}' is not a non-negative integer"))?;
            }
            Some(params)
        };

        Ok(Self {
            params,
            trace_file: PathBuf::from(trace),
        })
    }
}

/// Installs the stderr `fmt` subscriber, honouring `RUST_LOG` when set.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Builds the run configuration from `--config` or the positional parameters.
fn load_config(cli: &Cli, invocation: &Invocation) -> Result<Config, SimError> {
    let mut config = match (&cli.config, invocation.params) {
        (Some(path), _) => Config::from_json_file(path)?,
        (None, Some(p)) => Config::from_params(
            p[0] as usize,
            p[1] as usize,
            p[2] as usize,
            p[3] as usize,
            p[4] as usize,
            p[5] as u32,
            p[6] as u32,
        ),
        (None, None) => Config::default(),
    };
    match cli.recency.as_deref() {
        Some("stack") => config.recency = RecencyTracking::Stack,
        Some("age") => config.recency = RecencyTracking::Age,
        _ => {}
    }
    Ok(config)
}

/// Final path component, as echoed in the configuration block.
fn basename(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Opens the trace, builds the hierarchy, replays the trace and prints the report.
///
/// The trace is opened before any cache is built so an unreadable trace fails
/// without creating simulation state.
fn run(cli: &Cli, invocation: &Invocation) -> Result<(), SimError> {
    let config = load_config(cli, invocation)?;
    let trace = TraceReader::open(&invocation.trace_file)?;

    let mut hierarchy = CacheHierarchy::new(&config)?;
    let _ = hierarchy.run(trace)?;

    let report = Report::new(
        &config,
        basename(&invocation.trace_file),
        hierarchy.l1(),
        hierarchy.l2(),
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        writeln!(out, "{}", report.to_json()?)?;
    } else {
        report.write_sections(&mut out, &cli.sections)?;
    }
    out.flush()?;
    Ok(())
}
