#![forbid(unsafe_code)]
//! Command-line front end: load a configuration and a measurement file, run the
//! evaluation and write the views for the mesh viewer.
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use defect_map::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Configuration bundled with the executable, usable as a starting point.
pub const SAMPLE_CONFIG: &str = include_str!("../config/sample.toml");

/// Installs a `fmt` subscriber at `info`, overridable through `RUST_LOG`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Output format of the views.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON record per view and line.
    #[default]
    Jsonl,
    /// MSH 4.1 element data plus a `.opt` options script next to it.
    Gmsh,
}

/// Visualize per-face surface-defect measurements as styled mesh views.
#[derive(Debug, Parser)]
#[command(name = "defect-map")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Evaluation configuration (TOML)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Per-face measurements (JSON object of key -> array)
    #[arg(short, long)]
    pub measurements: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Jsonl)]
    pub format: OutputFormat,

    /// Output file; standard output when omitted (jsonl only)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Evaluate features one after another
    #[arg(long)]
    pub sequential: bool,

    /// Ignore an upper bound that lies below the lower bound of a filter
    #[arg(long)]
    pub drop_inverted_upper: bool,
}

impl Cli {
    pub fn run_config(&self) -> RunConfig {
        let inverted_bounds = if self.drop_inverted_upper {
            InvertedBounds::DropUpperBound
        } else {
            InvertedBounds::Literal
        };
        RunConfig::new()
            .with_parallel(!self.sequential)
            .with_inverted_bounds(inverted_bounds)
    }
}

/// Runs the command described by `cli`.
///
/// Skipped features are listed on standard error; only fatal errors are returned.
pub fn execute(cli: &Cli) -> Result<RunResult> {
    let spec = EvaluationSpec::from_path(&cli.config)
        .with_context(|| format!("loading configuration {}", cli.config.display()))?;
    let file = File::open(&cli.measurements)
        .with_context(|| format!("opening measurements {}", cli.measurements.display()))?;
    let store = MeasurementStore::from_json_reader(io::BufReader::new(file))
        .with_context(|| format!("reading measurements {}", cli.measurements.display()))?;

    let result = run(&spec, &store, cli.run_config())?;
    report_diagnostics(&result, &mut io::stderr().lock())?;

    match (cli.format, &cli.output) {
        (OutputFormat::Jsonl, None) => {
            write_json_lines(&result.views, io::stdout().lock())?;
        }
        (OutputFormat::Jsonl, Some(path)) => {
            write_json_lines(&result.views, create(path)?)?;
        }
        (OutputFormat::Gmsh, None) => {
            bail!("--format gmsh needs --output, the options script is written next to it")
        }
        (OutputFormat::Gmsh, Some(path)) => {
            let options_path = path.with_extension("opt");
            write_gmsh(&result.views, create(path)?, create(&options_path)?)?;
            info!("Wrote options script to {}.", options_path.display());
        }
    }

    Ok(result)
}

/// Writes one line per skipped feature: its id and the reason.
pub fn report_diagnostics(result: &RunResult, out: &mut dyn Write) -> io::Result<()> {
    for diagnostic in &result.diagnostics {
        writeln!(out, "skipped {}: {}", diagnostic.feature_id, diagnostic.error)?;
    }
    Ok(())
}

pub fn write_json_lines<W: Write>(views: &[View], writer: W) -> Result<()> {
    let mut emitter = JsonLinesEmitter::new(writer);
    emit_all(views, &mut emitter)?;
    Ok(())
}

pub fn write_gmsh<W: Write, O: Write>(views: &[View], data: W, mut options: O) -> Result<()> {
    let mut emitter = GmshEmitter::new(data);
    emit_all(views, &mut emitter)?;
    emitter.write_options(&mut options)?;
    options.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}
