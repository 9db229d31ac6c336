use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use swipe_core::{ConfigError, SwipeConfig};
use tracing::info;

use crate::error::{HarnessError, Result};
use crate::replay::replay;
use crate::trace::{TraceFile, TraceWriter, synth_line};

#[derive(Debug, Parser)]
#[command(
    name = "swipe-harness",
    about = "Replay and inspect touch-swipe gesture traces",
    version
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a JSONL gesture trace through the engine.
    Replay(ReplayArgs),

    /// Write a synthetic straight-line drag as a trace.
    Synth(SynthArgs),

    /// Load and validate a TOML or JSON config file.
    #[command(name = "check-config")]
    CheckConfig(CheckConfigArgs),

    /// Print the default config as TOML.
    Defaults,
}

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// Trace file (JSONL).
    pub trace: PathBuf,

    /// Config file; overrides any config embedded in the trace header.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Cancel pending snap-backs when a new gesture starts.
    #[arg(long)]
    pub fix_stale_reset: bool,

    /// Emit one JSON object per step plus a summary object.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct SynthArgs {
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub from_x: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub from_y: f64,
    #[arg(long, allow_hyphen_values = true)]
    pub to_x: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub to_y: f64,

    /// Number of move records.
    #[arg(long, default_value_t = 10)]
    pub steps: u32,

    /// Milliseconds between records.
    #[arg(long, default_value_t = 16)]
    pub frame_ms: u64,

    /// Delay from release to the trailing tick.
    #[arg(long, default_value_t = 150)]
    pub settle_ms: u64,

    #[arg(long, default_value = "synthetic")]
    pub session: String,

    /// Output path; stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct CheckConfigArgs {
    pub path: PathBuf,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    crate::logging::init(cli.verbose);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Commands::Replay(args) => run_replay(&args, out),
        Commands::Synth(args) => run_synth(&args, out),
        Commands::CheckConfig(args) => run_check_config(&args, out),
        Commands::Defaults => {
            out.write_all(SwipeConfig::default().to_toml_string()?.as_bytes())?;
            Ok(())
        }
    }
}

/// Config precedence: `--config` file, then the trace header, then
/// defaults. `--fix-stale-reset` is applied last. Both loaded sources are
/// validated.
fn resolve_config(args: &ReplayArgs, trace: &TraceFile) -> Result<SwipeConfig> {
    let mut config = match (&args.config, trace.config()) {
        (Some(path), _) => SwipeConfig::load_validated(path)?,
        (None, Some(embedded)) => {
            let errors = embedded.validate();
            if !errors.is_empty() {
                return Err(ConfigError::Validation(errors).into());
            }
            embedded.clone()
        }
        (None, None) => SwipeConfig::default(),
    };
    if args.fix_stale_reset {
        config.cancel_pending_reset_on_start = true;
    }
    Ok(config)
}

pub fn run_replay(args: &ReplayArgs, out: &mut dyn Write) -> Result<()> {
    let trace = TraceFile::open(&args.trace)?;
    let config = resolve_config(args, &trace)?;
    info!(
        trace = %args.trace.display(),
        records = trace.len(),
        fix_stale_reset = config.cancel_pending_reset_on_start,
        "replaying trace"
    );

    let report = replay(&trace, config);
    if args.json {
        for step in &report.steps {
            writeln!(out, "{}", serde_json::to_string(step)?)?;
        }
        writeln!(out, "{}", serde_json::to_string(&report.summary)?)?;
    } else {
        for step in &report.steps {
            writeln!(out, "{step}")?;
        }
        writeln!(out, "{}", report.summary)?;
    }
    Ok(())
}

pub fn run_synth(args: &SynthArgs, out: &mut dyn Write) -> Result<()> {
    if args.steps == 0 {
        return Err(HarnessError::invalid("--steps must be at least 1"));
    }
    if args.frame_ms == 0 {
        return Err(HarnessError::invalid("--frame-ms must be at least 1"));
    }
    let records = synth_line(
        (args.from_x, args.from_y),
        (args.to_x, args.to_y),
        args.steps,
        args.frame_ms,
        args.settle_ms,
    );

    match &args.output {
        Some(path) => {
            let file = BufWriter::new(File::create(path)?);
            let mut writer = TraceWriter::new(file, &args.session, None)?;
            for record in &records {
                writer.record(record)?;
            }
            let written = writer.records();
            writer.finish()?;
            writeln!(out, "wrote {written} records to {}", path.display())?;
        }
        None => {
            let mut writer = TraceWriter::new(&mut *out, &args.session, None)?;
            for record in &records {
                writer.record(record)?;
            }
            writer.finish()?;
        }
    }
    Ok(())
}

pub fn run_check_config(args: &CheckConfigArgs, out: &mut dyn Write) -> Result<()> {
    let config = SwipeConfig::load_validated(&args.path)?;
    writeln!(out, "{}: ok", args.path.display())?;
    out.write_all(config.to_toml_string()?.as_bytes())?;
    Ok(())
}
