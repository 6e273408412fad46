//! bp-cli: inspect, evaluate and sample breakpoint files.
//!
//! Usage:
//!   bp-cli info curve.bp
//!   bp-cli value curve.bp 0.25 0.5
//!   bp-cli sample curve.bp --width 32 --height 1
//!   bp-cli adsr -a 0.1 -d 0.1 -s 0.5 -r 0.2 --release-at 0.3

use anyhow::{Context, Result};
use bp_master::{AdsrEnvelope, SaveOutcome, Session};
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use std::path::{Path, PathBuf};

/// Breakpoint envelope tool
#[derive(Parser)]
#[command(name = "bp-cli")]
#[command(about = "Inspect, evaluate and sample breakpoint envelopes")]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the breakpoints of a file
    Info {
        file: PathBuf,
    },

    /// Evaluate a file at one or more times
    Value {
        file: PathBuf,

        #[arg(required = true, allow_negative_numbers = true)]
        times: Vec<f64>,
    },

    /// Sample a file across its time range
    Sample {
        file: PathBuf,

        /// Number of samples
        #[arg(short, long, default_value = "32")]
        width: usize,

        /// Height samples are scaled to
        #[arg(long, default_value = "1.0")]
        height: f64,

        /// Also print per-sample slopes
        #[arg(long)]
        derivatives: bool,
    },

    /// Scale a file so its largest value is 1
    Normalize {
        file: PathBuf,

        /// Write here instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Sample an ADSR envelope
    Adsr {
        /// Attack duration in seconds
        #[arg(short, long, default_value = "0.1")]
        attack: f64,

        /// Decay duration in seconds
        #[arg(short, long, default_value = "0.1")]
        decay: f64,

        /// Sustain level (0.0 to 1.0)
        #[arg(short, long, default_value = "0.5")]
        sustain: f64,

        /// Release duration in seconds
        #[arg(short, long, default_value = "0.2")]
        release: f64,

        /// Release time; without it the full shape is previewed
        #[arg(long)]
        release_at: Option<f64>,

        /// Number of samples
        #[arg(short, long, default_value = "32")]
        width: usize,
    },
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(verbose: u8) -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log_level(verbose))
        .format_timestamp(None)
        .try_init()
        .context("Failed to install logger")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { file } => info(&file),
        Commands::Value { file, times } => value(&file, &times),
        Commands::Sample { file, width, height, derivatives } => sample(&file, width, height, derivatives),
        Commands::Normalize { file, output } => normalize(&file, output),
        Commands::Adsr { attack, decay, sustain, release, release_at, width } => {
            adsr(attack, decay, sustain, release, release_at, width);
            Ok(())
        }
    }
}

fn open(file: &Path) -> Result<Session> {
    Session::open(file).with_context(|| format!("Failed to open {}", file.display()))
}

fn info(file: &Path) -> Result<()> {
    let session = open(file)?;
    let env = session.envelope();
    let bounds = env.bounds();

    println!("File:        {}", file.display());
    println!("Breakpoints: {}", env.len());
    println!("Time:        {} .. {}", bounds.min_time, bounds.max_time);
    println!("Value:       {} .. {}", bounds.min_value, bounds.max_value);
    println!();
    for (i, (_, bp)) in env.chain().iter().enumerate() {
        print!("{i:4}  t={:<10.6} v={:<10.6} {}", bp.time, bp.value, bp.kind);
        if !bp.params.is_empty() {
            print!("  {:?}", bp.params.as_slice());
        }
        println!();
    }
    for d in session.diagnostics() {
        println!("skipped line {}: {}", d.line, d.reason);
    }
    Ok(())
}

fn value(file: &Path, times: &[f64]) -> Result<()> {
    let mut env = open(file)?.into_envelope();
    for &t in times {
        println!("{t}\t{}", env.value_at(t));
    }
    Ok(())
}

fn sample(file: &Path, width: usize, height: f64, derivatives: bool) -> Result<()> {
    let mut session = open(file)?;
    let plot = session.plot(width, height);
    for (i, v) in plot.samples.iter().enumerate() {
        if derivatives {
            println!("{i}\t{v:.6}\t{:.6}", plot.derivatives[i]);
        } else {
            println!("{i}\t{v:.6}");
        }
    }
    Ok(())
}

fn normalize(file: &Path, output: Option<PathBuf>) -> Result<()> {
    let mut session = open(file)?;
    session.normalize();
    match output {
        Some(out) => {
            session.save_as(&out).with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Wrote {}", out.display());
        }
        None => match session.save().with_context(|| format!("Failed to write {}", file.display()))? {
            SaveOutcome::Saved(path) => println!("Wrote {}", path.display()),
            SaveOutcome::NeedsPath => anyhow::bail!("no output path for {}", file.display()),
        },
    }
    Ok(())
}

fn adsr(attack: f64, decay: f64, sustain: f64, release: f64, release_at: Option<f64>, width: usize) {
    let mut env = AdsrEnvelope::new(attack, decay, sustain, release);
    if let Some(t) = release_at {
        env.release(t);
    }
    let bounds = *env.bounds();
    let end = match release_at {
        Some(_) => env.release_breakpoints().last().map_or(bounds.max_time, |bp| bp.time.max(bounds.max_time)),
        None => bounds.max_time,
    };
    let samples = env.sample_curve(width, 1.0);
    for (i, v) in samples.iter().enumerate() {
        let t = if width > 1 { end * i as f64 / (width - 1) as f64 } else { 0.0 };
        println!("{t:.6}\t{v:.6}");
    }
}
