//! Schedule to Kernel Generator CLI
//!
//! Usage:
//!   sched2kernel dft_float3.alst --constants dft_float3.cout --name dft_float3 -o dft_float3.rs
//!   sched2kernel n1_4.txt --verify
//!   sched2kernel --config dft/config.json

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser as ClapParser;
use colored::Colorize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use schedule_to_kernel::driver::write_atomically;
use schedule_to_kernel::eval::{verify_step, STEP_TOLERANCE};
use schedule_to_kernel::kernel::load_jobs;
use schedule_to_kernel::{analyze_sources, CodeGenerator, Driver};

#[derive(ClapParser, Debug)]
#[command(name = "sched2kernel")]
#[command(author = "FFT Team")]
#[command(version = "0.1.0")]
#[command(about = "Generates fixed-size Rust DFT kernels from codelet schedules")]
struct Args {
    /// Schedule file (one `(:= ...)` statement per line)
    #[arg(value_name = "SCHEDULE", required_unless_present = "config")]
    schedule: Option<PathBuf>,

    /// Companion file with `DK(...)` constant declarations (defaults to the schedule itself)
    #[arg(short = 'c', long = "constants", value_name = "FILE")]
    constants: Option<PathBuf>,

    /// Name of the generated function (defaults to the schedule's file stem)
    #[arg(short = 'n', long = "name")]
    name: Option<String>,

    /// Write the kernel here instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Batch mode: JSON list of {"prefix", "func"} jobs
    #[arg(long = "config", value_name = "FILE", conflicts_with = "schedule")]
    config: Option<PathBuf>,

    /// Print a JSON summary instead of the source
    #[arg(short = 'j', long = "json")]
    json_output: bool,

    /// Check the kernel against a direct DFT on a step input
    #[arg(long = "verify")]
    verify: bool,

    /// Verbose logging (repeat for more)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match &args.config {
        Some(config) => run_batch(config),
        None => run_single(&args),
    };

    if let Err(e) = result {
        eprintln!("{}: {:#}", "Error".red(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_batch(config: &Path) -> Result<()> {
    let jobs = load_jobs(config)?;
    let base = config.parent().unwrap_or_else(|| Path::new("."));

    let report = Driver::new(base).run_batch(&jobs);

    for path in &report.written {
        println!("{} {}", "wrote".green(), path.display());
    }
    for failure in &report.failures {
        eprintln!("{} {}: {}", "failed".red(), failure.job.prefix, failure.error);
    }

    if !report.is_success() {
        bail!("{} of {} kernels failed", report.failures.len(), jobs.len());
    }
    Ok(())
}

fn run_single(args: &Args) -> Result<()> {
    let Some(schedule_path) = &args.schedule else {
        bail!("no schedule given");
    };

    let schedule = fs::read_to_string(schedule_path)
        .with_context(|| format!("failed to read schedule {}", schedule_path.display()))?;

    let companion = match &args.constants {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read constants {}", path.display()))?,
        None => schedule.clone(),
    };

    let name = match &args.name {
        Some(name) => name.clone(),
        None => schedule_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().replace(['-', '.'], "_"))
            .context("cannot derive a function name; pass --name")?,
    };

    let analyzed = analyze_sources(&schedule, &companion)
        .with_context(|| format!("in {}", schedule_path.display()))?;
    let kernel = CodeGenerator::new(&name).generate(&analyzed)?;

    if args.verify {
        let error = verify_step(&analyzed)?;
        if error > STEP_TOLERANCE {
            warn!(kernel = %kernel.name, error, "step response exceeds tolerance");
            bail!("{}: mean step error {:e} exceeds {:e}", kernel.name, error, STEP_TOLERANCE);
        }
        eprintln!("{}: {} (mean step error {:e})", "Verified".green(), kernel.summary(), error);
    }

    if args.json_output {
        println!("{}", kernel.to_json()?);
    } else if let Some(output) = &args.output {
        write_atomically(output, kernel.source.as_bytes())?;
        eprintln!("{} {}", "wrote".green(), output.display());
    } else {
        print!("{}", kernel.source);
    }

    Ok(())
}
