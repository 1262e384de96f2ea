#![warn(missing_docs)]

//! Entry point for the `pipctl` binary.

use std::{path::Path, process, sync::Arc};

use clap::Parser;
use logging::transcript::Transcript;
use pip_bounds::DisplayLayout;
use pip_config::PipConfig;
use pip_ids::DisplayId;
use pipctl::{
    Result,
    cli::{CheckSnapArgs, Cli, Commands, RunArgs},
    runner,
    scenario::Scenario,
    snap,
};
use tokio::runtime::Builder;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, registry};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, and dispatch to the chosen subcommand.
fn run() -> Result<()> {
    let Cli { log, command } = Cli::parse();
    let log_spec = log.spec();
    let env_filter = logging::env_filter_from_spec(&log_spec);
    let transcript = Transcript::new();
    registry()
        .with(env_filter)
        .with(fmt::layer().without_time())
        .with(transcript.layer())
        .try_init()
        .ok();

    match command {
        Commands::Run(args) => run_scenario(&args, &transcript),
        Commands::CheckSnap(args) => check_snap(&args),
    }
}

/// Configuration from `path`, or defaults.
fn load_config(path: Option<&Path>) -> Result<Arc<PipConfig>> {
    let config = match path {
        Some(p) => pip_config::load(p)?,
        None => PipConfig::default(),
    };
    Ok(Arc::new(config))
}

/// `pipctl run`.
fn run_scenario(args: &RunArgs, transcript: &Transcript) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let scenario = Scenario::load(&args.scenario)?;
    let runtime = Builder::new_current_thread().enable_all().build()?;
    let report = runtime.block_on(runner::run(config, &scenario, args.frame_interval))?;

    for line in &report.transcript {
        println!("{line}");
    }
    println!(
        "final: {} at {} ({} surface transactions)",
        report.final_state, report.final_bounds, report.frames_applied
    );
    if args.show_log {
        println!();
        for line in transcript.lines() {
            println!("{line}");
        }
    }
    Ok(())
}

/// `pipctl check-snap`.
fn check_snap(args: &CheckSnapArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let layout = DisplayLayout::new(DisplayId::DEFAULT, args.width, args.height);
    let samples = snap::samples(config, layout, args.samples);
    for s in &samples {
        println!(
            "{:>7.4} -> {} -> {:>7.4}  err {:.2e}",
            s.fraction,
            s.bounds,
            s.round_trip,
            s.error()
        );
    }
    snap::check(&samples)
}
