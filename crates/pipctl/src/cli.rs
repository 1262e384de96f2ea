//! Command-line interface definitions for pipctl.

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use logging::LogArgs;

/// Command-line interface for the `pipctl` binary.
#[derive(Parser, Debug)]
#[command(
    name = "pipctl",
    about = "Drive picture-in-picture transitions against a simulated window manager",
    version
)]
pub struct Cli {
    /// Logging controls shared across pipshell binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// Which command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a RON scenario and print the state transcript.
    Run(RunArgs),
    /// Print snap-fraction round-trip samples for a display.
    CheckSnap(CheckSnapArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Scenario file in RON syntax.
    #[arg(value_name = "SCENARIO")]
    pub scenario: PathBuf,

    /// PiP configuration in RON syntax; built-in defaults when omitted.
    #[arg(long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Frame interval of the animation pump.
    #[arg(
        long,
        value_parser = humantime::parse_duration,
        default_value = "16ms",
        value_name = "DURATION"
    )]
    pub frame_interval: Duration,

    /// Also print every captured log line after the transcript.
    #[arg(long)]
    pub show_log: bool,
}

/// Arguments for the `check-snap` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CheckSnapArgs {
    /// Display width in pixels.
    #[arg(long, default_value_t = 1080.0)]
    pub width: f64,

    /// Display height in pixels.
    #[arg(long, default_value_t = 2400.0)]
    pub height: f64,

    /// Number of fractions sampled over `[0, 4)`.
    #[arg(long, default_value_t = 16)]
    pub samples: usize,

    /// PiP configuration in RON syntax; built-in defaults when omitted.
    #[arg(long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}
