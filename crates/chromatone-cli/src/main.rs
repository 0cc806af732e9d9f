//! Chromatone CLI - video-reactive ambient soundtrack rendering.
//!
//! Renders a deterministic soundtrack from a numbered image sequence (or the
//! built-in synthetic demo pattern) and dumps per-frame visual features.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

use chromatone_cli::commands;

/// Chromatone - Video-Reactive Ambient Music Engine
#[derive(Parser, Debug)]
#[command(name = "chromatone")]
#[command(author, version = chromatone_core::VERSION, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a soundtrack for a numbered image sequence
    Render {
        /// Directory holding the numbered image frames (png/jpg)
        #[arg(short, long)]
        input: PathBuf,

        /// Frame rate of the sequence
        #[arg(long, default_value_t = 30.0)]
        fps: f64,

        /// Output WAV path
        #[arg(short, long)]
        output: PathBuf,

        /// Run seed; the same seed reproduces the same soundtrack
        #[arg(long, default_value_t = 0)]
        seed: u32,

        /// Output sample rate in Hz
        #[arg(long, default_value_t = chromatone_core::DEFAULT_SAMPLE_RATE)]
        sample_rate: u32,

        /// Print the run summary as machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Render a soundtrack for the built-in synthetic demo pattern
    Demo {
        /// Length of the demo in seconds
        #[arg(long, default_value_t = 10.0)]
        seconds: f64,

        /// Output WAV path
        #[arg(short, long)]
        output: PathBuf,

        /// Run seed; the same seed reproduces the same soundtrack
        #[arg(long, default_value_t = 0)]
        seed: u32,

        /// Output sample rate in Hz
        #[arg(long, default_value_t = chromatone_core::DEFAULT_SAMPLE_RATE)]
        sample_rate: u32,

        /// Print the run summary as machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Dump per-frame visual features as JSON
    Features {
        /// Directory holding the numbered image frames (png/jpg)
        #[arg(short, long)]
        input: PathBuf,

        /// Frame rate of the sequence
        #[arg(long, default_value_t = 30.0)]
        fps: f64,

        /// Output JSON path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            input,
            fps,
            output,
            seed,
            sample_rate,
            json,
        } => commands::render::run(&input, fps, &output, seed, sample_rate, json),
        Commands::Demo {
            seconds,
            output,
            seed,
            sample_rate,
            json,
        } => commands::demo::run(seconds, &output, seed, sample_rate, json),
        Commands::Features { input, fps, output } => {
            commands::features::run(&input, fps, output.as_deref())
        }
    };

    match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{}: {:#}", "error".red(), error);
            ExitCode::from(1)
        }
    }
}
