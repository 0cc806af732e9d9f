//! Demo command: soundtrack for the built-in synthetic pattern.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use chromatone_core::engine::Orchestrator;
use chromatone_core::synth::ToneSynth;
use chromatone_video::{SyntheticSource, VideoFeatureExtractor};
use colored::Colorize;

use crate::wav::write_soundtrack;

const DEMO_WIDTH: u32 = 320;
const DEMO_HEIGHT: u32 = 180;
const DEMO_FPS: f64 = 30.0;

pub fn run(
    seconds: f64,
    output: &Path,
    seed: u32,
    sample_rate: u32,
    json: bool,
) -> Result<ExitCode> {
    if !seconds.is_finite() || seconds <= 0.0 {
        bail!("--seconds must be positive, got {}", seconds);
    }

    // One extra frame: N frames yield N-1 feature samples.
    let frames = (seconds * DEMO_FPS).round() as u64 + 1;
    let source = SyntheticSource::new(DEMO_WIDTH, DEMO_HEIGHT, DEMO_FPS, frames);
    let extractor =
        VideoFeatureExtractor::new(source).context("failed to start the demo pattern")?;

    let synth = ToneSynth::new(sample_rate);
    let mut engine = Orchestrator::new(extractor, synth, sample_rate, seed)
        .context("failed to start the engine")?;
    let summary = write_soundtrack(&mut engine, sample_rate, output)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to serialize run summary")?
        );
    } else {
        println!(
            "{} {} ({:.1}s of audio, seed {})",
            "Wrote".green().bold(),
            output.display(),
            summary.seconds,
            seed
        );
    }
    Ok(ExitCode::SUCCESS)
}
