//! Render command: soundtrack for a numbered image sequence.

use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use chromatone_core::engine::Orchestrator;
use chromatone_core::synth::ToneSynth;
use chromatone_video::{ImageSequenceSource, VideoFeatureExtractor};
use colored::Colorize;

use crate::wav::write_soundtrack;

pub fn run(
    input: &Path,
    fps: f64,
    output: &Path,
    seed: u32,
    sample_rate: u32,
    json: bool,
) -> Result<ExitCode> {
    let start = Instant::now();
    if !json {
        println!("{} {}", "Input sequence:".cyan().bold(), input.display());
    }

    let source = ImageSequenceSource::open(input, fps)
        .with_context(|| format!("failed to open image sequence in {}", input.display()))?;
    let extractor = VideoFeatureExtractor::new(source)
        .context("failed to read the first frames of the sequence")?;

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
            "{} {} ({} frames, {:.1}s of audio, {:.2?})",
            "Wrote".green().bold(),
            output.display(),
            summary.frames,
            summary.seconds,
            start.elapsed()
        );
    }
    Ok(ExitCode::SUCCESS)
}
