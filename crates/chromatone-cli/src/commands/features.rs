//! Features command: dump per-frame visual features as JSON.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chromatone_core::smooth::RawFeatures;
use chromatone_video::{ImageSequenceSource, VideoFeatureExtractor};
use colored::Colorize;
use serde::Serialize;

#[derive(Serialize)]
struct FeatureDump {
    fps: f64,
    frame_count: usize,
    frames: Vec<RawFeatures>,
}

pub fn run(input: &Path, fps: f64, output: Option<&Path>) -> Result<ExitCode> {
    let source = ImageSequenceSource::open(input, fps)
        .with_context(|| format!("failed to open image sequence in {}", input.display()))?;
    let mut extractor = VideoFeatureExtractor::new(source)
        .context("failed to read the first frames of the sequence")?;

    let mut frames = Vec::new();
    while let Some(features) = extractor
        .step()
        .context("failed to extract features mid-sequence")?
    {
        frames.push(features);
    }

    let dump = FeatureDump {
        fps,
        frame_count: frames.len(),
        frames,
    };
    let json = serde_json::to_string_pretty(&dump).context("failed to serialize features")?;

    match output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "{} {} ({} frames)",
                "Wrote".green().bold(),
                path.display(),
                dump.frame_count
            );
        }
        None => println!("{}", json),
    }
    Ok(ExitCode::SUCCESS)
}
