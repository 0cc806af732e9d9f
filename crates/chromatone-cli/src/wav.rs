//! WAV output: 16-bit stereo interleaved PCM via hound.

use std::path::Path;

use anyhow::{Context, Result};
use chromatone_core::engine::{FeatureSource, Orchestrator, RunSummary};
use chromatone_core::synth::Synthesizer;

pub fn wav_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Run the engine to completion, streaming every audio block into `path`.
pub fn write_soundtrack<F: FeatureSource, S: Synthesizer>(
    engine: &mut Orchestrator<F, S>,
    sample_rate: u32,
    path: &Path,
) -> Result<RunSummary> {
    let mut writer = hound::WavWriter::create(path, wav_spec(sample_rate))
        .with_context(|| format!("failed to create {}", path.display()))?;

    // The sink closure cannot propagate errors, so the first write failure
    // is parked and surfaced after the run.
    let mut write_error: Option<hound::Error> = None;
    let summary = engine.run(|block| {
        if write_error.is_some() {
            return;
        }
        for &sample in block {
            if let Err(error) = writer.write_sample(sample) {
                write_error = Some(error);
                break;
            }
        }
    })?;

    if let Some(error) = write_error {
        return Err(error).with_context(|| format!("failed to write {}", path.display()));
    }
    writer
        .finalize()
        .with_context(|| format!("failed to finalize {}", path.display()))?;
    Ok(summary)
}
