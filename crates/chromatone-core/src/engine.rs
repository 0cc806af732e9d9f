//! Per-video-frame orchestrator loop.
//!
//! The orchestrator ties the pipeline together: pull one raw feature sample
//! from the source, feed the smoother, re-derive musical settings for
//! whichever control parameters committed, then render exactly one video
//! frame's worth of audio. Audio time advances only through the renderer's
//! sample clock, so the output stays sample-exact regardless of how fast
//! frames are supplied.

use serde::Serialize;
use thiserror::Error;

use crate::mapping::{
    bpm_for_energy, chord_shape_for, chord_transposition, melody_transposition, scale_for_hue,
    timbre_for, BEATS_PER_CHORD, MELODY_REST_RATE, PRESET_PAD_SITAR, TEMPO_HYSTERESIS,
};
use crate::render::SampleRenderer;
use crate::smooth::{Commit, ParameterSmoother, RawFeatures};
use crate::synth::Synthesizer;
use crate::{CHORD_CHANNEL, MELODY_CHANNEL};

/// Error from a feature source while the stream is running.
#[derive(Debug, Error)]
pub enum FeatureSourceError {
    /// A frame could not be decoded mid-stream. Distinct from end-of-stream,
    /// which is the `Ok(None)` return of [`FeatureSource::next_features`].
    #[error("failed to decode frame {frame}: {message}")]
    Decode { frame: u64, message: String },
}

/// Supplier of per-frame visual features.
///
/// Implementations own their input (a decoded video, an image sequence, a
/// synthetic pattern) and surface one [`RawFeatures`] per frame.
pub trait FeatureSource {
    /// Frame rate of the underlying stream.
    fn fps(&self) -> f64;

    /// The next frame's features, `Ok(None)` once the stream ends.
    fn next_features(&mut self) -> Result<Option<RawFeatures>, FeatureSourceError>;
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("source frame rate {0} is not usable")]
    InvalidFps(f64),
    #[error(transparent)]
    Feature(#[from] FeatureSourceError),
}

/// Totals for one completed run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    pub frames: u64,
    pub samples: u64,
    pub seconds: f64,
}

/// Drives a [`FeatureSource`] through smoothing, mapping, and rendering.
pub struct Orchestrator<F: FeatureSource, S: Synthesizer> {
    source: F,
    smoother: ParameterSmoother,
    renderer: SampleRenderer<S>,
    samples_per_frame: u64,
    frames_done: u64,
    block: Vec<i16>,
}

impl<F: FeatureSource, S: Synthesizer> Orchestrator<F, S> {
    /// Build the pipeline and queue the startup instruments.
    pub fn new(source: F, synth: S, sample_rate: u32, seed: u32) -> Result<Self, EngineError> {
        let fps = source.fps();
        if !fps.is_finite() || fps <= 0.0 {
            return Err(EngineError::InvalidFps(fps));
        }
        let samples_per_frame = ((sample_rate as f64 / fps).round() as u64).max(1);

        let mut renderer = SampleRenderer::new(synth, sample_rate, seed);
        let preset = PRESET_PAD_SITAR;
        renderer.request_program(CHORD_CHANNEL, preset.chord_bank, preset.chord_program);
        renderer.request_program(MELODY_CHANNEL, preset.melody_bank, preset.melody_program);
        renderer.chord_mut().set_volume(preset.chord_volume);
        renderer.chord_mut().set_arpeggio_freq(preset.arpeggio_freq);
        renderer.melody_mut().set_volume(preset.melody_volume);

        Ok(Self {
            source,
            smoother: ParameterSmoother::new(sample_rate),
            renderer,
            samples_per_frame,
            frames_done: 0,
            block: Vec::new(),
        })
    }

    pub fn bpm(&self) -> f64 {
        self.renderer.bpm()
    }

    /// Audio frames covered by one video frame.
    pub fn samples_per_frame(&self) -> u64 {
        self.samples_per_frame
    }

    /// Total samples rendered so far.
    pub fn samples_done(&self) -> u64 {
        self.renderer.clock()
    }

    pub fn synth(&self) -> &S {
        self.renderer.synth()
    }

    /// Advance by one video frame, returning its rendered audio block.
    ///
    /// `Ok(None)` means the source is exhausted; a mid-stream decode failure
    /// halts the run with an error instead.
    pub fn next_block(&mut self) -> Result<Option<&[i16]>, EngineError> {
        let raw = match self.source.next_features()? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        self.smoother.push(raw);
        if let Some(commit) = self.smoother.maybe_commit(self.renderer.clock()) {
            if commit.any() {
                self.apply(commit);
            }
        }

        self.block.clear();
        self.renderer.render_up_to(self.samples_per_frame, &mut self.block);
        self.frames_done += 1;
        Ok(Some(&self.block))
    }

    /// Run the whole stream, handing each audio block to `sink`.
    pub fn run(&mut self, mut sink: impl FnMut(&[i16])) -> Result<RunSummary, EngineError> {
        while let Some(block) = self.next_block()? {
            sink(block);
        }
        Ok(RunSummary {
            frames: self.frames_done,
            samples: self.renderer.clock(),
            seconds: self.renderer.clock() as f64 / self.renderer.sample_rate() as f64,
        })
    }

    /// Re-derive musical settings from the parameters a commit changed.
    ///
    /// Settings are only touched when a source parameter moved, except the
    /// chord cycle length, which is re-asserted on every commit.
    fn apply(&mut self, commit: Commit) {
        // A commit with changes implies every parameter has committed once.
        let params = match self.smoother.current() {
            Some(params) => params,
            None => return,
        };

        if let Some(energy) = commit.energy {
            let bpm = bpm_for_energy(energy);
            if (bpm - self.renderer.bpm()).abs() > TEMPO_HYSTERESIS * self.renderer.bpm() {
                self.renderer.set_bpm(bpm);
            }
        }

        if let Some(value) = commit.value {
            self.renderer
                .melody_mut()
                .set_transposition(melody_transposition(value));
            self.renderer
                .chord_mut()
                .set_transposition(chord_transposition(value));
        }

        if commit.saturation.is_some() || commit.energy.is_some() || commit.value.is_some() {
            self.renderer.melody_mut().set_rest_rate(MELODY_REST_RATE);
        }

        if let Some(hue) = commit.hue {
            self.renderer.set_scale(scale_for_hue(hue));
        }

        if commit.saturation.is_some() || commit.energy.is_some() {
            self.renderer
                .chord_mut()
                .set_shape(chord_shape_for(params.saturation, params.energy));
        }

        self.renderer.chord_mut().set_beats_per_chord(BEATS_PER_CHORD);

        if commit.value.is_some() || commit.energy.is_some() {
            if let Some(preset) = timbre_for(params.value, params.energy) {
                self.renderer.request_program(
                    CHORD_CHANNEL,
                    preset.chord_bank,
                    preset.chord_program,
                );
                self.renderer.request_program(
                    MELODY_CHANNEL,
                    preset.melody_bank,
                    preset.melody_program,
                );
                self.renderer
                    .chord_mut()
                    .set_arpeggio_freq(preset.arpeggio_freq);
                self.renderer.chord_mut().set_volume(preset.chord_volume);
                self.renderer.melody_mut().set_volume(preset.melody_volume);
            }
        }
    }
}
