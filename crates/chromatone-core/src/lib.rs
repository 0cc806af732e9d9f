//! Chromatone Core - Video-Reactive Ambient Music Engine
//!
//! This crate turns a stream of per-frame visual features (motion energy and
//! HSV color statistics) into a continuous, sample-accurate PCM soundtrack.
//! Raw features are smoothed into stable control parameters, mapped to
//! musical settings (tempo, key, harmony, timbre, density), and rendered by
//! two stochastic voices driven in sample-exact time.
//!
//! # Determinism
//!
//! Rendering is fully deterministic. Given the same feature stream, seed, and
//! synthesizer, the output PCM is byte-identical. This is achieved through:
//!
//! - PCG32 random number generators (per-voice seeds derived via BLAKE3)
//! - A monotonic sample clock as the sole time authority (no wall-clock)
//! - Single-threaded rendering with every note event landing on an exact
//!   sample index
//!
//! # Module Structure
//!
//! - [`theory`]: scale/chord tables and pitch math
//! - [`rng`]: seeded RNG wrapper and voice-seed derivation
//! - [`synth`]: the consumed `Synthesizer` interface and a built-in tone synth
//! - [`voices`]: melody and chord sequencers (countdown state machines)
//! - [`render`]: the sample-exact renderer driving voices and synth
//! - [`smooth`]: ring-buffer smoothing of raw visual features
//! - [`mapping`]: the visual-parameter to musical-setting table
//! - [`engine`]: the per-video-frame orchestrator loop

pub mod engine;
pub mod mapping;
pub mod render;
pub mod rng;
pub mod smooth;
pub mod synth;
pub mod theory;
pub mod voices;

pub use engine::{FeatureSource, FeatureSourceError, EngineError, Orchestrator, RunSummary};
pub use smooth::{ControlParameters, ParameterSmoother, RawFeatures};
pub use synth::{Synthesizer, ToneSynth};

/// Default output sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// MIDI note every scale degree is measured from (E2).
pub const BASE_MIDI_NOTE: i32 = 40;

/// Synthesizer channel carrying the chord voice.
pub const CHORD_CHANNEL: u8 = 0;

/// Synthesizer channel carrying the melody voice.
pub const MELODY_CHANNEL: u8 = 1;

/// Crate version for identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
