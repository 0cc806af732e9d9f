//! The note-level synthesizer interface consumed by the renderer.
//!
//! A production-grade backing synthesizer (a soundfont engine, say) lives
//! outside this crate; the engine only needs note on/off, program selection,
//! and a pull of interleaved PCM. [`ToneSynth`] is a small
//! deterministic implementation used by tests and the CLI demo.

mod tone;

pub use tone::ToneSynth;

/// A note-level synthesizer the renderer pulls PCM from.
///
/// `render` fills `out` with interleaved 16-bit stereo frames, so
/// `out.len()` must be an even number; `out.len() / 2` frames are produced.
/// Implementations must be deterministic for the engine's reproducibility
/// guarantee to hold.
pub trait Synthesizer {
    /// Start sounding `pitch` on `channel` at `velocity` (0-127).
    fn note_on(&mut self, channel: u8, pitch: u8, velocity: u8);

    /// Stop sounding `pitch` on `channel`.
    fn note_off(&mut self, channel: u8, pitch: u8);

    /// Select the instrument `bank`/`program` for `channel`.
    ///
    /// Only called between render calls, at voice event boundaries.
    fn select_program(&mut self, channel: u8, bank: u16, program: u8);

    /// Fill `out` with the next interleaved stereo frames.
    fn render(&mut self, out: &mut [i16]);
}
