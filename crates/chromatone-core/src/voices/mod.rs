//! Melody and chord sequencers.
//!
//! Each voice is a small state machine over a countdown measured in audio
//! frames: while the countdown is positive the voice is idle; when it reaches
//! zero the renderer fires `next()`, which emits note events and schedules
//! the following one. All scheduling is expressed in samples, never
//! wall-clock time.

mod chord;
mod melody;

pub use chord::ChordVoice;
pub use melody::MelodyVoice;

/// Convert a musical duration in beats to a frame count at the given tempo.
///
/// Truncates, but never returns zero: a zero-length countdown would
/// retrigger the voice without any audio elapsing in between.
pub(crate) fn beats_to_frames(beats: f64, bpm: f64, sample_rate: u32) -> u64 {
    let seconds = beats * 60.0 / bpm;
    ((seconds * sample_rate as f64) as u64).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_beat_at_120_bpm_is_half_a_second() {
        assert_eq!(beats_to_frames(1.0, 120.0, 44_100), 22_050);
    }

    #[test]
    fn countdown_never_zero() {
        assert_eq!(beats_to_frames(0.0000001, 10_000.0, 8_000), 1);
    }
}
