//! Sample-exact renderer driving both voices and the synthesizer.
//!
//! The renderer owns the monotonic sample clock and advances audio in
//! batches bounded by the nearest voice countdown, so every note event lands
//! on an exact sample index. Externally requested tempo and instrument
//! changes are held pending and consumed only when a voice boundary is
//! reached, never mid-note.

use crate::rng::DeterministicRng;
use crate::synth::Synthesizer;
use crate::theory::Scale;
use crate::voices::{ChordVoice, MelodyVoice};
use crate::{BASE_MIDI_NOTE, CHORD_CHANNEL, MELODY_CHANNEL};

/// Renderer over one melody voice, one chord voice, and a synthesizer.
pub struct SampleRenderer<S: Synthesizer> {
    synth: S,
    melody: MelodyVoice,
    chord: ChordVoice,
    bpm: f64,
    sample_rate: u32,
    /// Total frames rendered so far; the sole time authority.
    clock: u64,
    restart_pending: bool,
    /// Per-channel program selections awaiting the next voice boundary.
    pending_programs: Vec<(u8, u16, u8)>,
}

impl<S: Synthesizer> SampleRenderer<S> {
    pub fn new(synth: S, sample_rate: u32, seed: u32) -> Self {
        let melody_seed = DeterministicRng::derive_voice_seed(seed, MELODY_CHANNEL as u32);
        let chord_seed = DeterministicRng::derive_voice_seed(seed, CHORD_CHANNEL as u32);
        Self {
            synth,
            melody: MelodyVoice::new(MELODY_CHANNEL, BASE_MIDI_NOTE, Scale::Major, melody_seed),
            chord: ChordVoice::new(CHORD_CHANNEL, BASE_MIDI_NOTE, Scale::Major, chord_seed),
            bpm: 120.0,
            sample_rate,
            clock: 0,
            restart_pending: false,
            pending_programs: Vec::new(),
        }
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total frames rendered since construction.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn melody(&self) -> &MelodyVoice {
        &self.melody
    }

    pub fn melody_mut(&mut self) -> &mut MelodyVoice {
        &mut self.melody
    }

    pub fn chord(&self) -> &ChordVoice {
        &self.chord
    }

    pub fn chord_mut(&mut self) -> &mut ChordVoice {
        &mut self.chord
    }

    pub fn synth(&self) -> &S {
        &self.synth
    }

    /// Switch both voices to `scale`; takes effect from their next events.
    pub fn set_scale(&mut self, scale: Scale) {
        self.melody.set_scale(scale);
        self.chord.set_scale(scale);
    }

    /// Change the tempo and request a resynchronizing restart.
    pub fn set_bpm(&mut self, bpm: f64) {
        self.bpm = bpm;
        self.restart_pending = true;
    }

    /// Queue an instrument selection for `channel`; applied with a restart at
    /// the next voice boundary. A newer request for the same channel replaces
    /// an older pending one.
    pub fn request_program(&mut self, channel: u8, bank: u16, program: u8) {
        self.pending_programs.retain(|&(ch, _, _)| ch != channel);
        self.pending_programs.push((channel, bank, program));
        self.restart_pending = true;
    }

    /// Produce exactly `frames` stereo frames, appending interleaved samples
    /// to `out`.
    ///
    /// Events fire only at countdown-zero boundaries and the renderer never
    /// consumes past the nearest pending boundary in a single batch.
    pub fn render_up_to(&mut self, frames: u64, out: &mut Vec<i16>) {
        let mut done = 0u64;
        while done < frames {
            if self.melody.countdown() == 0 || self.chord.countdown() == 0 {
                self.consume_pending();
                if self.melody.countdown() == 0 {
                    self.melody.next(self.bpm, self.sample_rate, &mut self.synth);
                }
                if self.chord.countdown() == 0 {
                    self.chord.next(self.bpm, self.sample_rate, &mut self.synth);
                }
            }

            let boundary = self.melody.countdown().min(self.chord.countdown());
            let batch = boundary.min(frames - done);

            let start = out.len();
            out.resize(start + batch as usize * 2, 0);
            self.synth.render(&mut out[start..]);

            self.melody.advance(batch);
            self.chord.advance(batch);
            self.clock += batch;
            done += batch;
        }
    }

    /// Consume a pending restart and any queued program selections. Only
    /// called when a voice boundary has been reached.
    fn consume_pending(&mut self) {
        if !self.restart_pending {
            return;
        }
        self.restart_pending = false;
        self.melody.restart();
        self.chord.restart(&mut self.synth);
        for (channel, bank, program) in self.pending_programs.drain(..) {
            self.synth.select_program(channel, bank, program);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::Synthesizer;

    /// Records events with the sample clock position they were emitted at.
    #[derive(Default)]
    struct TimedLog {
        rendered: u64,
        ons: Vec<(u64, u8, u8)>,
        offs: Vec<(u64, u8, u8)>,
        programs: Vec<(u64, u8, u16, u8)>,
    }

    impl Synthesizer for TimedLog {
        fn note_on(&mut self, channel: u8, pitch: u8, _velocity: u8) {
            self.ons.push((self.rendered, channel, pitch));
        }
        fn note_off(&mut self, channel: u8, pitch: u8) {
            self.offs.push((self.rendered, channel, pitch));
        }
        fn select_program(&mut self, channel: u8, bank: u16, program: u8) {
            self.programs.push((self.rendered, channel, bank, program));
        }
        fn render(&mut self, out: &mut [i16]) {
            out.fill(0);
            self.rendered += out.len() as u64 / 2;
        }
    }

    fn renderer() -> SampleRenderer<TimedLog> {
        SampleRenderer::new(TimedLog::default(), 44_100, 42)
    }

    #[test]
    fn returns_exactly_the_requested_frames() {
        let mut r = renderer();
        let mut out = Vec::new();
        r.render_up_to(10_000, &mut out);
        assert_eq!(out.len(), 20_000);
        assert_eq!(r.clock(), 10_000);

        r.render_up_to(12_345, &mut out);
        assert_eq!(out.len(), 2 * (10_000 + 12_345));
        assert_eq!(r.clock(), 22_345);
    }

    #[test]
    fn countdowns_stay_non_negative_and_bounded_by_boundaries() {
        let mut r = renderer();
        let mut out = Vec::new();
        for _ in 0..200 {
            r.render_up_to(1_470, &mut out);
            // advance() would have underflowed if a batch crossed a boundary.
            let _ = r.melody().countdown();
            let _ = r.chord().countdown();
        }
        assert_eq!(r.clock(), 200 * 1_470);
    }

    #[test]
    fn note_events_land_on_exact_beat_boundaries() {
        let mut r = renderer();
        let mut out = Vec::new();
        r.render_up_to(44_100 * 4, &mut out);

        let beat = 22_050; // one beat at 120 bpm
        let log = r.synth();
        for &(at, channel, _) in &log.ons {
            if channel == MELODY_CHANNEL {
                assert_eq!(at % beat, 0, "melody event off-grid at {}", at);
            }
        }
    }

    #[test]
    fn bpm_change_applies_at_a_boundary_with_a_restart() {
        let mut r = renderer();
        let mut out = Vec::new();
        // Render a partial beat so both voices are mid-countdown.
        r.render_up_to(10_000, &mut out);
        r.set_bpm(180.0);
        assert!(r.melody().countdown() > 0);

        // The pending restart is not consumed until a voice boundary.
        r.render_up_to(5_000, &mut out);
        assert_eq!(r.bpm(), 180.0);

        // After the first boundary the melody countdown follows the new bpm.
        r.render_up_to(22_050, &mut out);
        let beat_180 = (60.0 / 180.0 * 44_100.0) as u64;
        assert!(r.melody().countdown() <= beat_180);
    }

    #[test]
    fn program_changes_are_deferred_to_a_boundary() {
        let mut r = renderer();
        let mut out = Vec::new();
        r.render_up_to(1_000, &mut out);

        r.request_program(0, 17, 89);
        r.request_program(1, 0, 104);
        assert!(r.synth().programs.is_empty());

        // Boundary at 22_050 consumes the pending selections.
        r.render_up_to(44_100, &mut out);
        let programs = &r.synth().programs;
        assert_eq!(programs.len(), 2);
        assert!(programs.iter().all(|&(at, _, _, _)| at % 22_050 == 0));
    }

    #[test]
    fn newer_program_request_replaces_pending_one_for_same_channel() {
        let mut r = renderer();
        r.request_program(0, 0, 1);
        r.request_program(0, 2, 92);
        let mut out = Vec::new();
        r.render_up_to(30_000, &mut out);
        let programs = &r.synth().programs;
        assert_eq!(programs.len(), 1);
        assert_eq!((programs[0].2, programs[0].3), (2, 92));
    }

    #[test]
    fn identical_seeds_render_identical_event_streams() {
        let run = || {
            let mut r = renderer();
            let mut out = Vec::new();
            r.render_up_to(44_100 * 2, &mut out);
            (r.synth().ons.clone(), r.synth().offs.clone())
        };
        assert_eq!(run(), run());
    }
}
