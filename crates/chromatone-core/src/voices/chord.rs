//! Stochastic chord sequencer with optional arpeggiation.

use std::collections::VecDeque;

use crate::rng::DeterministicRng;
use crate::synth::Synthesizer;
use crate::theory::{chord_pitches, ChordShape, Scale};

use super::beats_to_frames;

/// Chord voice: every cycle picks a random root degree and either sounds the
/// whole chord shape at once or walks it as an arpeggio.
///
/// With `arpeggio_freq = n > 0`, a cycle queues `n` passes over the shape and
/// each `next()` pops one pitch; the cycle's duration is divided evenly over
/// the queue so the full arpeggio spans exactly `beats_per_chord`.
pub struct ChordVoice {
    channel: u8,
    base_note: i32,
    scale: Scale,
    shape: ChordShape,
    /// Transposition in fractional octaves; converted to whole scale degrees
    /// when an arpeggio queue is built.
    transposition: f64,
    volume: f64,
    arpeggio_freq: u32,
    beats_per_chord: f64,
    countdown: u64,
    sounding: Vec<u8>,
    arpeggio_queue: VecDeque<u8>,
    per_note_frames: u64,
    rng: DeterministicRng,
}

impl ChordVoice {
    pub fn new(channel: u8, base_note: i32, scale: Scale, seed: u32) -> Self {
        Self {
            channel,
            base_note,
            scale,
            shape: ChordShape::Triad,
            transposition: 0.0,
            volume: 0.5,
            arpeggio_freq: 0,
            beats_per_chord: 4.0,
            countdown: 0,
            sounding: Vec::new(),
            arpeggio_queue: VecDeque::new(),
            per_note_frames: 0,
            rng: DeterministicRng::new(seed),
        }
    }

    /// Frames remaining until the next scheduled event.
    pub fn countdown(&self) -> u64 {
        self.countdown
    }

    /// Currently sounding pitches (empty between cycles only after restart).
    pub fn sounding(&self) -> &[u8] {
        &self.sounding
    }

    /// Remaining queued arpeggio pitches.
    pub fn arpeggio_pending(&self) -> usize {
        self.arpeggio_queue.len()
    }

    pub fn set_scale(&mut self, scale: Scale) {
        self.scale = scale;
    }

    pub fn set_shape(&mut self, shape: ChordShape) {
        self.shape = shape;
    }

    pub fn set_transposition(&mut self, octaves: f64) {
        self.transposition = octaves;
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_arpeggio_freq(&mut self, freq: u32) {
        self.arpeggio_freq = freq;
    }

    pub fn set_beats_per_chord(&mut self, beats: f64) {
        self.beats_per_chord = beats;
    }

    /// Consume `frames` of rendered audio from the countdown.
    pub(crate) fn advance(&mut self, frames: u64) {
        debug_assert!(frames <= self.countdown);
        self.countdown -= frames;
    }

    /// Fire the event due at countdown zero.
    ///
    /// Stops everything sounding, then either pops the next arpeggio pitch
    /// (building a fresh queue first when one is needed) or triggers the
    /// whole chord shape at once.
    pub fn next(&mut self, bpm: f64, sample_rate: u32, synth: &mut dyn Synthesizer) {
        for &pitch in &self.sounding {
            synth.note_off(self.channel, pitch);
        }
        self.sounding.clear();

        let scale_len = self.scale.len();
        let mode = (self.rng.gen_f64() * scale_len as f64).floor() as i64;
        let velocity = (self.volume * 127.0).round() as u8;
        let chord_frames = beats_to_frames(self.beats_per_chord, bpm, sample_rate);

        if self.arpeggio_freq > 0 && self.arpeggio_queue.is_empty() {
            let queue_len = (self.shape.len() as u64) * self.arpeggio_freq as u64;
            self.per_note_frames = (chord_frames / queue_len).max(1);
            let steps = (self.transposition * scale_len as f64).round() as i64;
            let pitches = chord_pitches(self.scale, self.base_note, mode, self.shape, steps);
            for _ in 0..self.arpeggio_freq {
                for &pitch in &pitches {
                    self.arpeggio_queue.push_back(pitch.clamp(0, 127) as u8);
                }
            }
        }

        if let Some(pitch) = self.arpeggio_queue.pop_front() {
            synth.note_on(self.channel, pitch, velocity);
            self.sounding.push(pitch);
            self.countdown = self.per_note_frames;
        }

        if self.arpeggio_freq == 0 && self.arpeggio_queue.is_empty() {
            self.countdown = chord_frames;
            for pitch in chord_pitches(self.scale, self.base_note, mode, self.shape, 0) {
                let pitch = pitch.clamp(0, 127) as u8;
                synth.note_on(self.channel, pitch, velocity);
                self.sounding.push(pitch);
            }
        }
    }

    /// Abort the current cycle: release every pitch, drop the arpeggio
    /// queue, and force the next render boundary to fire `next()`.
    pub fn restart(&mut self, synth: &mut dyn Synthesizer) {
        for &pitch in &self.sounding {
            synth.note_off(self.channel, pitch);
        }
        self.sounding.clear();
        self.arpeggio_queue.clear();
        self.per_note_frames = 0;
        self.countdown = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct EventLog {
        ons: Vec<(u8, u8, u8)>,
        offs: Vec<(u8, u8)>,
    }

    impl Synthesizer for EventLog {
        fn note_on(&mut self, channel: u8, pitch: u8, velocity: u8) {
            self.ons.push((channel, pitch, velocity));
        }
        fn note_off(&mut self, channel: u8, pitch: u8) {
            self.offs.push((channel, pitch));
        }
        fn select_program(&mut self, _channel: u8, _bank: u16, _program: u8) {}
        fn render(&mut self, out: &mut [i16]) {
            out.fill(0);
        }
    }

    #[test]
    fn block_chord_sounds_full_shape_for_the_whole_cycle() {
        let mut voice = ChordVoice::new(0, 40, Scale::Major, 1);
        let mut synth = EventLog::default();
        voice.next(120.0, 44_100, &mut synth);

        assert_eq!(synth.ons.len(), ChordShape::Triad.len());
        assert_eq!(voice.sounding().len(), ChordShape::Triad.len());
        // Four beats at 120 bpm.
        assert_eq!(voice.countdown(), 88_200);
    }

    #[test]
    fn arpeggio_queue_holds_shape_len_times_freq_entries() {
        let mut voice = ChordVoice::new(0, 40, Scale::Major, 2);
        voice.set_arpeggio_freq(4);
        let mut synth = EventLog::default();
        voice.next(120.0, 44_100, &mut synth);

        let expected = ChordShape::Triad.len() * 4;
        // One entry was popped and sounded by the call that built the queue.
        assert_eq!(voice.arpeggio_pending(), expected - 1);
        assert_eq!(voice.sounding().len(), 1);
        assert_eq!(voice.countdown(), 88_200 / expected as u64);
    }

    #[test]
    fn arpeggio_queue_drains_then_a_new_cycle_begins() {
        let mut voice = ChordVoice::new(0, 40, Scale::Major, 3);
        voice.set_arpeggio_freq(2);
        let mut synth = EventLog::default();

        let queue_len = ChordShape::Triad.len() * 2;
        for _ in 0..queue_len {
            voice.next(120.0, 44_100, &mut synth);
        }
        assert_eq!(voice.arpeggio_pending(), 0);

        // The next call rebuilds a full queue and pops its first entry.
        voice.next(120.0, 44_100, &mut synth);
        assert_eq!(voice.arpeggio_pending(), queue_len - 1);
    }

    #[test]
    fn every_note_on_is_preceded_by_a_matching_note_off() {
        let mut voice = ChordVoice::new(0, 40, Scale::Major, 4);
        voice.set_arpeggio_freq(3);
        let mut synth = EventLog::default();

        let mut active: Vec<u8> = Vec::new();
        for _ in 0..100 {
            voice.next(120.0, 44_100, &mut synth);
            for &(_, pitch) in &synth.offs {
                if let Some(pos) = active.iter().position(|&p| p == pitch) {
                    active.remove(pos);
                }
            }
            for &(_, pitch, _) in &synth.ons {
                assert!(
                    !active.contains(&pitch),
                    "pitch {} retriggered while sounding",
                    pitch
                );
                active.push(pitch);
            }
            synth.ons.clear();
            synth.offs.clear();
        }
    }

    #[test]
    fn restart_releases_everything_and_clears_the_queue() {
        let mut voice = ChordVoice::new(0, 40, Scale::Major, 5);
        voice.set_arpeggio_freq(4);
        let mut synth = EventLog::default();
        voice.next(120.0, 44_100, &mut synth);
        assert!(voice.arpeggio_pending() > 0);

        voice.restart(&mut synth);
        assert!(voice.sounding().is_empty());
        assert_eq!(voice.arpeggio_pending(), 0);
        assert_eq!(voice.countdown(), 0);
        assert_eq!(synth.offs.len(), 1);
    }

    #[test]
    fn power_shape_spans_an_octave_and_a_fifth() {
        let mut voice = ChordVoice::new(0, 40, Scale::Major, 6);
        voice.set_shape(ChordShape::Power);
        let mut synth = EventLog::default();
        voice.next(120.0, 44_100, &mut synth);
        let pitches: Vec<u8> = synth.ons.iter().map(|&(_, p, _)| p).collect();
        assert_eq!(pitches.len(), 4);
        // Shape degrees [1,5,8,12] keep fixed relative spacing.
        assert_eq!(pitches[2] - pitches[0], 12);
    }
}
