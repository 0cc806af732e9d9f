//! Stochastic melody sequencer.

use crate::rng::DeterministicRng;
use crate::synth::Synthesizer;
use crate::theory::{pitch_from_degree, Scale};

use super::beats_to_frames;

/// Single-note stochastic melody voice.
///
/// Every step lasts one beat (halved with probability `subdivision_rate`),
/// and sounds a uniformly drawn scale degree unless the rest draw wins.
pub struct MelodyVoice {
    channel: u8,
    base_note: i32,
    scale: Scale,
    /// Transposition in fractional octaves of the scale.
    transposition: f64,
    volume: f64,
    rest_rate: f64,
    subdivision_rate: f64,
    countdown: u64,
    sounding: Option<u8>,
    rng: DeterministicRng,
}

impl MelodyVoice {
    pub fn new(channel: u8, base_note: i32, scale: Scale, seed: u32) -> Self {
        Self {
            channel,
            base_note,
            scale,
            transposition: 0.0,
            volume: 0.5,
            rest_rate: 0.2,
            subdivision_rate: 0.0,
            countdown: 0,
            sounding: None,
            rng: DeterministicRng::new(seed),
        }
    }

    /// Frames remaining until the next scheduled event.
    pub fn countdown(&self) -> u64 {
        self.countdown
    }

    /// The currently sounding pitch, if any.
    pub fn sounding(&self) -> Option<u8> {
        self.sounding
    }

    pub fn set_scale(&mut self, scale: Scale) {
        self.scale = scale;
    }

    pub fn set_transposition(&mut self, octaves: f64) {
        self.transposition = octaves;
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_rest_rate(&mut self, rate: f64) {
        self.rest_rate = rate.clamp(0.0, 1.0);
    }

    pub fn set_subdivision_rate(&mut self, rate: f64) {
        self.subdivision_rate = rate.clamp(0.0, 1.0);
    }

    /// Consume `frames` of rendered audio from the countdown.
    pub(crate) fn advance(&mut self, frames: u64) {
        debug_assert!(frames <= self.countdown);
        self.countdown -= frames;
    }

    /// Fire the step due at countdown zero: stop the previous note, schedule
    /// the next boundary, and (unless resting) start a fresh pitch.
    pub fn next(&mut self, bpm: f64, sample_rate: u32, synth: &mut dyn Synthesizer) {
        if let Some(pitch) = self.sounding.take() {
            synth.note_off(self.channel, pitch);
        }

        let mut duration_beats = 1.0;
        if self.rng.gen_f64() < self.subdivision_rate {
            duration_beats /= 2.0;
        }
        self.countdown = beats_to_frames(duration_beats, bpm, sample_rate);

        let rest_draw = self.rng.gen_f64();
        if rest_draw > self.rest_rate {
            let degree_draw = self.rng.gen_f64();
            let degree =
                ((degree_draw + self.transposition) * self.scale.len() as f64).floor() as i64;
            let pitch = pitch_from_degree(self.scale, self.base_note, degree).clamp(0, 127) as u8;
            let velocity = (self.volume * 127.0).round() as u8;
            synth.note_on(self.channel, pitch, velocity);
            self.sounding = Some(pitch);
        }
    }

    /// Force the next render boundary to fire `next()` immediately.
    pub fn restart(&mut self) {
        self.countdown = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::Synthesizer;

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
    fn next_schedules_one_beat_countdown() {
        let mut voice = MelodyVoice::new(1, 40, Scale::Major, 1);
        let mut synth = EventLog::default();
        voice.next(120.0, 44_100, &mut synth);
        assert_eq!(voice.countdown(), 22_050);
    }

    #[test]
    fn always_resting_voice_stays_silent() {
        let mut voice = MelodyVoice::new(1, 40, Scale::Major, 1);
        voice.set_rest_rate(1.0);
        let mut synth = EventLog::default();
        for _ in 0..20 {
            voice.next(120.0, 44_100, &mut synth);
        }
        assert!(synth.ons.is_empty());
        assert!(voice.sounding().is_none());
    }

    #[test]
    fn sounding_pitch_is_stopped_before_the_next_one() {
        let mut voice = MelodyVoice::new(1, 40, Scale::Major, 2);
        voice.set_rest_rate(0.0);
        let mut synth = EventLog::default();
        for _ in 0..50 {
            voice.next(120.0, 44_100, &mut synth);
        }
        assert_eq!(synth.ons.len(), 50);
        // First step has nothing to stop, every later step stops its
        // predecessor first.
        assert_eq!(synth.offs.len(), 49);
        for (i, &(_, off_pitch)) in synth.offs.iter().enumerate() {
            assert_eq!(off_pitch, synth.ons[i].1);
        }
    }

    #[test]
    fn velocity_follows_volume() {
        let mut voice = MelodyVoice::new(1, 40, Scale::Major, 3);
        voice.set_rest_rate(0.0);
        voice.set_volume(0.5);
        let mut synth = EventLog::default();
        voice.next(120.0, 44_100, &mut synth);
        assert_eq!(synth.ons[0].2, 64);
    }

    #[test]
    fn restart_zeroes_the_countdown() {
        let mut voice = MelodyVoice::new(1, 40, Scale::Major, 4);
        let mut synth = EventLog::default();
        voice.next(120.0, 44_100, &mut synth);
        assert!(voice.countdown() > 0);
        voice.restart();
        assert_eq!(voice.countdown(), 0);
    }

    #[test]
    fn pitches_stay_in_midi_range_under_extreme_transposition() {
        let mut voice = MelodyVoice::new(1, 40, Scale::Major, 5);
        voice.set_rest_rate(0.0);
        voice.set_transposition(20.0);
        let mut synth = EventLog::default();
        for _ in 0..10 {
            voice.next(120.0, 44_100, &mut synth);
        }
        assert!(synth.ons.iter().all(|&(_, p, _)| p <= 127));
    }
}
