//! Built-in deterministic tone synthesizer.
//!
//! A minimal polyphonic synth for tests and offline demos: each note is a
//! single waveform chosen by the channel's program, with short linear
//! attack/release ramps so note boundaries stay click-free. Output is
//! identical across runs for the same event sequence.

use std::f64::consts::PI;

use super::Synthesizer;

/// Number of addressable channels.
const NUM_CHANNELS: usize = 16;

/// Upper bound on simultaneously sounding notes.
const MAX_VOICES: usize = 32;

/// Attack ramp length in seconds.
const ATTACK_SECS: f64 = 0.004;

/// Release ramp length in seconds.
const RELEASE_SECS: f64 = 0.012;

/// Per-note amplitude headroom so chords do not clip.
const NOTE_GAIN: f64 = 0.22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Waveform {
    Sine,
    Triangle,
    Pulse,
    Sawtooth,
}

impl Waveform {
    /// Map a bank/program pair onto one of the basic waveforms.
    fn for_program(bank: u16, program: u8) -> Self {
        match (bank as u32 + program as u32) % 4 {
            0 => Waveform::Sine,
            1 => Waveform::Triangle,
            2 => Waveform::Pulse,
            _ => Waveform::Sawtooth,
        }
    }

    /// Evaluate the waveform at phase `t` in [0, 1).
    fn sample(&self, t: f64) -> f64 {
        match self {
            Waveform::Sine => (2.0 * PI * t).sin(),
            Waveform::Triangle => {
                if t < 0.5 {
                    4.0 * t - 1.0
                } else {
                    3.0 - 4.0 * t
                }
            }
            Waveform::Pulse => {
                if t < 0.5 {
                    0.8
                } else {
                    -0.8
                }
            }
            Waveform::Sawtooth => 2.0 * t - 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VoiceStage {
    Attack,
    Held,
    Release,
}

struct ToneVoice {
    channel: u8,
    pitch: u8,
    waveform: Waveform,
    phase: f64,
    phase_step: f64,
    amplitude: f64,
    stage: VoiceStage,
    /// Envelope level in [0, 1], ramped linearly per stage.
    level: f64,
}

impl ToneVoice {
    fn next_sample(&mut self, attack_step: f64, release_step: f64) -> f64 {
        match self.stage {
            VoiceStage::Attack => {
                self.level += attack_step;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = VoiceStage::Held;
                }
            }
            VoiceStage::Held => {}
            VoiceStage::Release => {
                self.level -= release_step;
                if self.level < 0.0 {
                    self.level = 0.0;
                }
            }
        }

        let value = self.waveform.sample(self.phase) * self.amplitude * self.level;
        self.phase += self.phase_step;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        value
    }

    fn finished(&self) -> bool {
        self.stage == VoiceStage::Release && self.level <= 0.0
    }
}

/// Deterministic polyphonic tone synthesizer.
pub struct ToneSynth {
    sample_rate: u32,
    programs: [(u16, u8); NUM_CHANNELS],
    voices: Vec<ToneVoice>,
    attack_step: f64,
    release_step: f64,
}

impl ToneSynth {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            programs: [(0, 0); NUM_CHANNELS],
            voices: Vec::with_capacity(MAX_VOICES),
            attack_step: 1.0 / (ATTACK_SECS * sample_rate as f64).max(1.0),
            release_step: 1.0 / (RELEASE_SECS * sample_rate as f64).max(1.0),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of currently sounding notes (including releasing tails).
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    fn midi_to_freq(pitch: u8) -> f64 {
        440.0 * 2.0_f64.powf((pitch as f64 - 69.0) / 12.0)
    }
}

impl Synthesizer for ToneSynth {
    fn note_on(&mut self, channel: u8, pitch: u8, velocity: u8) {
        if self.voices.len() >= MAX_VOICES {
            // Drop the oldest voice rather than exceeding the cap.
            self.voices.remove(0);
        }
        let (bank, program) = self.programs[channel as usize % NUM_CHANNELS];
        let freq = Self::midi_to_freq(pitch);
        self.voices.push(ToneVoice {
            channel,
            pitch,
            waveform: Waveform::for_program(bank, program),
            phase: 0.0,
            phase_step: freq / self.sample_rate as f64,
            amplitude: velocity as f64 / 127.0 * NOTE_GAIN,
            stage: VoiceStage::Attack,
            level: 0.0,
        });
    }

    fn note_off(&mut self, channel: u8, pitch: u8) {
        for voice in &mut self.voices {
            if voice.channel == channel && voice.pitch == pitch && voice.stage != VoiceStage::Release
            {
                voice.stage = VoiceStage::Release;
            }
        }
    }

    fn select_program(&mut self, channel: u8, bank: u16, program: u8) {
        self.programs[channel as usize % NUM_CHANNELS] = (bank, program);
    }

    fn render(&mut self, out: &mut [i16]) {
        debug_assert!(out.len() % 2 == 0, "stereo output requires even length");
        let attack_step = self.attack_step;
        let release_step = self.release_step;

        for frame in out.chunks_exact_mut(2) {
            let mut mix = 0.0;
            for voice in &mut self.voices {
                mix += voice.next_sample(attack_step, release_step);
            }
            let sample = (mix.clamp(-1.0, 1.0) * 32767.0) as i16;
            frame[0] = sample;
            frame[1] = sample;
        }

        self.voices.retain(|v| !v.finished());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_frames(synth: &mut ToneSynth, frames: usize) -> Vec<i16> {
        let mut out = vec![0i16; frames * 2];
        synth.render(&mut out);
        out
    }

    #[test]
    fn silence_when_no_notes() {
        let mut synth = ToneSynth::new(44_100);
        let out = render_frames(&mut synth, 256);
        assert!(out.iter().all(|&s| s == 0));
    }

    #[test]
    fn note_on_produces_audio_and_note_off_decays() {
        let mut synth = ToneSynth::new(44_100);
        synth.note_on(0, 60, 100);
        let out = render_frames(&mut synth, 2048);
        assert!(out.iter().any(|&s| s != 0));

        synth.note_off(0, 60);
        // Render past the release tail; the voice must retire to silence.
        let _ = render_frames(&mut synth, 4096);
        assert_eq!(synth.active_voices(), 0);
        let tail = render_frames(&mut synth, 256);
        assert!(tail.iter().all(|&s| s == 0));
    }

    #[test]
    fn output_is_deterministic() {
        let run = |seed_pitch: u8| {
            let mut synth = ToneSynth::new(44_100);
            synth.select_program(1, 0, 104);
            synth.note_on(1, seed_pitch, 90);
            let mut out = vec![0i16; 1024];
            synth.render(&mut out);
            out
        };
        assert_eq!(run(64), run(64));
    }

    #[test]
    fn program_selects_waveform_family() {
        assert_eq!(Waveform::for_program(0, 0), Waveform::Sine);
        assert_eq!(Waveform::for_program(0, 1), Waveform::Triangle);
        assert_eq!(Waveform::for_program(2, 0), Waveform::Pulse);
        assert_eq!(Waveform::for_program(0, 3), Waveform::Sawtooth);
    }

    #[test]
    fn stereo_frames_are_duplicated() {
        let mut synth = ToneSynth::new(44_100);
        synth.note_on(0, 69, 127);
        let out = render_frames(&mut synth, 128);
        for frame in out.chunks_exact(2) {
            assert_eq!(frame[0], frame[1]);
        }
    }
}
