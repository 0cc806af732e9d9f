//! End-to-end pipeline tests: scripted feature streams through smoothing,
//! mapping, and rendering down to PCM.

use chromatone_core::engine::{FeatureSource, FeatureSourceError, Orchestrator};
use chromatone_core::smooth::RawFeatures;
use chromatone_core::synth::{Synthesizer, ToneSynth};
use chromatone_core::{DEFAULT_SAMPLE_RATE, CHORD_CHANNEL, MELODY_CHANNEL};

/// 150 frames at 30 fps with motion energy ramping from calm to frantic.
struct RampSource {
    frame: usize,
    frames: usize,
}

impl RampSource {
    fn new(frames: usize) -> Self {
        Self { frame: 0, frames }
    }
}

impl FeatureSource for RampSource {
    fn fps(&self) -> f64 {
        30.0
    }

    fn next_features(&mut self) -> Result<Option<RawFeatures>, FeatureSourceError> {
        if self.frame >= self.frames {
            return Ok(None);
        }
        let t = self.frame as f64 / (self.frames - 1) as f64;
        self.frame += 1;
        Ok(Some(RawFeatures {
            energy: t,
            hue: 0.4,
            saturation: 0.6,
            value: 0.5,
        }))
    }
}

/// Synthesizer recording note events; audio is silence.
#[derive(Default)]
struct RecordingSynth {
    events: Vec<Event>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Event {
    On(u8, u8),
    Off(u8, u8),
}

impl Synthesizer for RecordingSynth {
    fn note_on(&mut self, channel: u8, pitch: u8, _velocity: u8) {
        self.events.push(Event::On(channel, pitch));
    }
    fn note_off(&mut self, channel: u8, pitch: u8) {
        self.events.push(Event::Off(channel, pitch));
    }
    fn select_program(&mut self, _channel: u8, _bank: u16, _program: u8) {}
    fn render(&mut self, out: &mut [i16]) {
        out.fill(0);
    }
}

#[test]
fn five_second_ramp_renders_exactly_five_seconds() {
    let source = RampSource::new(150);
    let mut engine =
        Orchestrator::new(source, RecordingSynth::default(), DEFAULT_SAMPLE_RATE, 11).unwrap();
    let mut samples = 0u64;
    let summary = engine.run(|block| samples += block.len() as u64 / 2).unwrap();
    assert_eq!(summary.frames, 150);
    assert_eq!(summary.samples, 5 * DEFAULT_SAMPLE_RATE as u64);
    assert_eq!(samples, summary.samples);
}

#[test]
fn rising_energy_never_lowers_the_tempo() {
    let source = RampSource::new(150);
    let mut engine =
        Orchestrator::new(source, RecordingSynth::default(), DEFAULT_SAMPLE_RATE, 11).unwrap();
    let mut last_bpm = engine.bpm();
    while engine.next_block().unwrap().is_some() {
        let bpm = engine.bpm();
        assert!(
            bpm >= last_bpm,
            "tempo fell from {} to {} on a rising ramp",
            last_bpm,
            bpm
        );
        last_bpm = bpm;
    }
    assert!(last_bpm > 120.0, "ramp never moved the tempo");
}

#[test]
fn note_events_pair_up_per_channel() {
    let source = RampSource::new(150);
    let mut engine =
        Orchestrator::new(source, RecordingSynth::default(), DEFAULT_SAMPLE_RATE, 23).unwrap();
    engine.run(|_| {}).unwrap();

    for channel in [CHORD_CHANNEL, MELODY_CHANNEL] {
        let mut sounding: Vec<u8> = Vec::new();
        for event in engine.synth().events.iter() {
            match *event {
                Event::On(ch, pitch) if ch == channel => {
                    assert!(
                        !sounding.contains(&pitch),
                        "channel {} retriggered pitch {}",
                        channel,
                        pitch
                    );
                    sounding.push(pitch);
                }
                Event::Off(ch, pitch) if ch == channel => {
                    let pos = sounding
                        .iter()
                        .position(|&p| p == pitch)
                        .unwrap_or_else(|| {
                            panic!("channel {} released unsounded pitch {}", channel, pitch)
                        });
                    sounding.remove(pos);
                }
                _ => {}
            }
        }
    }
}

#[test]
fn identical_runs_produce_identical_pcm() {
    let render = || {
        let source = RampSource::new(90);
        let synth = ToneSynth::new(DEFAULT_SAMPLE_RATE);
        let mut engine = Orchestrator::new(source, synth, DEFAULT_SAMPLE_RATE, 42).unwrap();
        let mut pcm: Vec<i16> = Vec::new();
        engine.run(|block| pcm.extend_from_slice(block)).unwrap();
        pcm
    };
    let first = render();
    let second = render();
    assert_eq!(first.len(), 3 * DEFAULT_SAMPLE_RATE as usize * 2);
    assert_eq!(first, second);
}

#[test]
fn different_seeds_diverge() {
    let render = |seed: u32| {
        let source = RampSource::new(90);
        let synth = ToneSynth::new(DEFAULT_SAMPLE_RATE);
        let mut engine = Orchestrator::new(source, synth, DEFAULT_SAMPLE_RATE, seed).unwrap();
        let mut pcm: Vec<i16> = Vec::new();
        engine.run(|block| pcm.extend_from_slice(block)).unwrap();
        pcm
    };
    assert_ne!(render(1), render(2));
}
