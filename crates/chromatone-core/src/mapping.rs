//! Fixed mapping from committed control parameters to musical settings.
//!
//! Every function here is total over [0, 1] inputs and pure; the orchestrator
//! re-derives only the settings whose source parameters changed. Boundary
//! numbers are tuning constants, not contracts.

use crate::theory::{ChordShape, Scale};

/// Tempo at zero motion energy.
pub const TEMPO_FLOOR_BPM: f64 = 50.0;

/// Tempo span added at full motion energy.
pub const TEMPO_SPAN_BPM: f64 = 110.0;

/// Relative tempo change required before a new bpm is actually applied.
pub const TEMPO_HYSTERESIS: f64 = 0.2;

/// Melody rest probability, re-asserted whenever density inputs change.
pub const MELODY_REST_RATE: f64 = 0.2;

/// Chord cycle length in beats.
pub const BEATS_PER_CHORD: f64 = 4.0;

/// Tempo derived from motion energy.
pub fn bpm_for_energy(energy: f64) -> f64 {
    energy * TEMPO_SPAN_BPM + TEMPO_FLOOR_BPM
}

/// Melody transposition in fractional octaves, from brightness.
pub fn melody_transposition(value: f64) -> f64 {
    value * 3.0 - 1.0
}

/// Chord transposition in fractional octaves, from brightness.
///
/// Piecewise around mid-brightness: dark frames push the chords up, bright
/// frames pull them back toward the base register.
pub fn chord_transposition(value: f64) -> f64 {
    if value < 0.5 {
        2.0 * value + 1.0
    } else {
        2.0 * value - 1.0
    }
}

/// Scale selected by hue, over six contiguous bands of the hue circle.
///
/// The japanese band wraps around red (hue 0) so the circle has no seam.
pub fn scale_for_hue(hue: f64) -> Scale {
    if !(0.5 / 6.0..=5.5 / 6.0).contains(&hue) {
        Scale::Japanese
    } else if hue < 1.5 / 6.0 {
        Scale::MajorPentatonic
    } else if hue < 2.5 / 6.0 {
        Scale::Major
    } else if hue < 3.5 / 6.0 {
        Scale::MinorPentatonic
    } else if hue < 4.5 / 6.0 {
        Scale::Minor
    } else {
        Scale::HarmonicMinor
    }
}

/// Chord shape from the joint saturation/energy axis: calm saturated frames
/// get richer voicings, busy washed-out frames get sparser ones.
pub fn chord_shape_for(saturation: f64, energy: f64) -> ChordShape {
    let shape_value = 0.5 * saturation + 0.5 * (1.0 - energy);
    if shape_value < 1.0 / 3.0 {
        ChordShape::Power
    } else if shape_value < 2.0 / 3.0 {
        ChordShape::Triad
    } else {
        ChordShape::Seven
    }
}

/// One cell of the timbre table: instruments for both channels plus the
/// density and loudness leveling that go with them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimbrePreset {
    pub chord_bank: u16,
    pub chord_program: u8,
    pub melody_bank: u16,
    pub melody_program: u8,
    pub arpeggio_freq: u32,
    /// Volumes are leveled per instrument pair so perceived loudness stays
    /// even across preset changes.
    pub chord_volume: f64,
    pub melody_volume: f64,
}

/// Startup preset, also the darkest/calmest table cell.
pub const PRESET_PAD_SITAR: TimbrePreset = TimbrePreset {
    chord_bank: 17,
    chord_program: 89, // warm pad
    melody_bank: 0,
    melody_program: 104, // sitar
    arpeggio_freq: 0,
    chord_volume: 0.7,
    melody_volume: 0.5,
};

const PRESET_SQUARE: TimbrePreset = TimbrePreset {
    chord_bank: 2,
    chord_program: 92, // square lead
    melody_bank: 2,
    melody_program: 92,
    arpeggio_freq: 0,
    chord_volume: 0.5,
    melody_volume: 0.7,
};

const PRESET_GUITAR_BASS: TimbrePreset = TimbrePreset {
    chord_bank: 0,
    chord_program: 29, // overdriven guitar
    melody_bank: 0,
    melody_program: 34, // picked bass
    arpeggio_freq: 4,
    chord_volume: 0.5,
    melody_volume: 0.7,
};

const PRESET_PIANO: TimbrePreset = TimbrePreset {
    chord_bank: 0,
    chord_program: 0, // acoustic grand
    melody_bank: 0,
    melody_program: 0,
    arpeggio_freq: 0,
    chord_volume: 0.5,
    melody_volume: 0.6,
};

const PRESET_PIANO_CLARINET: TimbrePreset = TimbrePreset {
    chord_bank: 0,
    chord_program: 0,
    melody_bank: 0,
    melody_program: 71, // clarinet
    arpeggio_freq: 0,
    chord_volume: 0.5,
    melody_volume: 0.6,
};

const PRESET_EPIANO: TimbrePreset = TimbrePreset {
    chord_bank: 0,
    chord_program: 4, // electric piano
    melody_bank: 0,
    melody_program: 4,
    arpeggio_freq: 0,
    chord_volume: 0.5,
    melody_volume: 0.6,
};

const PRESET_KOTO_TAMPURA: TimbrePreset = TimbrePreset {
    chord_bank: 0,
    chord_program: 107, // koto
    melody_bank: 1,
    melody_program: 104, // tampura
    arpeggio_freq: 2,
    chord_volume: 0.5,
    melody_volume: 0.5,
};

const PRESET_BRASS_HORN: TimbrePreset = TimbrePreset {
    chord_bank: 0,
    chord_program: 61, // brass section
    melody_bank: 0,
    melody_program: 60, // french horn
    arpeggio_freq: 0,
    chord_volume: 0.45,
    melody_volume: 0.55,
};

/// Timbre preset from the joint brightness/energy lookup.
///
/// `None` means the previous preset stays in effect (the bright-but-mid
/// brightness, high-energy cell intentionally holds whatever came before).
pub fn timbre_for(value: f64, energy: f64) -> Option<TimbrePreset> {
    if value < 1.0 / 3.0 {
        Some(if energy < 1.0 / 6.0 {
            PRESET_PAD_SITAR
        } else if energy < 0.5 {
            PRESET_SQUARE
        } else {
            PRESET_GUITAR_BASS
        })
    } else if value < 2.0 / 3.0 {
        if energy < 1.0 / 6.0 {
            Some(PRESET_PIANO)
        } else if energy < 0.5 {
            Some(PRESET_PIANO_CLARINET)
        } else {
            None
        }
    } else if energy < 1.0 / 6.0 {
        Some(PRESET_EPIANO)
    } else if energy < 0.5 {
        Some(PRESET_KOTO_TAMPURA)
    } else {
        Some(PRESET_BRASS_HORN)
    }
}
