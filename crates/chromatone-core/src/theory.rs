//! Scale and chord tables with the pitch math built on top of them.
//!
//! Scales are ordered semitone offsets from a base note; chord shapes are
//! 1-based scale-degree indices. Both are closed enumerations over constant
//! tables, so every lookup is exhaustiveness-checked at compile time and no
//! mutable global state exists.

/// A named scale, defined as semitone offsets from the base note.
///
/// Pentatonic scales are padded to seven entries with repeated degrees so
/// that degree arithmetic stays uniform across scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Major,
    Minor,
    HarmonicMinor,
    MajorPentatonic,
    MinorPentatonic,
    Japanese,
}

impl Scale {
    pub const ALL: [Scale; 6] = [
        Scale::Major,
        Scale::Minor,
        Scale::HarmonicMinor,
        Scale::MajorPentatonic,
        Scale::MinorPentatonic,
        Scale::Japanese,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scale::Major => "maj",
            Scale::Minor => "min",
            Scale::HarmonicMinor => "hmin",
            Scale::MajorPentatonic => "maj_pentatonic",
            Scale::MinorPentatonic => "min_pentatonic",
            Scale::Japanese => "japanese",
        }
    }

    /// Semitone offsets from the base note, one per scale degree.
    pub fn intervals(&self) -> &'static [i32] {
        match self {
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            Scale::MajorPentatonic => &[0, 2, 4, 4, 7, 7, 9],
            Scale::MinorPentatonic => &[0, 3, 3, 5, 7, 7, 10],
            Scale::Japanese => &[0, 2, 3, 3, 7, 8, 8],
        }
    }

    /// Number of degrees in the scale.
    pub fn len(&self) -> usize {
        self.intervals().len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// A chord voicing, defined as 1-based scale-degree indices.
///
/// Indices may exceed the scale length, wrapping into the next octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordShape {
    /// Root, third, fifth, seventh.
    Seven,
    /// Root, third, fifth, octave.
    Triad,
    /// Root, fifth, octave, octave fifth.
    Power,
}

impl ChordShape {
    pub const ALL: [ChordShape; 3] = [ChordShape::Seven, ChordShape::Triad, ChordShape::Power];

    pub fn name(&self) -> &'static str {
        match self {
            ChordShape::Seven => "seven",
            ChordShape::Triad => "triad",
            ChordShape::Power => "power",
        }
    }

    /// 1-based scale degrees making up the chord.
    pub fn degrees(&self) -> &'static [i64] {
        match self {
            ChordShape::Seven => &[1, 3, 5, 7],
            ChordShape::Triad => &[1, 3, 5, 8],
            ChordShape::Power => &[1, 5, 8, 12],
        }
    }

    /// Number of pitches in the chord.
    pub fn len(&self) -> usize {
        self.degrees().len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// MIDI pitch of a scale degree, with Euclidean octave wrapping.
///
/// Negative degrees reach below the base note: degree -1 of a 7-degree scale
/// is the top degree of the octave below.
pub fn pitch_from_degree(scale: Scale, base_note: i32, degree: i64) -> i32 {
    let len = scale.len() as i64;
    let octave = degree.div_euclid(len);
    let index = degree.rem_euclid(len) as usize;
    base_note + scale.intervals()[index] + 12 * octave as i32
}

/// MIDI pitches of a chord shape rooted on `mode` (a scale degree), shifted
/// by `transposition_steps` whole scale degrees.
pub fn chord_pitches(
    scale: Scale,
    base_note: i32,
    mode: i64,
    shape: ChordShape,
    transposition_steps: i64,
) -> Vec<i32> {
    shape
        .degrees()
        .iter()
        .map(|&degree| pitch_from_degree(scale, base_note, degree - 1 + mode + transposition_steps))
        .collect()
}
