// Scale Resolution - Key and scale lookup
// Maps a key name plus a scale name to an ordered set of MIDI pitches

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semitone pitch. Unbounded during generation, folded into MIDI range on emission.
pub type Pitch = i32;

/// All valid key names, in chromatic order from C
pub const KEYS: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// MIDI pitch of the key's root (middle-C octave)
const KEY_BASE_PITCH: Pitch = 60;

/// Scale names paired with their semitone intervals from the root
const SCALE_INTERVALS: &[(&str, &[Pitch])] = &[
    ("Major", &[0, 2, 4, 5, 7, 9, 11]),
    ("Minor", &[0, 2, 3, 5, 7, 8, 10]),
    ("Dorian", &[0, 2, 3, 5, 7, 9, 10]),
    ("Mixolydian", &[0, 2, 4, 5, 7, 9, 10]),
    ("Phrygian", &[0, 1, 3, 5, 7, 8, 10]),
    ("Lydian", &[0, 2, 4, 6, 7, 9, 11]),
    ("Harmonic Minor", &[0, 2, 3, 5, 7, 8, 11]),
    ("Melodic Minor", &[0, 2, 3, 5, 7, 9, 11]),
    ("Pentatonic Major", &[0, 2, 4, 7, 9]),
    ("Pentatonic Minor", &[0, 3, 5, 7, 10]),
    ("Blues", &[0, 3, 5, 6, 7, 10]),
    ("Hungarian Minor", &[0, 2, 3, 6, 7, 8, 11]),
    ("Arabic", &[0, 1, 4, 5, 7, 8, 11]),
    ("Japanese", &[0, 1, 5, 7, 8]),
    ("Whole Tone", &[0, 2, 4, 6, 8, 10]),
    ("Chromatic", &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScaleError {
    #[error("Invalid key: {0}. Valid keys are: {keys:?}", keys = KEYS)]
    InvalidKey(String),
    #[error("Invalid scale: {0}. Valid scales are: {scales:?}", scales = scale_names())]
    InvalidScale(String),
}

pub type ScaleResult<T> = Result<T, ScaleError>;

/// An ordered, immutable set of pitches derived from a key and an interval pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Pitch>", into = "Vec<Pitch>")]
pub struct Scale {
    pitches: Vec<Pitch>,
}

impl TryFrom<Vec<Pitch>> for Scale {
    type Error = String;

    fn try_from(pitches: Vec<Pitch>) -> Result<Self, Self::Error> {
        Scale::from_pitches(pitches).ok_or_else(|| "A scale needs at least one pitch".to_string())
    }
}

impl From<Scale> for Vec<Pitch> {
    fn from(scale: Scale) -> Self {
        scale.pitches
    }
}

impl Scale {
    /// Build a scale directly from pitches (must not be empty)
    pub fn from_pitches(pitches: Vec<Pitch>) -> Option<Self> {
        if pitches.is_empty() {
            None
        } else {
            Some(Scale { pitches })
        }
    }

    pub fn pitches(&self) -> &[Pitch] {
        &self.pitches
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    /// Pitch at a scale degree; degrees wrap modulo the scale length
    pub fn degree(&self, degree: usize) -> Pitch {
        self.pitches[degree % self.pitches.len()]
    }

    pub fn root(&self) -> Pitch {
        self.pitches[0]
    }
}

/// Resolve a key and scale name to a scale.
///
/// Pure lookup: the same inputs always give the same scale, and the
/// number of pitches equals the number of intervals defined for the scale.
pub fn resolve(key: &str, scale_name: &str) -> ScaleResult<Scale> {
    let root = key_pitch(key).ok_or_else(|| ScaleError::InvalidKey(key.to_string()))?;
    let intervals =
        scale_intervals(scale_name).ok_or_else(|| ScaleError::InvalidScale(scale_name.to_string()))?;

    Ok(Scale {
        pitches: intervals.iter().map(|&interval| root + interval).collect(),
    })
}

/// Shift every pitch of a scale by a number of semitones
pub fn modulate(scale: &Scale, steps: Pitch) -> Scale {
    Scale {
        pitches: scale.pitches.iter().map(|&p| p + steps).collect(),
    }
}

/// MIDI pitch of a key's root, or None for an unknown key
pub fn key_pitch(key: &str) -> Option<Pitch> {
    KEYS.iter()
        .position(|&k| k == key)
        .map(|offset| KEY_BASE_PITCH + offset as Pitch)
}

/// Interval pattern of a named scale
pub fn scale_intervals(scale_name: &str) -> Option<&'static [Pitch]> {
    SCALE_INTERVALS
        .iter()
        .find(|(name, _)| *name == scale_name)
        .map(|(_, intervals)| *intervals)
}

/// Names of every supported scale, in table order
pub fn scale_names() -> Vec<&'static str> {
    SCALE_INTERVALS.iter().map(|(name, _)| *name).collect()
}

pub fn is_valid_key(key: &str) -> bool {
    key_pitch(key).is_some()
}

pub fn is_valid_scale(scale_name: &str) -> bool {
    scale_intervals(scale_name).is_some()
}
