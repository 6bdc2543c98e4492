// Melodic Lines - Genre-conditioned melodies, countermelodies and bass
// One entry per beat; None marks a rest

use rand::seq::SliceRandom;
use rand::Rng;

use super::progression::Chord;
use crate::theory::{Genre, MelodyRule, Pitch, Scale};

/// One optional pitch per beat; rests are skipped when rendering
pub type MelodyLine = Vec<Option<Pitch>>;

/// Probability that any melody beat is a rest
pub const REST_CHANCE: f64 = 0.15;

/// Octave offsets a countermelody note may take
const COUNTERMELODY_OCTAVES: [Pitch; 3] = [-12, 0, 12];

/// Generate a genre-specific melody of exactly `length_in_beats` entries.
///
/// Also used for the secondary rhythm-filler line: independent draws give
/// different content for identical parameters.
pub fn generate_melody(
    genre: Genre,
    scale: &Scale,
    length_in_beats: usize,
    rng: &mut impl Rng,
) -> MelodyLine {
    let rule = genre.melody_rule();

    (0..length_in_beats)
        .map(|_| {
            if rng.gen::<f64>() < REST_CHANCE {
                None
            } else {
                Some(melody_pitch(&rule, scale, rng))
            }
        })
        .collect()
}

/// Pick one melody pitch under a genre rule
fn melody_pitch(rule: &MelodyRule, scale: &Scale, rng: &mut impl Rng) -> Pitch {
    match *rule {
        MelodyRule::Free => random_scale_pitch(scale, rng),
        MelodyRule::Jitter(range) => random_scale_pitch(scale, rng) + rng.gen_range(-range..=range),
        MelodyRule::Degrees(degrees) => {
            let degree = degrees.choose(rng).copied().unwrap_or(0);
            scale.degree(degree)
        }
        MelodyRule::OctaveLeap { chance } => {
            let pitch = random_scale_pitch(scale, rng);
            if rng.gen::<f64>() < chance {
                pitch + if rng.gen_bool(0.5) { 12 } else { -12 }
            } else {
                pitch
            }
        }
    }
}

fn random_scale_pitch(scale: &Scale, rng: &mut impl Rng) -> Pitch {
    scale.degree(rng.gen_range(0..scale.len()))
}

/// Generate a countermelody: every beat sounds, with a random octave displacement
pub fn generate_countermelody(scale: &Scale, length: usize, rng: &mut impl Rng) -> Vec<Pitch> {
    (0..length)
        .map(|_| {
            let octave = COUNTERMELODY_OCTAVES.choose(rng).copied().unwrap_or(0);
            random_scale_pitch(scale, rng) + octave
        })
        .collect()
}

/// Bass line derived from the progression: the first (lowest listed) pitch of each chord
pub fn derive_bass_line(progression: &[Chord]) -> Vec<Pitch> {
    progression
        .iter()
        .filter_map(|chord| chord.first().copied())
        .collect()
}
