// Dynamics and Ornamentation - Post-processing for generated lines
// Velocity ramps across a section and genre-gated note embellishments

use rand::Rng;

use crate::theory::{Genre, Ornament, Pitch};

/// Largest velocity change the section ramp can contribute
const RAMP_RANGE: f64 = 30.0;

/// Shape a velocity by section position.
///
/// Ramps up (crescendo) or down by up to 30 units as `section_progress`
/// goes from 0 to 1, adds a uniform jitter in [-10, 20], and clamps to the
/// MIDI velocity range.
pub fn shape_dynamics(
    base_velocity: u8,
    section_progress: f64,
    crescendo: bool,
    rng: &mut impl Rng,
) -> u8 {
    let variation: i32 = rng.gen_range(-10..=20);
    let ramp = (RAMP_RANGE * section_progress.clamp(0.0, 1.0)) as i32;
    let ramp = if crescendo { ramp } else { -ramp };

    (base_velocity as i32 + ramp + variation).clamp(0, 127) as u8
}

/// Expand a pitch into its ornamented sub-sequence.
///
/// Untriggered notes and genres without an ornament pass through as a
/// single-element sequence.
pub fn ornament(pitch: Pitch, genre: Genre, rng: &mut impl Rng) -> Vec<Pitch> {
    match genre.ornament_rule() {
        Some((kind, chance)) if rng.gen::<f64>() < chance => expand(pitch, kind),
        _ => vec![pitch],
    }
}

fn expand(pitch: Pitch, kind: Ornament) -> Vec<Pitch> {
    match kind {
        Ornament::Trill => vec![pitch, pitch + 1, pitch],
        Ornament::GraceNote => vec![pitch - 1, pitch],
    }
}
