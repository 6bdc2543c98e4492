// Harmony Rendering - Voice-led chord events
// Reorders each chord toward the previous one, re-shapes it per genre, and emits notes

use rand::Rng;

use super::progression::{shape_chord, Chord};
use crate::arranger::tracks::NoteEvent;
use crate::theory::{Genre, Pitch};

/// Default chord velocity before jitter
pub const HARMONY_VELOCITY: u8 = 80;

/// Where and how long each chord of a rendered progression sounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonyPlacement {
    pub track: usize,
    pub channel: u8,

    /// Start of the first chord, in beats
    pub start_beats: f64,

    /// Length of each chord slot, in beats
    pub chord_beats: f64,
}

/// Order a chord's pitches by distance to the nearest pitch of the previous chord.
///
/// Greedy and stable: equally close pitches keep their original order.
pub fn voice_lead(chord: &[Pitch], previous: &[Pitch]) -> Chord {
    let mut ordered = chord.to_vec();
    if previous.is_empty() {
        return ordered;
    }
    ordered.sort_by_key(|&note| {
        previous
            .iter()
            .map(|&prev| (note - prev).abs())
            .min()
            .unwrap_or(0)
    });
    ordered
}

/// Render a progression into note events.
///
/// Each chord after the first is voice-led toward the previously emitted
/// chord, then re-shaped with the genre's chord rules (fresh draws). Every
/// pitch gets `base ± 10` velocity, where `base` comes from
/// `base_velocities[i]` or [`HARMONY_VELOCITY`].
pub fn render_harmony(
    progression: &[Chord],
    genre: Genre,
    placement: HarmonyPlacement,
    base_velocities: &[u8],
    rng: &mut impl Rng,
) -> Vec<NoteEvent> {
    let rules = genre.chord_rules();
    let mut previous: Option<Chord> = None;
    let mut events = Vec::new();

    for (i, chord) in progression.iter().enumerate() {
        let mut voiced = match &previous {
            Some(prev) => voice_lead(chord, prev),
            None => chord.clone(),
        };
        shape_chord(&mut voiced, &rules, rng);

        let start = placement.start_beats + i as f64 * placement.chord_beats;
        let base = base_velocities.get(i).copied().unwrap_or(HARMONY_VELOCITY) as i32;

        for &pitch in &voiced {
            let velocity = base + rng.gen_range(-10..=10);
            events.push(NoteEvent::new(
                placement.track,
                placement.channel,
                pitch,
                start,
                placement.chord_beats,
                velocity,
            ));
        }

        previous = Some(voiced);
    }

    events
}
