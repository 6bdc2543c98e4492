// Percussion Patterns - Genre grids tiled across a section
// Four fixed orchestral slots per beat, interleaved: timpani, cymbals, bass drum, triangle

use crate::theory::{Genre, PercussionRole};

/// General MIDI percussion key numbers for the fixed slots
pub const MIDI_TIMPANI: u8 = 47;
pub const MIDI_CYMBALS: u8 = 49;
pub const MIDI_BASS_DRUM: u8 = 35;
pub const MIDI_TRIANGLE: u8 = 81;

/// Slot order within each beat
pub const PERCUSSION_SLOTS: [(PercussionRole, u8); 4] = [
    (PercussionRole::Timpani, MIDI_TIMPANI),
    (PercussionRole::Cymbals, MIDI_CYMBALS),
    (PercussionRole::BassDrum, MIDI_BASS_DRUM),
    (PercussionRole::Triangle, MIDI_TRIANGLE),
];

/// Steps in one grid cycle
const GRID_STEPS: usize = 4;

/// Generate a percussion pattern of `4 × length_in_beats` entries.
///
/// Entry `beat * 4 + slot` holds the slot's key if the genre grid hits on
/// `beat % 4`. Slots the genre grid does not define never hit, so a genre
/// without any orchestral roles yields an all-`None` pattern.
pub fn generate_pattern(genre: Genre, length_in_beats: usize) -> Vec<Option<u8>> {
    let grid = genre.percussion_grid();
    let mut pattern = Vec::with_capacity(length_in_beats * PERCUSSION_SLOTS.len());

    for beat in 0..length_in_beats {
        for (role, key) in PERCUSSION_SLOTS {
            let hit = grid
                .iter()
                .find(|(grid_role, _)| *grid_role == role)
                .is_some_and(|(_, steps)| steps[beat % GRID_STEPS] > 0.0);
            pattern.push(hit.then_some(key));
        }
    }

    if is_silent(&pattern) {
        log::debug!("Percussion pattern for genre '{}' is empty", genre);
    } else {
        log::debug!("Generated percussion pattern for genre '{}': {:?}", genre, pattern);
    }

    pattern
}

/// True when no entry in the pattern is a hit
pub fn is_silent(pattern: &[Option<u8>]) -> bool {
    pattern.iter().all(Option::is_none)
}
