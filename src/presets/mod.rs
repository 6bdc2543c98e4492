// Presets Module
// Read-only lookup tables: genre defaults, genre sections and the instrument map

pub mod types;
pub mod instruments;

use crate::arranger::song::Section;
use crate::theory::Genre;

/// Get the default settings for a genre.
///
/// Blues has no preset of its own and borrows Pop's.
pub fn get_defaults(genre: Genre) -> GenrePreset {
    match genre {
        Genre::Pop | Genre::Blues => GenrePreset::from_table(
            genre,
            "4/4",
            "Major",
            "C",
            &["Electric Piano", "Guitar", "Synth", "Bass", "Vocal Pad"],
            &[
                ("Intro", 8),
                ("Verse", 16),
                ("PreChorus", 8),
                ("Chorus", 8),
                ("Verse", 16),
                ("Chorus", 8),
                ("Bridge", 8),
                ("Outro", 8),
            ],
        ),
        Genre::Rock => GenrePreset::from_table(
            genre,
            "4/4",
            "Minor",
            "E",
            &["Electric Guitar (Distorted)", "Electric Guitar (Clean)", "Bass", "Drums", "Synth Pad"],
            &[
                ("Intro", 4),
                ("Verse", 16),
                ("PreChorus", 8),
                ("Chorus", 8),
                ("Verse", 16),
                ("Chorus", 8),
                ("Solo", 8),
                ("Bridge", 8),
                ("Chorus", 8),
                ("Outro", 8),
            ],
        ),
        Genre::Jazz => GenrePreset::from_table(
            genre,
            "4/4",
            "Dorian",
            "G",
            &["Saxophone", "Piano", "Double Bass", "Drums", "Trumpet"],
            &[("Head", 8), ("Solo", 16), ("Head", 8), ("Outro", 4)],
        ),
        Genre::Classical => GenrePreset::from_table(
            genre,
            "3/4",
            "Major",
            "F",
            &["String Ensemble", "Violin", "Piano", "Cello", "Harpsichord"],
            &[("Exposition", 16), ("Development", 16), ("Recapitulation", 16), ("Coda", 8)],
        ),
        Genre::Electronic => GenrePreset::from_table(
            genre,
            "4/4",
            "Mixolydian",
            "A",
            &["Synth Lead", "Synth Pad", "Synth Bass", "Drums", "Percussion"],
            &[("Build-up", 16), ("Drop", 16), ("Verse", 16), ("Outro", 8)],
        ),
        Genre::HipHop => GenrePreset::from_table(
            genre,
            "4/4",
            "Minor",
            "D",
            &["808 Bass", "Drums", "Synth Lead", "Strings", "Percussion"],
            &[("Intro", 4), ("Verse", 16), ("Chorus", 8), ("Outro", 4)],
        ),
        Genre::Folk => GenrePreset::from_table(
            genre,
            "6/8",
            "Pentatonic Major",
            "G",
            &["Acoustic Guitar", "Violin", "Flute", "Double Bass", "Percussion"],
            &[
                ("Intro", 16),
                ("Verse", 16),
                ("Chorus", 8),
                ("Verse", 16),
                ("Chorus", 8),
                ("Bridge", 8),
                ("Outro", 16),
            ],
        ),
        Genre::User => GenrePreset::from_table(
            genre,
            "4/4",
            "Major",
            "C",
            &["Piano", "Bass", "Drums"],
            &[("Intro", 8), ("Verse", 8), ("Chorus", 16), ("Bridge", 8), ("Outro", 16)],
        ),
    }
}

/// Default song structure for a genre
pub fn default_sections(genre: Genre) -> Vec<Section> {
    get_defaults(genre).sections
}

/// List all genres with summaries
pub fn list_genres() -> Vec<PresetSummary> {
    Genre::ALL
        .iter()
        .map(|genre| get_defaults(*genre).summary())
        .collect()
}

/// True for any genre name the engine recognizes (case-insensitive)
pub fn is_valid_genre(name: &str) -> bool {
    Genre::parse(name).is_some()
}

// Re-export main types
pub use types::{GenrePreset, PresetSummary};
pub use instruments::{INSTRUMENT_MAP, program_number, is_valid_instrument, instrument_names};
