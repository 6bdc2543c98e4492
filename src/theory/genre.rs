// Genre Rules - Per-genre composition parameters
// Each genre's behavior is a record of probabilities and intervals, not branching code

use serde::{Deserialize, Serialize};

use super::scale::Pitch;

/// Musical genre driving chord shaping, melody contour, ornaments and percussion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Pop,
    Rock,
    Jazz,
    Classical,
    Electronic,
    #[serde(rename = "Hip-Hop")]
    HipHop,
    Folk,
    Blues,
    User,
}

impl Genre {
    pub const ALL: [Genre; 9] = [
        Genre::Pop,
        Genre::Rock,
        Genre::Jazz,
        Genre::Classical,
        Genre::Electronic,
        Genre::HipHop,
        Genre::Folk,
        Genre::Blues,
        Genre::User,
    ];

    /// Parse a genre name (case-insensitive, "hiphop" and "hip hop" accepted)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pop" => Some(Genre::Pop),
            "rock" => Some(Genre::Rock),
            "jazz" => Some(Genre::Jazz),
            "classical" => Some(Genre::Classical),
            "electronic" => Some(Genre::Electronic),
            "hip-hop" | "hiphop" | "hip hop" => Some(Genre::HipHop),
            "folk" => Some(Genre::Folk),
            "blues" => Some(Genre::Blues),
            "user" => Some(Genre::User),
            _ => None,
        }
    }

    /// Convert from string representation, falling back to Pop for unknown names
    pub fn from_string(s: &str) -> Self {
        Genre::parse(s).unwrap_or_else(|| {
            log::warn!("Genre '{}' not found. Falling back to 'Pop'.", s);
            Genre::Pop
        })
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Genre::Pop => "Pop",
            Genre::Rock => "Rock",
            Genre::Jazz => "Jazz",
            Genre::Classical => "Classical",
            Genre::Electronic => "Electronic",
            Genre::HipHop => "Hip-Hop",
            Genre::Folk => "Folk",
            Genre::Blues => "Blues",
            Genre::User => "User",
        }
    }

    /// Chord labels mapped to the scale degrees they stack
    pub fn chord_table(&self) -> &'static [(&'static str, &'static [usize])] {
        match self {
            Genre::Pop => &[
                ("I", &[0, 2, 4]),
                ("ii", &[1, 3, 5]),
                ("IV", &[3, 5, 0]),
                ("V", &[4, 6, 1]),
                ("vi", &[5, 0, 2]),
            ],
            Genre::Rock => &[
                ("I", &[0, 2, 4]),
                ("bIII", &[2, 4, 6]),
                ("IV", &[3, 5, 0]),
                ("V", &[4, 6, 1]),
                ("bVI", &[5, 7, 9]),
                ("bVII", &[6, 8, 10]),
            ],
            Genre::Jazz => &[
                ("ii", &[1, 3, 5]),
                ("V", &[4, 6, 1]),
                ("I", &[0, 2, 4]),
                ("vi", &[5, 0, 2]),
                ("maj7", &[0, 4, 7, 11]),
                ("m7", &[0, 3, 7, 10]),
            ],
            Genre::Classical => &[
                ("I", &[0, 2, 4]),
                ("ii", &[1, 3, 5]),
                ("iii", &[2, 4, 6]),
                ("IV", &[3, 5, 0]),
                ("V", &[4, 6, 1]),
                ("vi", &[5, 0, 2]),
                ("vii°", &[6, 1, 3]),
            ],
            Genre::Electronic => &[
                ("i", &[0, 3, 7]),
                ("III", &[4, 7, 11]),
                ("VI", &[9, 0, 4]),
                ("VII", &[11, 2, 5]),
                ("v", &[7, 10, 2]),
            ],
            Genre::HipHop => &[
                ("i", &[0, 3, 7]),
                ("iv", &[5, 8, 0]),
                ("v", &[7, 10, 2]),
                ("VI", &[9, 0, 4]),
                ("VII", &[11, 2, 5]),
            ],
            Genre::Folk => &[
                ("I", &[0, 2, 4]),
                ("IV", &[3, 5, 0]),
                ("V", &[4, 6, 1]),
                ("vi", &[5, 0, 2]),
                ("ii", &[1, 3, 5]),
            ],
            Genre::Blues => &[
                ("I", &[0, 2, 4]),
                ("IV", &[3, 5, 0]),
                ("V", &[4, 6, 1]),
            ],
            Genre::User => &[
                ("I", &[0, 2, 4]),
                ("IV", &[3, 5, 0]),
                ("V", &[4, 6, 1]),
                ("vi", &[5, 0, 2]),
            ],
        }
    }

    /// Scale degrees for a chord label, if the genre defines it
    pub fn chord_degrees(&self, label: &str) -> Option<&'static [usize]> {
        self.chord_table()
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, degrees)| *degrees)
    }

    /// Chord shaping applied after a chord is built from the scale
    pub fn chord_rules(&self) -> ChordRules {
        match self {
            Genre::Jazz => ChordRules {
                extensions: JAZZ_EXTENSIONS,
                ..ChordRules::PLAIN
            },
            Genre::Classical => ChordRules {
                triad_only: true,
                suspensions: CLASSICAL_SUSPENSIONS,
                ..ChordRules::PLAIN
            },
            Genre::Pop => ChordRules {
                extensions: POP_EXTENSIONS,
                suspensions: POP_SUSPENSIONS,
                ..ChordRules::PLAIN
            },
            Genre::Rock => ChordRules {
                power_chord: true,
                extensions: ROCK_EXTENSIONS,
                ..ChordRules::PLAIN
            },
            Genre::Electronic => ChordRules {
                extensions: ELECTRONIC_EXTENSIONS,
                ..ChordRules::PLAIN
            },
            Genre::Folk => ChordRules {
                extensions: FOLK_EXTENSIONS,
                ..ChordRules::PLAIN
            },
            Genre::HipHop => ChordRules {
                triad_only: true,
                extensions: HIPHOP_EXTENSIONS,
                ..ChordRules::PLAIN
            },
            Genre::Blues => ChordRules {
                triad_only: true,
                added: &[10], // dominant 7th
                extensions: BLUES_EXTENSIONS,
                ..ChordRules::PLAIN
            },
            Genre::User => ChordRules::PLAIN,
        }
    }

    /// How melody pitches are chosen and perturbed
    pub fn melody_rule(&self) -> MelodyRule {
        match self {
            Genre::Jazz => MelodyRule::Jitter(2),
            Genre::Classical => MelodyRule::Jitter(1),
            Genre::Electronic => MelodyRule::Jitter(3),
            Genre::Rock => MelodyRule::Degrees(&[0, 3, 4]),
            Genre::Pop => MelodyRule::Degrees(&[0, 2, 4]),
            Genre::Folk => MelodyRule::OctaveLeap { chance: 0.3 },
            Genre::HipHop | Genre::Blues | Genre::User => MelodyRule::Free,
        }
    }

    /// Ornament applied to melody notes, with its trigger probability
    pub fn ornament_rule(&self) -> Option<(Ornament, f64)> {
        match self {
            Genre::Classical => Some((Ornament::Trill, 0.5)),
            Genre::Jazz | Genre::Pop => Some((Ornament::GraceNote, 0.2)),
            Genre::Rock => Some((Ornament::GraceNote, 0.4)),
            _ => None,
        }
    }

    /// Four-step percussion grid per instrument role.
    /// Genres without their own grid use Pop's.
    pub fn percussion_grid(&self) -> &'static [(PercussionRole, [f32; 4])] {
        match self {
            Genre::Rock | Genre::Pop => &[
                (PercussionRole::Kick, [1.0, 0.0, 1.0, 0.0]),
                (PercussionRole::Snare, [0.0, 1.0, 0.0, 1.0]),
                (PercussionRole::HiHat, [1.0, 1.0, 1.0, 1.0]),
            ],
            Genre::Jazz => &[
                (PercussionRole::Ride, [1.0, 0.5, 1.0, 0.5]),
                (PercussionRole::Snare, [0.0, 0.5, 0.0, 0.5]),
                (PercussionRole::Kick, [1.0, 0.0, 0.0, 0.0]),
            ],
            Genre::Electronic => &[
                (PercussionRole::Kick, [1.0, 0.0, 1.0, 0.0]),
                (PercussionRole::Clap, [0.0, 1.0, 0.0, 1.0]),
                (PercussionRole::HiHat, [1.0, 1.0, 1.0, 1.0]),
            ],
            Genre::Folk => &[
                (PercussionRole::Kick, [1.0, 0.0, 0.0, 0.0]),
                (PercussionRole::Shaker, [1.0, 1.0, 1.0, 1.0]),
                (PercussionRole::Tambourine, [0.0, 1.0, 0.0, 1.0]),
            ],
            Genre::Classical => &[
                (PercussionRole::Timpani, [1.0, 0.0, 0.0, 1.0]),
                (PercussionRole::Cymbals, [0.0, 0.0, 1.0, 0.0]),
                (PercussionRole::BassDrum, [1.0, 0.0, 0.0, 0.0]),
                (PercussionRole::Triangle, [0.0, 1.0, 0.0, 1.0]),
            ],
            Genre::HipHop | Genre::Blues | Genre::User => Genre::Pop.percussion_grid(),
        }
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

const JAZZ_EXTENSIONS: &[Extension] = &[
    Extension::new(0.5, 10), // minor 7th
    Extension::new(0.7, 14), // major 9th
    Extension::new(0.9, 21), // 13th
];

const CLASSICAL_SUSPENSIONS: &[Extension] = &[Extension::new(0.8, 5)]; // sus4

const POP_EXTENSIONS: &[Extension] = &[Extension::new(0.8, 10)];

const POP_SUSPENSIONS: &[Extension] = &[
    Extension::new(0.9, 2), // sus2
    Extension::new(0.9, 5), // sus4
];

const ROCK_EXTENSIONS: &[Extension] = &[Extension::new(0.7, 12)]; // octave

const ELECTRONIC_EXTENSIONS: &[Extension] = &[
    Extension::new(0.5, 11), // major 7th
    Extension::new(0.7, 13), // minor 9th
];

const FOLK_EXTENSIONS: &[Extension] = &[Extension::new(0.8, 9)]; // sixth

const HIPHOP_EXTENSIONS: &[Extension] = &[Extension::new(0.5, 10), Extension::new(0.7, 14)];

const BLUES_EXTENSIONS: &[Extension] = &[Extension::new(0.6, 14)];

/// A probabilistic interval: applied when a uniform draw in [0, 1) exceeds `threshold`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extension {
    pub threshold: f64,
    /// Semitones above the chord root
    pub interval: Pitch,
}

impl Extension {
    pub const fn new(threshold: f64, interval: Pitch) -> Self {
        Extension {
            threshold,
            interval,
        }
    }
}

/// Chord shaping record, applied in field order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordRules {
    /// Keep only the first three notes
    pub triad_only: bool,

    /// Collapse to root + fifth
    pub power_chord: bool,

    /// Intervals always stacked on the root
    pub added: &'static [Pitch],

    /// Independent Bernoulli trials, each appending root + interval
    pub extensions: &'static [Extension],

    /// Tried in order; the first one that fires replaces the third
    pub suspensions: &'static [Extension],
}

impl ChordRules {
    pub const PLAIN: ChordRules = ChordRules {
        triad_only: false,
        power_chord: false,
        added: &[],
        extensions: &[],
        suspensions: &[],
    };
}

/// Melody pitch selection per genre
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MelodyRule {
    /// Any scale pitch
    Free,

    /// Any scale pitch plus a uniform chromatic offset in [-n, n]
    Jitter(Pitch),

    /// Only the listed scale degrees
    Degrees(&'static [usize]),

    /// Any scale pitch, shifted an octave up or down with the given chance
    OctaveLeap { chance: f64 },
}

/// Melodic embellishments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ornament {
    /// p, p+1, p
    Trill,

    /// p-1, p
    GraceNote,
}

/// Named percussion voices used by the genre grids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercussionRole {
    Kick,
    Snare,
    HiHat,
    Ride,
    Clap,
    Shaker,
    Tambourine,
    Timpani,
    Cymbals,
    BassDrum,
    Triangle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_genre() {
        assert_eq!(Genre::parse("Jazz"), Some(Genre::Jazz));
        assert_eq!(Genre::parse("hip-hop"), Some(Genre::HipHop));
        assert_eq!(Genre::parse("HipHop"), Some(Genre::HipHop));
        assert_eq!(Genre::parse("polka"), None);
    }

    #[test]
    fn test_unknown_genre_falls_back_to_pop() {
        assert_eq!(Genre::from_string("polka"), Genre::Pop);
    }

    #[test]
    fn test_name_round_trips_through_parse() {
        for genre in Genre::ALL {
            assert_eq!(Genre::parse(genre.name()), Some(genre));
        }
    }

    #[test]
    fn test_every_genre_has_chords() {
        for genre in Genre::ALL {
            let table = genre.chord_table();
            assert!(!table.is_empty(), "{} has no chords", genre);
            assert!(table.iter().all(|(_, degrees)| degrees.len() >= 3));
        }
    }

    #[test]
    fn test_chord_degrees_lookup() {
        assert_eq!(Genre::Rock.chord_degrees("bVII"), Some(&[6usize, 8, 10][..]));
        assert_eq!(Genre::Rock.chord_degrees("vi"), None);
    }

    #[test]
    fn test_rock_rules() {
        let rules = Genre::Rock.chord_rules();
        assert!(rules.power_chord);
        assert_eq!(rules.extensions.len(), 1);
        assert_eq!(rules.extensions[0].interval, 12);
    }

    #[test]
    fn test_blues_forces_seventh() {
        let rules = Genre::Blues.chord_rules();
        assert!(rules.triad_only);
        assert_eq!(rules.added, &[10]);
    }

    #[test]
    fn test_chord_rule_tables() {
        let intervals = |rules: &[Extension]| rules.iter().map(|e| e.interval).collect::<Vec<_>>();

        let jazz = Genre::Jazz.chord_rules();
        assert_eq!(intervals(jazz.extensions), vec![10, 14, 21]);
        assert_eq!(jazz.extensions[2].threshold, 0.9);

        let pop = Genre::Pop.chord_rules();
        assert_eq!(intervals(pop.extensions), vec![10]);
        assert_eq!(intervals(pop.suspensions), vec![2, 5]);

        assert_eq!(intervals(Genre::Electronic.chord_rules().extensions), vec![11, 13]);
        assert_eq!(intervals(Genre::Classical.chord_rules().suspensions), vec![5]);
        assert_eq!(Genre::User.chord_rules(), ChordRules::PLAIN);
    }

    #[test]
    fn test_percussion_fallback() {
        assert_eq!(Genre::HipHop.percussion_grid(), Genre::Pop.percussion_grid());
        assert_eq!(Genre::Classical.percussion_grid().len(), 4);
    }

    #[test]
    fn test_serde_name() {
        let json = serde_json::to_string(&Genre::HipHop).unwrap();
        assert_eq!(json, "\"Hip-Hop\"");
    }
}
