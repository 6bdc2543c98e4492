// Instrument Map - Instrument names to General MIDI program numbers
// Consumed by the MIDI exporter for program changes

/// Instrument name -> GM program (0-based)
pub const INSTRUMENT_MAP: &[(&str, u8)] = &[
    // Piano and keyboard
    ("Piano", 0),
    ("Bright Acoustic Piano", 1),
    ("Electric Grand Piano", 2),
    ("Honky-tonk Piano", 3),
    ("Electric Piano 1", 4),
    ("Electric Piano 2", 5),
    ("Electric Piano", 4),
    ("Harpsichord", 6),
    ("Clavinet", 7),
    // Guitars
    ("Acoustic Guitar", 24),
    ("Nylon Guitar", 25),
    ("Electric Guitar (Clean)", 26),
    ("Electric Guitar (Distorted)", 30),
    // Strings
    ("Violin", 40),
    ("Viola", 41),
    ("Cello", 42),
    ("Double Bass", 43),
    ("Harp", 46),
    ("String Ensemble", 48),
    ("Strings", 48),
    // Woodwinds
    ("Flute", 73),
    ("Clarinet", 71),
    ("Oboe", 68),
    ("Bassoon", 70),
    ("Saxophone", 65),
    // Brass
    ("Trumpet", 56),
    ("Trombone", 57),
    ("French Horn", 60),
    ("Tuba", 58),
    // Synths
    ("Synth Lead", 80),
    ("Synth Pad", 88),
    ("Synth Bass", 38),
    ("Synth Pluck", 81),
    // Percussion (drum kits play on channel 9)
    ("Drums", 0),
    ("Percussion", 0),
    ("Timpani", 47),
    ("Marimba", 12),
    ("Xylophone", 13),
    ("Vibraphone", 11),
    ("Cymbals", 49),
    ("Bass Drum", 35),
    ("Triangle", 81),
    // World
    ("Sitar", 104),
    ("Shamisen", 105),
    ("Koto", 106),
    ("Steel Drums", 114),
    ("Taiko Drum", 117),
    // Bass
    ("Acoustic Bass", 32),
    ("Electric Bass", 33),
    ("Fretless Bass", 35),
    ("Slap Bass", 36),
    ("808 Bass", 33),
    ("Bass", 33),
    // Other
    ("Accordion", 21),
    ("Harmonica", 22),
    ("Kalimba", 108),
    ("Hang Drum", 116),
    ("Vocal Pad", 88),
];

/// Look up the GM program for an instrument (case-insensitive)
pub fn program_number(instrument: &str) -> Option<u8> {
    let wanted = instrument.trim();
    INSTRUMENT_MAP
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
        .map(|(_, program)| *program)
}

pub fn is_valid_instrument(instrument: &str) -> bool {
    program_number(instrument).is_some()
}

/// All instrument names in table order
pub fn instrument_names() -> Vec<&'static str> {
    INSTRUMENT_MAP.iter().map(|(name, _)| *name).collect()
}
