// Arranger - Song structure, section assembly and MIDI export
// Turns a song request into synchronized per-track event streams

pub mod song;
pub mod tracks;
pub mod assembler;
pub mod midi;

// Re-export main types
pub use song::{Section, SectionKind, SongStructure};
pub use tracks::{Arrangement, NoteEvent, TempoChange, Track, fold_pitch};
pub use assembler::{
    ComposeError, ComposeResult, Features, Role, SectionReport, SongRequest,
    compose, section_bpm, MAX_BPM, MAX_SONG_BEATS, MIN_BPM,
};
pub use midi::{MidiExportError, MidiExportOptions, export_midi, write_midi};
