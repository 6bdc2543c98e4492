// Tracks - Timed note events grouped into per-track streams
// The terminal output of one generation run, handed to the MIDI serializer

use serde::{Deserialize, Serialize};

use crate::theory::{Genre, Pitch, TimeSignature};

use super::assembler::SectionReport;

/// Highest MIDI key number
const MAX_MIDI_PITCH: Pitch = 127;

/// Fold a pitch into the MIDI range by whole octaves, keeping its pitch class
pub fn fold_pitch(pitch: Pitch) -> u8 {
    let mut folded = pitch;
    while folded > MAX_MIDI_PITCH {
        folded -= 12;
    }
    while folded < 0 {
        folded += 12;
    }
    folded as u8
}

/// One pitch sounding on one track/channel for a bounded time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Output track index
    pub track: usize,

    /// MIDI channel (0-15, 9 = percussion)
    pub channel: u8,

    /// MIDI key number (0-127)
    pub pitch: u8,

    /// Start time in beats from the beginning of the song
    pub start_beats: f64,

    /// Duration in beats
    pub duration_beats: f64,

    /// MIDI velocity (1-127)
    pub velocity: u8,
}

impl NoteEvent {
    /// Create a new note event, folding the pitch and clamping the velocity
    pub fn new(
        track: usize,
        channel: u8,
        pitch: Pitch,
        start_beats: f64,
        duration_beats: f64,
        velocity: i32,
    ) -> Self {
        NoteEvent {
            track,
            channel: channel.min(15),
            pitch: fold_pitch(pitch),
            start_beats,
            duration_beats,
            velocity: velocity.clamp(1, 127) as u8,
        }
    }

    pub fn end_beats(&self) -> f64 {
        self.start_beats + self.duration_beats
    }
}

/// Tempo change at a point in the song
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoChange {
    pub start_beats: f64,
    pub bpm: u32,
}

/// A single output track and its events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub index: usize,

    /// Track name (instrument or role)
    pub name: String,

    /// Instrument name used for the program change on export
    pub instrument: Option<String>,

    /// All notes in this track
    pub events: Vec<NoteEvent>,
}

impl Track {
    /// Create a new empty track
    pub fn new(index: usize, name: impl Into<String>, instrument: Option<String>) -> Self {
        Track {
            index,
            name: name.into(),
            instrument,
            events: Vec::new(),
        }
    }

    pub fn add_note(&mut self, note: NoteEvent) {
        self.events.push(note);
    }

    /// Sort notes by start time (stable, so simultaneous notes keep emission order)
    pub fn sort_by_time(&mut self) {
        self.events.sort_by(|a, b| {
            a.start_beats
                .partial_cmp(&b.start_beats)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// End of the last sounding note
    pub fn end_beats(&self) -> f64 {
        self.events.iter().map(NoteEvent::end_beats).fold(0.0, f64::max)
    }
}

/// Complete multi-track arrangement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arrangement {
    pub tracks: Vec<Track>,

    /// Tempo changes in time order, one per section
    pub tempo_changes: Vec<TempoChange>,

    pub time_signature: TimeSignature,
    pub genre: Genre,

    /// Final position of the time cursor
    pub total_beats: f64,

    /// One report per assembled section
    pub sections: Vec<SectionReport>,
}

impl Arrangement {
    /// Create an arrangement with the given empty tracks
    pub fn new(tracks: Vec<Track>, time_signature: TimeSignature, genre: Genre) -> Self {
        Arrangement {
            tracks,
            tempo_changes: Vec::new(),
            time_signature,
            genre,
            total_beats: 0.0,
            sections: Vec::new(),
        }
    }

    /// Route events to their tracks. Returns how many were added.
    pub fn add_events(&mut self, events: Vec<NoteEvent>) -> usize {
        let mut added = 0;
        for event in events {
            match self.tracks.get_mut(event.track) {
                Some(track) => {
                    track.add_note(event);
                    added += 1;
                }
                None => log::warn!("Dropping note for missing track {}", event.track),
            }
        }
        added
    }

    pub fn add_tempo(&mut self, start_beats: f64, bpm: u32) {
        self.tempo_changes.push(TempoChange { start_beats, bpm });
    }

    /// Total number of note events across all tracks
    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.events.len()).sum()
    }

    /// Iterate over every event in track order
    pub fn events(&self) -> impl Iterator<Item = &NoteEvent> {
        self.tracks.iter().flat_map(|t| t.events.iter())
    }
}
