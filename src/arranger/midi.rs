// MIDI Export - Convert arrangements to Standard MIDI Files using the midly crate
// Beat positions become ticks; a conductor track carries tempo and meter

use midly::num::{u15, u24, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::assembler::PERCUSSION_CHANNEL;
use super::tracks::{Arrangement, Track as ArrangementTrack};
use crate::presets::program_number;
use crate::theory::TimeSignature;

#[derive(Debug, Error)]
pub enum MidiExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MidiExportResult<T> = Result<T, MidiExportError>;

/// MIDI export options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidiExportOptions {
    /// Pulses per quarter note (PPQ) - typically 480 or 960
    pub ppq: u16,

    /// Include tempo metadata
    pub include_tempo: bool,

    /// Include time signature metadata
    pub include_time_signature: bool,

    /// Include track names
    pub track_names: bool,

    /// Emit a program change per melodic channel from the instrument map
    pub program_changes: bool,
}

impl Default for MidiExportOptions {
    fn default() -> Self {
        MidiExportOptions {
            ppq: 480,
            include_tempo: true,
            include_time_signature: true,
            track_names: true,
            program_changes: true,
        }
    }
}

/// Ordering of events that share a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    Meta,
    Program,
    NoteOff,
    NoteOn,
}

type TimedEvent<'a> = (u32, Slot, TrackEventKind<'a>);

/// Export an arrangement to MIDI file bytes
///
/// Produces a format-1 file: track 0 is the conductor track, followed by
/// one track per arrangement track.
pub fn export_midi(arrangement: &Arrangement, options: &MidiExportOptions) -> MidiExportResult<Vec<u8>> {
    let ppq = options.ppq.clamp(1, 0x7FFF);
    let header = Header::new(Format::Parallel, Timing::Metrical(u15::new(ppq)));

    let mut tracks = Vec::with_capacity(arrangement.tracks.len() + 1);
    tracks.push(conductor_track(arrangement, ppq, options));

    for track in &arrangement.tracks {
        tracks.push(create_note_track(track, ppq, options));
    }

    let smf = Smf { header, tracks };

    let mut bytes = Vec::new();
    smf.write_std(&mut bytes)?;

    log::debug!(
        "Exported {} tracks ({} notes) to {} bytes of MIDI",
        smf.tracks.len(),
        arrangement.note_count(),
        bytes.len()
    );

    Ok(bytes)
}

/// Export and write the file to disk
pub fn write_midi(
    arrangement: &Arrangement,
    path: impl AsRef<Path>,
    options: &MidiExportOptions,
) -> MidiExportResult<()> {
    let bytes = export_midi(arrangement, options)?;
    std::fs::write(path.as_ref(), bytes)?;
    log::info!("MIDI file '{}' written", path.as_ref().display());
    Ok(())
}

/// Beats (quarter notes) to ticks
pub fn beats_to_ticks(beats: f64, ppq: u16) -> u32 {
    (beats.max(0.0) * ppq as f64).round() as u32
}

/// Track 0: name, time signature and one tempo event per tempo change
fn conductor_track<'a>(arrangement: &Arrangement, ppq: u16, options: &MidiExportOptions) -> Track<'a> {
    let mut events: Vec<TimedEvent<'a>> = Vec::new();

    if options.track_names {
        events.push((0, Slot::Meta, TrackEventKind::Meta(MetaMessage::TrackName(b"Conductor"))));
    }

    if options.include_time_signature {
        events.push((0, Slot::Meta, time_signature_event(arrangement.time_signature)));
    }

    if options.include_tempo {
        for change in &arrangement.tempo_changes {
            events.push((
                beats_to_ticks(change.start_beats, ppq),
                Slot::Meta,
                tempo_event(change.bpm),
            ));
        }
    }

    let end = beats_to_ticks(arrangement.total_beats, ppq);
    to_track(events, end)
}

/// One arrangement track: optional name, program changes, then notes
fn create_note_track<'a>(
    track: &'a ArrangementTrack,
    ppq: u16,
    options: &MidiExportOptions,
) -> Track<'a> {
    let mut events: Vec<TimedEvent<'a>> = Vec::new();

    if options.track_names {
        events.push((0, Slot::Meta, TrackEventKind::Meta(MetaMessage::TrackName(track.name.as_bytes()))));
    }

    if options.program_changes {
        if let Some(program) = track_program(track) {
            let mut channels: Vec<u8> = track
                .events
                .iter()
                .map(|e| e.channel)
                .filter(|&c| c != PERCUSSION_CHANNEL)
                .collect();
            channels.sort_unstable();
            channels.dedup();

            for channel in channels {
                events.push((
                    0,
                    Slot::Program,
                    TrackEventKind::Midi {
                        channel: u4::new(channel),
                        message: MidiMessage::ProgramChange {
                            program: u7::new(program),
                        },
                    },
                ));
            }
        }
    }

    for note in &track.events {
        let channel = u4::new(note.channel);
        let key = u7::new(note.pitch);
        events.push((
            beats_to_ticks(note.start_beats, ppq),
            Slot::NoteOn,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key,
                    vel: u7::new(note.velocity),
                },
            },
        ));
        events.push((
            beats_to_ticks(note.end_beats(), ppq),
            Slot::NoteOff,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key,
                    vel: u7::new(0),
                },
            },
        ));
    }

    let end = beats_to_ticks(track.end_beats(), ppq);
    to_track(events, end)
}

/// Program for a track's instrument, if it has a known one
fn track_program(track: &ArrangementTrack) -> Option<u8> {
    let instrument = track.instrument.as_deref()?;
    let program = program_number(instrument);
    if program.is_none() {
        log::warn!(
            "Instrument '{}' has no program number; track '{}' keeps the default",
            instrument,
            track.name
        );
    }
    program
}

/// Sort by absolute tick, convert to deltas and close the track
fn to_track(mut events: Vec<TimedEvent<'_>>, end_tick: u32) -> Track<'_> {
    events.sort_by_key(|(tick, slot, _)| (*tick, *slot));

    let mut track = Track::with_capacity(events.len() + 1);
    let mut last_tick = 0;
    for (tick, _, kind) in events {
        track.push(TrackEvent {
            delta: (tick - last_tick).into(),
            kind,
        });
        last_tick = tick;
    }

    track.push(TrackEvent {
        delta: end_tick.saturating_sub(last_tick).into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    track
}

/// Tempo meta message in microseconds per quarter note
fn tempo_event<'a>(bpm: u32) -> TrackEventKind<'a> {
    let us_per_quarter = 60_000_000 / bpm.max(1);
    TrackEventKind::Meta(MetaMessage::Tempo(u24::new(us_per_quarter)))
}

fn time_signature_event<'a>(time_signature: TimeSignature) -> TrackEventKind<'a> {
    // 24 MIDI clocks per click, 8 32nd notes per quarter
    TrackEventKind::Meta(MetaMessage::TimeSignature(
        time_signature.beats_per_bar.min(255) as u8,
        time_signature.beat_unit_log2(),
        24,
        8,
    ))
}
