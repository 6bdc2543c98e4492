// Section Assembler - Drives the composition engine section by section
// Owns the time cursor, the current key and tempo, and the fixed role-to-track layout

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use super::song::{Section, SectionKind, SongStructure};
use super::tracks::{Arrangement, NoteEvent, Track};
use crate::compose::{
    derive_bass_line, generate_countermelody, generate_melody, generate_pattern,
    generate_progression, is_silent, ornament, render_harmony, shape_dynamics, HarmonyPlacement,
    MelodyLine, Progression, ProgressionError,
};
use crate::compose::harmony::HARMONY_VELOCITY;
use crate::presets;
use crate::theory::{modulate, resolve, Genre, Pitch, Scale, ScaleError, TimeSignature};

/// Accepted tempo range
pub const MIN_BPM: u32 = 60;
pub const MAX_BPM: u32 = 240;

/// Longest song the assembler will lay out
pub const MAX_SONG_BEATS: u32 = 1 << 16;

/// Semitones the key rises at each bridge when modulation is on
pub const BRIDGE_MODULATION: Pitch = 2;

const MELODY_VELOCITY: i32 = 100;
const FILLER_VELOCITY: i32 = 90;
const BASS_VELOCITY: i32 = 70;
const PERCUSSION_VELOCITY: i32 = 70;
const COUNTERMELODY_VELOCITY: i32 = 90;

/// General MIDI percussion channel
pub const PERCUSSION_CHANNEL: u8 = 9;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Scale(#[from] ScaleError),

    #[error(transparent)]
    Progression(#[from] ProgressionError),
}

pub type ComposeResult<T> = Result<T, ComposeError>;

/// Optional generation features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Slower Intro/Outro tempos
    pub dynamic_tempo: bool,

    /// Crescendo/decrescendo on harmony velocities
    pub dynamics: bool,

    /// Raise the key at every Bridge
    pub modulation: bool,

    /// Trills and grace notes on the melody
    pub ornamentation: bool,

    pub countermelody: bool,
    pub percussion: bool,
}

impl Default for Features {
    fn default() -> Self {
        Features {
            dynamic_tempo: false,
            dynamics: false,
            modulation: false,
            ornamentation: false,
            countermelody: false,
            percussion: true,
        }
    }
}

/// Every parameter of one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongRequest {
    pub file_name: String,
    pub bpm: u32,

    /// Meter as an "N/M" string
    pub time_signature: String,

    pub scale: String,
    pub key: String,
    pub genre: String,

    /// Instrument names; the count switches the filler and bass lines on
    pub instruments: Vec<String>,

    pub sections: SongStructure,

    /// Explicit chord labels, otherwise four are drawn from the genre table
    #[serde(default)]
    pub progression: Option<Vec<String>>,

    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub features: Features,
}

impl SongRequest {
    /// Build a request entirely from a genre's presets
    pub fn from_genre(genre: Genre, bpm: u32) -> Self {
        let preset = presets::get_defaults(genre);
        SongRequest {
            file_name: "song.mid".to_string(),
            bpm,
            time_signature: preset.time_signature,
            scale: preset.scale,
            key: preset.key,
            genre: genre.name().to_string(),
            instruments: preset.instruments,
            sections: SongStructure::from_sections(preset.sections),
            progression: None,
            seed: None,
            features: Features::default(),
        }
    }

    /// Check everything that can fail before any generation starts
    pub fn validate(&self) -> ComposeResult<TimeSignature> {
        if self.sections.is_empty() {
            return Err(ComposeError::Validation(
                "The sections list is empty. Provide at least one section.".to_string(),
            ));
        }
        if self.instruments.is_empty() {
            return Err(ComposeError::Validation(
                "The instruments list is empty. Provide at least one instrument.".to_string(),
            ));
        }
        if !(MIN_BPM..=MAX_BPM).contains(&self.bpm) {
            return Err(ComposeError::Validation(format!(
                "BPM {} is outside {}-{}",
                self.bpm, MIN_BPM, MAX_BPM
            )));
        }
        let time_signature = self
            .time_signature
            .parse::<TimeSignature>()
            .map_err(|e| ComposeError::Validation(e.to_string()))?;

        if let Some(empty) = self.sections.sections().iter().find(|s| s.bars == 0) {
            return Err(ComposeError::Validation(format!(
                "Section '{}' has no bars",
                empty.name
            )));
        }
        match self.sections.checked_total_beats(time_signature.beats_per_bar) {
            Some(beats) if beats <= MAX_SONG_BEATS => Ok(time_signature),
            _ => Err(ComposeError::Validation(format!(
                "The song is longer than {} beats",
                MAX_SONG_BEATS
            ))),
        }
    }
}

/// Content roles, each bound to a fixed track and channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Melody,
    Harmony,
    Filler,
    Bass,
    Percussion,
    Countermelody,
}

impl Role {
    /// Display name used for tracks without an instrument
    pub fn label(&self) -> &'static str {
        match self {
            Role::Melody => "Melody",
            Role::Harmony => "Harmony",
            Role::Filler => "Filler",
            Role::Bass => "Bass",
            Role::Percussion => "Percussion",
            Role::Countermelody => "Countermelody",
        }
    }
}

/// What one section contributed to the arrangement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionReport {
    pub name: String,
    pub start_beats: f64,
    pub length_beats: f64,
    pub bpm: u32,

    /// True when the key rose on entering this section
    pub modulated: bool,

    /// Notes emitted per role
    pub notes: BTreeMap<Role, usize>,

    /// Enabled roles that produced nothing
    pub skipped: Vec<Role>,
}

/// Track indices for every role.
///
/// Percussion and countermelody share the last track and differ only by
/// channel, which keeps the legacy layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TrackLayout {
    count: usize,
    instrument_count: usize,
}

impl TrackLayout {
    fn new(request: &SongRequest) -> Self {
        let instrument_count = request.instruments.len();
        let extra = request.features.countermelody as usize + request.features.percussion as usize;
        TrackLayout {
            count: (instrument_count + extra).max(2),
            instrument_count,
        }
    }

    fn last(&self) -> usize {
        self.count - 1
    }

    fn has_filler(&self) -> bool {
        self.instrument_count >= 3
    }

    fn has_bass(&self) -> bool {
        self.instrument_count >= 4
    }

    /// Roles written to a track that has no instrument of its own
    fn roles(&self, index: usize, features: Features) -> Vec<Role> {
        let mut roles = Vec::new();
        if index == 0 {
            roles.push(Role::Melody);
        }
        if index == 1 {
            roles.push(Role::Harmony);
        }
        if index == self.last() {
            if features.percussion {
                roles.push(Role::Percussion);
            }
            if features.countermelody {
                roles.push(Role::Countermelody);
            }
        }
        roles
    }

    fn tracks(&self, request: &SongRequest) -> Vec<Track> {
        (0..self.count)
            .map(|index| match request.instruments.get(index) {
                Some(instrument) => Track::new(index, instrument.clone(), Some(instrument.clone())),
                None => {
                    let roles = self.roles(index, request.features);
                    let name = if roles.is_empty() {
                        "Spare".to_string()
                    } else {
                        roles.iter().map(Role::label).collect::<Vec<_>>().join(" + ")
                    };
                    Track::new(index, name, None)
                }
            })
            .collect()
    }
}

/// Mutable state carried from one section to the next
struct AssemblyState {
    cursor: f64,
    scale: Scale,
    progression: Progression,
}

/// Assemble a complete arrangement from a request.
///
/// Validation and key resolution happen before any random draw; a failure
/// there returns no partial output.
pub fn compose(request: &SongRequest, rng: &mut impl Rng) -> ComposeResult<Arrangement> {
    let time_signature = request.validate()?;
    let genre = Genre::from_string(&request.genre);
    let scale = resolve(&request.key, &request.scale)?;
    let progression = generate_progression(&scale, genre, request.progression.as_deref(), rng)?;

    log::info!(
        "Composing {} {} {} at {} BPM in {}, {} sections, {} instruments",
        request.key,
        request.scale,
        genre,
        request.bpm,
        time_signature,
        request.sections.len(),
        request.instruments.len()
    );

    let layout = TrackLayout::new(request);
    let mut arrangement = Arrangement::new(layout.tracks(request), time_signature, genre);
    let mut state = AssemblyState {
        cursor: 0.0,
        scale,
        progression,
    };

    for section in request.sections.sections() {
        let report = assemble_section(
            section,
            request,
            genre,
            time_signature,
            layout,
            &mut state,
            &mut arrangement,
            rng,
        );
        log::debug!(
            "Section '{}' at beat {}: {:?}",
            report.name,
            report.start_beats,
            report.notes
        );
        arrangement.sections.push(report);
    }

    arrangement.total_beats = state.cursor;
    for track in &mut arrangement.tracks {
        track.sort_by_time();
    }

    log::info!(
        "Composed {} notes over {} beats",
        arrangement.note_count(),
        arrangement.total_beats
    );

    Ok(arrangement)
}

/// Tempo for a section under the dynamic-tempo rule
pub fn section_bpm(kind: SectionKind, bpm: u32, dynamic_tempo: bool) -> u32 {
    if !dynamic_tempo {
        return bpm;
    }
    match kind {
        SectionKind::Intro => bpm.saturating_sub(10),
        SectionKind::Outro => bpm.saturating_sub(20),
        _ => bpm,
    }
}

#[allow(clippy::too_many_arguments)]
fn assemble_section(
    section: &Section,
    request: &SongRequest,
    genre: Genre,
    time_signature: TimeSignature,
    layout: TrackLayout,
    state: &mut AssemblyState,
    arrangement: &mut Arrangement,
    rng: &mut impl Rng,
) -> SectionReport {
    let features = request.features;
    let kind = section.kind();
    let start = state.cursor;
    let length = section.length_beats(time_signature.beats_per_bar) as usize;

    let bpm = section_bpm(kind, request.bpm, features.dynamic_tempo);
    arrangement.add_tempo(start, bpm);

    let modulated = features.modulation && kind == SectionKind::Bridge;
    if modulated {
        state.scale = modulate(&state.scale, BRIDGE_MODULATION);
        for chord in &mut state.progression {
            for pitch in chord.iter_mut() {
                *pitch += BRIDGE_MODULATION;
            }
        }
        log::info!(
            "Modulating up {} semitones at '{}' (root now {})",
            BRIDGE_MODULATION,
            section.name,
            state.scale.root()
        );
    }

    let mut notes = BTreeMap::new();
    let mut skipped = Vec::new();

    // Melody
    let melody = generate_melody(genre, &state.scale, length, rng);
    let events = melody_events(&melody, genre, start, features.ornamentation, rng);
    notes.insert(Role::Melody, arrangement.add_events(events));

    // Harmony, stretched across the section
    let chord_count = state.progression.len();
    let chord_beats = slot_length(length, chord_count);
    let base_velocities: Vec<u8> = if features.dynamics {
        let crescendo = kind != SectionKind::Outro;
        (0..chord_count)
            .map(|i| shape_dynamics(HARMONY_VELOCITY, i as f64 / chord_count as f64, crescendo, rng))
            .collect()
    } else {
        Vec::new()
    };
    let placement = HarmonyPlacement {
        track: 1,
        channel: 1,
        start_beats: start,
        chord_beats,
    };
    let events = render_harmony(&state.progression, genre, placement, &base_velocities, rng);
    notes.insert(Role::Harmony, arrangement.add_events(events));

    // Rhythm filler
    if layout.has_filler() {
        let filler = generate_melody(genre, &state.scale, length, rng);
        let events = filler
            .iter()
            .enumerate()
            .filter_map(|(beat, pitch)| {
                pitch.map(|p| NoteEvent::new(2, 2, p, start + beat as f64, 1.0, FILLER_VELOCITY))
            })
            .collect();
        notes.insert(Role::Filler, arrangement.add_events(events));
    }

    // Bass, one root per chord slot
    if layout.has_bass() {
        let events = derive_bass_line(&state.progression)
            .into_iter()
            .enumerate()
            .map(|(i, p)| NoteEvent::new(3, 3, p, start + i as f64 * chord_beats, chord_beats, BASS_VELOCITY))
            .collect();
        notes.insert(Role::Bass, arrangement.add_events(events));
    }

    // Percussion
    if features.percussion {
        let pattern = generate_pattern(genre, length);
        if is_silent(&pattern) {
            log::warn!("The percussion pattern for '{}' is empty. Skipping percussion.", section.name);
            skipped.push(Role::Percussion);
        } else {
            let events = percussion_events(&pattern, layout.last(), start);
            notes.insert(Role::Percussion, arrangement.add_events(events));
        }
    }

    // Countermelody
    if features.countermelody {
        let countermelody = generate_countermelody(&state.scale, length, rng);
        if countermelody.is_empty() {
            log::warn!("The countermelody for '{}' is empty. Skipping countermelody.", section.name);
            skipped.push(Role::Countermelody);
        } else {
            let track = layout.last();
            let events = countermelody
                .iter()
                .enumerate()
                .map(|(beat, &p)| NoteEvent::new(track, 0, p, start + beat as f64, 1.0, COUNTERMELODY_VELOCITY))
                .collect();
            notes.insert(Role::Countermelody, arrangement.add_events(events));
        }
    }

    state.cursor += length as f64;

    SectionReport {
        name: section.name.clone(),
        start_beats: start,
        length_beats: length as f64,
        bpm,
        modulated,
        notes,
        skipped,
    }
}

/// Beats per chord when `count` chords share a section of `length` beats
fn slot_length(length: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        length as f64 / count as f64
    }
}

/// One-beat melody notes on track 0; ornaments split their beat evenly
fn melody_events(
    melody: &MelodyLine,
    genre: Genre,
    start: f64,
    ornamentation: bool,
    rng: &mut impl Rng,
) -> Vec<NoteEvent> {
    let mut events = Vec::new();
    for (beat, pitch) in melody.iter().enumerate() {
        let Some(pitch) = *pitch else { continue };
        let beat_start = start + beat as f64;

        let figure = if ornamentation {
            ornament(pitch, genre, rng)
        } else {
            vec![pitch]
        };
        let step = 1.0 / figure.len() as f64;
        for (j, p) in figure.into_iter().enumerate() {
            events.push(NoteEvent::new(0, 0, p, beat_start + j as f64 * step, step, MELODY_VELOCITY));
        }
    }
    events
}

/// Percussion hits: the four slots of each beat sound together
fn percussion_events(pattern: &[Option<u8>], track: usize, start: f64) -> Vec<NoteEvent> {
    pattern
        .iter()
        .enumerate()
        .filter_map(|(j, hit)| {
            hit.map(|key| {
                NoteEvent::new(
                    track,
                    PERCUSSION_CHANNEL,
                    key as Pitch,
                    start + (j / 4) as f64,
                    1.0,
                    PERCUSSION_VELOCITY,
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn request(genre: Genre, sections: &[(&str, u32)], instruments: &[&str]) -> SongRequest {
        let mut request = SongRequest::from_genre(genre, 120);
        request.time_signature = "4/4".to_string();
        request.key = "C".to_string();
        request.scale = "Major".to_string();
        request.instruments = instruments.iter().map(|s| s.to_string()).collect();
        request.sections = SongStructure::from_sections(
            sections.iter().map(|(n, b)| Section::new(*n, *b)).collect(),
        );
        request
    }

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn test_final_cursor_is_section_sum() {
        let sections = [("Intro", 4), ("Verse", 8), ("Bridge", 2), ("Outro", 3)];
        for seed in 0..10 {
            let mut req = request(Genre::Classical, &sections, &["Piano", "Violin", "Cello", "Bass"]);
            req.features = Features {
                dynamic_tempo: seed % 2 == 0,
                dynamics: seed % 3 == 0,
                modulation: true,
                ornamentation: seed % 2 == 1,
                countermelody: true,
                percussion: seed % 4 != 0,
            };
            let arrangement = compose(&req, &mut rng(seed)).unwrap();
            assert_eq!(arrangement.total_beats, 68.0);
            assert_eq!(arrangement.sections.len(), 4);
        }
    }

    #[test]
    fn test_intro_section_length() {
        let req = request(Genre::Pop, &[("Intro", 4)], &["Piano", "Bass"]);
        let arrangement = compose(&req, &mut rng(1)).unwrap();

        let report = &arrangement.sections[0];
        assert_eq!(report.length_beats, 16.0);
        assert_eq!(arrangement.total_beats, 16.0);

        // Melody notes land on whole beats inside the section
        let melody = &arrangement.tracks[0].events;
        assert!(melody.len() <= 16);
        assert!(melody.iter().all(|e| e.start_beats < 16.0 && e.start_beats.fract() == 0.0));
    }

    #[test]
    fn test_empty_instruments_fails_before_generation() {
        let req = request(Genre::Pop, &[("Verse", 8)], &[]);
        let result = compose(&req, &mut rng(0));
        assert!(matches!(result, Err(ComposeError::Validation(_))));
    }

    #[test]
    fn test_empty_sections_fails() {
        let req = request(Genre::Pop, &[], &["Piano"]);
        assert!(matches!(compose(&req, &mut rng(0)), Err(ComposeError::Validation(_))));
    }

    #[test]
    fn test_bad_parameters() {
        let mut req = request(Genre::Pop, &[("Verse", 8)], &["Piano"]);
        req.bpm = 300;
        assert!(matches!(compose(&req, &mut rng(0)), Err(ComposeError::Validation(_))));

        let mut req = request(Genre::Pop, &[("Verse", 8)], &["Piano"]);
        req.time_signature = "four".to_string();
        assert!(matches!(compose(&req, &mut rng(0)), Err(ComposeError::Validation(_))));

        let mut req = request(Genre::Pop, &[("Verse", 8)], &["Piano"]);
        req.key = "H".to_string();
        assert!(matches!(compose(&req, &mut rng(0)), Err(ComposeError::Scale(ScaleError::InvalidKey(_)))));

        let mut req = request(Genre::Pop, &[("Verse", 8)], &["Piano"]);
        req.progression = Some(vec!["XIV".to_string()]);
        assert!(matches!(compose(&req, &mut rng(0)), Err(ComposeError::Progression(_))));
    }

    #[test]
    fn test_role_tracks_and_channels() {
        let mut req = request(
            Genre::Classical,
            &[("Verse", 4)],
            &["Piano", "Strings", "Flute", "Cello"],
        );
        req.features.countermelody = true;
        let arrangement = compose(&req, &mut rng(7)).unwrap();

        // 4 instruments + countermelody + percussion
        assert_eq!(arrangement.tracks.len(), 6);
        assert!(arrangement.tracks[0].events.iter().all(|e| e.channel == 0));
        assert!(arrangement.tracks[1].events.iter().all(|e| e.channel == 1));
        assert!(arrangement.tracks[2].events.iter().all(|e| e.channel == 2));
        assert!(arrangement.tracks[3].events.iter().all(|e| e.channel == 3));
        assert!(arrangement.tracks[4].events.is_empty());

        // Percussion and countermelody share the last track
        let last = &arrangement.tracks[5];
        assert!(last.events.iter().any(|e| e.channel == PERCUSSION_CHANNEL));
        assert_eq!(last.events.iter().filter(|e| e.channel == 0).count(), 16);
    }

    #[test]
    fn test_zero_bar_section_is_rejected() {
        let req = request(Genre::Pop, &[("Verse", 1), ("Break", 0), ("Chorus", 1)], &["Piano", "Pad"]);
        match compose(&req, &mut rng(0)) {
            Err(ComposeError::Validation(message)) => assert!(message.contains("Break")),
            other => panic!("expected a validation error, got {:?}", other.map(|a| a.note_count())),
        }
    }

    #[test]
    fn test_oversized_song_is_rejected() {
        let req = request(Genre::Pop, &[("Verse", u32::MAX / 2)], &["Piano"]);
        assert!(matches!(compose(&req, &mut rng(0)), Err(ComposeError::Validation(_))));

        let bars = MAX_SONG_BEATS / 4;
        let req = request(Genre::Pop, &[("Verse", bars), ("Outro", 1)], &["Piano"]);
        assert!(matches!(req.validate(), Err(ComposeError::Validation(_))));

        let req = request(Genre::Pop, &[("Verse", bars)], &["Piano"]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_shared_tracks_are_named_by_role() {
        let mut req = request(Genre::Pop, &[("Verse", 1)], &["Piano"]);
        req.features.countermelody = true;
        let arrangement = compose(&req, &mut rng(4)).unwrap();
        let names: Vec<&str> = arrangement.tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Piano", "Harmony", "Percussion + Countermelody"]);

        req.features.countermelody = false;
        let arrangement = compose(&req, &mut rng(4)).unwrap();
        let names: Vec<&str> = arrangement.tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Piano", "Harmony + Percussion"]);

        let mut req = request(Genre::Pop, &[("Verse", 1)], &["Piano", "Pad"]);
        req.features.countermelody = true;
        let arrangement = compose(&req, &mut rng(4)).unwrap();
        let names: Vec<&str> = arrangement.tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Piano", "Pad", "Spare", "Percussion + Countermelody"]);
    }

    #[test]
    fn test_optional_lines_follow_instrument_count() {
        let req = request(Genre::Jazz, &[("Head", 2)], &["Saxophone", "Piano"]);
        let arrangement = compose(&req, &mut rng(3)).unwrap();
        let report = &arrangement.sections[0];
        assert!(!report.notes.contains_key(&Role::Filler));
        assert!(!report.notes.contains_key(&Role::Bass));

        let req = request(Genre::Jazz, &[("Head", 2)], &["Saxophone", "Piano", "Bass", "Drums"]);
        let arrangement = compose(&req, &mut rng(3)).unwrap();
        let report = &arrangement.sections[0];
        assert!(report.notes.contains_key(&Role::Filler));
        assert_eq!(report.notes[&Role::Bass], 4);
    }

    #[test]
    fn test_bass_stretches_across_section() {
        let mut req = request(Genre::User, &[("Verse", 4)], &["Piano", "Pad", "Guitar", "Bass"]);
        req.progression = Some(vec!["I".into(), "IV".into(), "V".into(), "I".into()]);
        let arrangement = compose(&req, &mut rng(5)).unwrap();

        let starts: Vec<f64> = arrangement.tracks[3].events.iter().map(|e| e.start_beats).collect();
        assert_eq!(starts, vec![0.0, 4.0, 8.0, 12.0]);
        assert!(arrangement.tracks[3].events.iter().all(|e| e.duration_beats == 4.0));
    }

    #[test]
    fn test_silent_percussion_is_skipped() {
        let req = request(Genre::Rock, &[("Verse", 2)], &["Guitar"]);
        let arrangement = compose(&req, &mut rng(2)).unwrap();
        assert_eq!(arrangement.sections[0].skipped, vec![Role::Percussion]);
        assert!(!arrangement.sections[0].notes.contains_key(&Role::Percussion));
        assert!(arrangement.events().all(|e| e.channel != PERCUSSION_CHANNEL));
    }

    #[test]
    fn test_percussion_stays_inside_section() {
        let req = request(Genre::Classical, &[("Verse", 2), ("Coda", 1)], &["Piano"]);
        let arrangement = compose(&req, &mut rng(2)).unwrap();

        let percussion: Vec<&NoteEvent> = arrangement
            .events()
            .filter(|e| e.channel == PERCUSSION_CHANNEL)
            .collect();
        assert!(!percussion.is_empty());
        assert!(percussion.iter().all(|e| e.start_beats < 12.0));
        assert!(percussion.iter().all(|e| e.velocity == 70));
    }

    #[test]
    fn test_dynamic_tempo() {
        let mut req = request(Genre::Pop, &[("Intro", 1), ("Verse", 1), ("OUTRO", 1)], &["Piano"]);
        req.bpm = 100;
        req.features.dynamic_tempo = true;
        let arrangement = compose(&req, &mut rng(0)).unwrap();

        let tempos: Vec<(f64, u32)> = arrangement
            .tempo_changes
            .iter()
            .map(|t| (t.start_beats, t.bpm))
            .collect();
        assert_eq!(tempos, vec![(0.0, 90), (4.0, 100), (8.0, 80)]);

        req.features.dynamic_tempo = false;
        let arrangement = compose(&req, &mut rng(0)).unwrap();
        assert!(arrangement.tempo_changes.iter().all(|t| t.bpm == 100));
    }

    #[test]
    fn test_bridge_modulation_is_permanent() {
        let mut req = request(
            Genre::User,
            &[("Verse", 2), ("Bridge", 2), ("Chorus", 2)],
            &["Piano", "Pad", "Guitar", "Bass"],
        );
        req.progression = Some(vec!["I".into()]);
        req.features.modulation = true;
        let arrangement = compose(&req, &mut rng(11)).unwrap();

        let flags: Vec<bool> = arrangement.sections.iter().map(|s| s.modulated).collect();
        assert_eq!(flags, vec![false, true, false]);

        // The bass root follows the key from the bridge onward
        let bass = &arrangement.tracks[3].events;
        assert_eq!(bass.len(), 3);
        assert_eq!(bass[1].pitch, bass[0].pitch + 2);
        assert_eq!(bass[2].pitch, bass[1].pitch);
    }

    #[test]
    fn test_ornaments_subdivide_the_beat() {
        let mut req = request(Genre::Classical, &[("Verse", 8)], &["Piano"]);
        req.features.ornamentation = true;
        req.features.percussion = false;
        let arrangement = compose(&req, &mut rng(9)).unwrap();

        let melody = &arrangement.tracks[0].events;
        assert!(melody.iter().any(|e| e.duration_beats < 1.0));
        for event in melody {
            let beat = event.start_beats.floor();
            assert!(event.end_beats() <= beat + 1.0 + 1e-9);
        }
    }

    #[test]
    fn test_unknown_genre_falls_back() {
        let mut req = request(Genre::Pop, &[("Verse", 1)], &["Piano"]);
        req.genre = "Polka".to_string();
        let arrangement = compose(&req, &mut rng(0)).unwrap();
        assert_eq!(arrangement.genre, Genre::Pop);
    }

    #[test]
    fn test_same_seed_same_song() {
        let req = request(Genre::Jazz, &[("Head", 4), ("Solo", 4)], &["Sax", "Piano", "Bass", "Drums"]);
        let a = compose(&req, &mut rng(42)).unwrap();
        let b = compose(&req, &mut rng(42)).unwrap();
        let pitches = |arr: &Arrangement| arr.events().map(|e| (e.pitch, e.velocity)).collect::<Vec<_>>();
        assert_eq!(pitches(&a), pitches(&b));
    }

    #[test]
    fn test_request_json_defaults() {
        let json = r#"{
            "file_name": "out.mid",
            "bpm": 120,
            "time_signature": "4/4",
            "scale": "Major",
            "key": "C",
            "genre": "Pop",
            "instruments": ["Piano"],
            "sections": [{"name": "Verse", "bars": 8}]
        }"#;
        let req: SongRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.features, Features::default());
        assert!(req.features.percussion);
        assert_eq!(req.sections.total_bars(), 8);
        assert!(req.progression.is_none());
    }
}
