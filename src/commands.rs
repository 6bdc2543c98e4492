// Songsmith Commands
// Builds song requests from config files, flags and presets, then runs generation
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::arranger::{self, Features, MidiExportOptions, Section, SectionReport, SongRequest, SongStructure};
use crate::pipeline::{section_entries, TraceEntry, TraceWriter};
use crate::presets::{self, PresetSummary};
use crate::theory::{self, Genre};

#[derive(Debug, Serialize)]
pub struct CommandError {
    message: String,
}

impl<E: std::fmt::Display> From<E> for CommandError {
    fn from(error: E) -> Self {
        CommandError {
            message: error.to_string(),
        }
    }
}

impl CommandError {
    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

pub const DEFAULT_BPM: u32 = 120;
pub const DEFAULT_FILE_NAME: &str = "song.mid";

// ==================== GENERATE ====================

/// Feature switches from the command line; each can only turn a feature on,
/// except `no_percussion`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub dynamic_tempo: bool,
    pub dynamics: bool,
    pub modulation: bool,
    pub ornamentation: bool,
    pub countermelody: bool,
    pub no_percussion: bool,
}

impl FeatureFlags {
    fn apply(&self, features: &mut Features) {
        features.dynamic_tempo |= self.dynamic_tempo;
        features.dynamics |= self.dynamics;
        features.modulation |= self.modulation;
        features.ornamentation |= self.ornamentation;
        features.countermelody |= self.countermelody;
        if self.no_percussion {
            features.percussion = false;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenerateInput {
    /// JSON request file, overridden by the fields below
    pub config: Option<PathBuf>,

    pub file_name: Option<String>,
    pub genre: Option<String>,
    pub key: Option<String>,
    pub scale: Option<String>,
    pub bpm: Option<u32>,
    pub time_signature: Option<String>,
    pub instruments: Vec<String>,
    pub sections: Vec<Section>,
    pub progression: Vec<String>,
    pub seed: Option<u64>,
    pub features: FeatureFlags,

    /// Append a JSONL trace of the run here
    pub trace: Option<PathBuf>,
}

/// A request file where every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RequestFile {
    pub file_name: Option<String>,
    pub genre: Option<String>,
    pub key: Option<String>,
    pub scale: Option<String>,
    pub bpm: Option<u32>,
    pub time_signature: Option<String>,
    pub instruments: Option<Vec<String>>,
    pub sections: Option<SongStructure>,
    pub progression: Option<Vec<String>>,
    pub seed: Option<u64>,
    pub features: Option<Features>,
}

/// Load a JSON request file
pub fn load_request_file(path: &Path) -> CommandResult<RequestFile> {
    let contents = std::fs::read_to_string(path).map_err(|e| CommandError {
        message: format!("Failed to read config '{}': {}", path.display(), e),
    })?;
    serde_json::from_str(&contents).map_err(|e| CommandError {
        message: format!("Invalid config '{}': {}", path.display(), e),
    })
}

/// Merge flags over the config file over the genre presets
pub fn build_request(input: &GenerateInput) -> CommandResult<SongRequest> {
    let file = match &input.config {
        Some(path) => load_request_file(path)?,
        None => RequestFile::default(),
    };

    let genre_name = input
        .genre
        .clone()
        .or(file.genre)
        .unwrap_or_else(|| Genre::Pop.name().to_string());
    let genre = Genre::from_string(&genre_name);
    let preset = presets::get_defaults(genre);

    let instruments = match (input.instruments.is_empty(), file.instruments) {
        (false, _) => input.instruments.clone(),
        (true, Some(instruments)) => instruments,
        (true, None) => preset.instruments,
    };

    let sections = match (input.sections.is_empty(), file.sections) {
        (false, _) => SongStructure::from_sections(input.sections.clone()),
        (true, Some(sections)) => sections,
        (true, None) => SongStructure::from_sections(preset.sections),
    };

    let progression = if input.progression.is_empty() {
        file.progression
    } else {
        Some(input.progression.clone())
    };

    let mut features = file.features.unwrap_or_default();
    input.features.apply(&mut features);

    Ok(SongRequest {
        file_name: input
            .file_name
            .clone()
            .or(file.file_name)
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
        bpm: input.bpm.or(file.bpm).unwrap_or(DEFAULT_BPM),
        time_signature: input
            .time_signature
            .clone()
            .or(file.time_signature)
            .unwrap_or(preset.time_signature),
        scale: input.scale.clone().or(file.scale).unwrap_or(preset.scale),
        key: input.key.clone().or(file.key).unwrap_or(preset.key),
        genre: genre.name().to_string(),
        instruments,
        sections,
        progression,
        seed: input.seed.or(file.seed),
        features,
    })
}

/// Seed from the wall clock when none was given
pub fn seed_from_clock() -> u64 {
    let now = chrono::Utc::now();
    now.timestamp_nanos_opt()
        .map(|nanos| nanos as u64)
        .unwrap_or_else(|| now.timestamp() as u64)
}

#[derive(Debug, Serialize)]
pub struct GenerateOutput {
    pub path: PathBuf,
    pub seed: u64,
    pub tracks: usize,
    pub notes: usize,
    pub total_beats: f64,
    pub sections: Vec<SectionReport>,
}

pub fn generate_command(input: GenerateInput) -> CommandResult<GenerateOutput> {
    let request = build_request(&input)?;
    let seed = request.seed.unwrap_or_else(seed_from_clock);
    log::info!("Using seed {} (pass --seed {} to reproduce)", seed, seed);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let arrangement = arranger::compose(&request, &mut rng)?;

    let path = PathBuf::from(&request.file_name);
    arranger::write_midi(&arrangement, &path, &MidiExportOptions::default())?;

    if let Some(trace_path) = &input.trace {
        let writer = TraceWriter::new(trace_path);
        let mut entries = vec![TraceEntry::request(&request, seed)?];
        entries.extend(section_entries(&arrangement)?);
        entries.push(TraceEntry::export(&path, &arrangement));
        writer.write_batch(&entries)?;
        log::info!("Trace appended to {}", writer.path().display());
    }

    Ok(GenerateOutput {
        path,
        seed,
        tracks: arrangement.tracks.len(),
        notes: arrangement.note_count(),
        total_beats: arrangement.total_beats,
        sections: arrangement.sections,
    })
}

// ==================== LISTINGS ====================

pub fn list_genres() -> Vec<PresetSummary> {
    presets::list_genres()
}

pub fn list_keys() -> Vec<String> {
    theory::KEYS.iter().map(|k| k.to_string()).collect()
}

pub fn list_scales() -> Vec<String> {
    theory::scale_names().into_iter().map(String::from).collect()
}

/// Instrument names with their GM program numbers
pub fn list_instruments() -> Vec<(String, u8)> {
    presets::INSTRUMENT_MAP
        .iter()
        .map(|(name, program)| (name.to_string(), *program))
        .collect()
}

/// Default sections for a genre; unknown genres are an error here
pub fn list_sections(genre: &str) -> CommandResult<Vec<Section>> {
    let genre = Genre::parse(genre).ok_or_else(|| CommandError {
        message: format!("Unknown genre '{}'", genre),
    })?;
    Ok(presets::default_sections(genre))
}
