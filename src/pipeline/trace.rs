// Generation Trace - Append-only JSONL record of a generation run
// One line for the request, one per assembled section, one for the export

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::arranger::{Arrangement, SectionReport, SongRequest};

/// Errors that can occur during trace operations
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type TraceResult<T> = Result<T, TraceError>;

/// Which step of a run an entry describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStage {
    Request,
    Section,
    Export,
}

/// A single line of the trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub timestamp: DateTime<Utc>,
    pub stage: TraceStage,

    /// Fraction of the song assembled so far [0.0, 1.0]
    pub progress: f32,

    pub message: String,

    /// Structured payload: the request, a section report, or export details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl TraceEntry {
    /// Create a new trace entry stamped with the current time
    pub fn new(stage: TraceStage, progress: f32, message: impl Into<String>) -> Self {
        TraceEntry {
            timestamp: Utc::now(),
            stage,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
            data: None,
        }
    }

    /// Attach a serializable payload
    pub fn with_data<T: Serialize>(mut self, data: &T) -> TraceResult<Self> {
        self.data = Some(serde_json::to_value(data)?);
        Ok(self)
    }

    /// Serialize to JSON line (with newline)
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }

    /// Entry recording the parameters of a run
    pub fn request(request: &SongRequest, seed: u64) -> TraceResult<Self> {
        let message = format!(
            "{} {} {} at {} BPM, seed {}",
            request.key, request.scale, request.genre, request.bpm, seed
        );
        TraceEntry::new(TraceStage::Request, 0.0, message).with_data(request)
    }

    /// Entry for one assembled section
    pub fn section(report: &SectionReport, total_beats: f64) -> TraceResult<Self> {
        let end = report.start_beats + report.length_beats;
        let progress = if total_beats > 0.0 {
            (end / total_beats) as f32
        } else {
            1.0
        };
        let notes: usize = report.notes.values().sum();
        let message = format!(
            "{}: {} beats at {} BPM, {} notes",
            report.name, report.length_beats, report.bpm, notes
        );
        TraceEntry::new(TraceStage::Section, progress, message).with_data(report)
    }

    /// Entry recording where the MIDI file went
    pub fn export(path: &Path, arrangement: &Arrangement) -> Self {
        let data = serde_json::json!({
            "path": path.display().to_string(),
            "tracks": arrangement.tracks.len(),
            "notes": arrangement.note_count(),
            "total_beats": arrangement.total_beats,
        });
        TraceEntry {
            data: Some(data),
            ..TraceEntry::new(TraceStage::Export, 1.0, format!("Wrote {}", path.display()))
        }
    }
}

/// One section entry per report, in song order
pub fn section_entries(arrangement: &Arrangement) -> TraceResult<Vec<TraceEntry>> {
    arrangement
        .sections
        .iter()
        .map(|report| TraceEntry::section(report, arrangement.total_beats))
        .collect()
}

/// Appends entries to a JSONL trace file
pub struct TraceWriter {
    file_path: PathBuf,
}

impl TraceWriter {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        TraceWriter {
            file_path: file_path.into(),
        }
    }

    /// Append one entry, creating the file if needed
    pub fn write(&self, entry: &TraceEntry) -> TraceResult<()> {
        self.write_batch(std::slice::from_ref(entry))
    }

    /// Append several entries with a single open
    pub fn write_batch(&self, entries: &[TraceEntry]) -> TraceResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        for entry in entries {
            file.write_all(entry.to_json_line()?.as_bytes())?;
        }

        file.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

/// Read trace entries back from a JSONL file, skipping blank lines
pub fn read_trace_file(path: &Path) -> TraceResult<Vec<TraceEntry>> {
    let contents = std::fs::read_to_string(path)?;
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(TraceError::from))
        .collect()
}
