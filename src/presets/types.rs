// Preset Type Definitions
// Per-genre defaults that fill whatever a song request leaves unspecified

use serde::{Deserialize, Serialize};

use crate::arranger::song::Section;
use crate::theory::Genre;

/// Default settings for one genre
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenrePreset {
    pub genre: Genre,

    /// Meter as an "N/M" string
    pub time_signature: String,

    pub scale: String,
    pub key: String,

    /// Instruments in track order
    pub instruments: Vec<String>,

    /// Default song structure
    pub sections: Vec<Section>,
}

impl GenrePreset {
    /// Build a preset from static table data
    pub(crate) fn from_table(
        genre: Genre,
        time_signature: &str,
        scale: &str,
        key: &str,
        instruments: &[&str],
        sections: &[(&str, u32)],
    ) -> Self {
        GenrePreset {
            genre,
            time_signature: time_signature.to_string(),
            scale: scale.to_string(),
            key: key.to_string(),
            instruments: instruments.iter().map(|s| s.to_string()).collect(),
            sections: sections
                .iter()
                .map(|(name, bars)| Section::new(*name, *bars))
                .collect(),
        }
    }

    /// One-line listing for the CLI
    pub fn summary(&self) -> PresetSummary {
        PresetSummary {
            genre: self.genre.name().to_string(),
            description: format!(
                "{} {} in {}, {} instruments, {} sections",
                self.key,
                self.scale,
                self.time_signature,
                self.instruments.len(),
                self.sections.len()
            ),
        }
    }
}

/// Genre listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetSummary {
    pub genre: String,
    pub description: String,
}
