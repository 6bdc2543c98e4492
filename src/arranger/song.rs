// Song Structure - Ordered named sections measured in bars
// An explicit value passed to the assembler; editing it never touches shared state

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::presets;
use crate::theory::Genre;

/// A named, bar-length segment of a song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,

    /// Length in bars
    pub bars: u32,
}

impl Section {
    /// Create a new section
    pub fn new(name: impl Into<String>, bars: u32) -> Self {
        Section {
            name: name.into(),
            bars,
        }
    }

    /// Length in beats for a given meter, saturating at `u32::MAX`
    pub fn length_beats(&self, beats_per_bar: u32) -> u32 {
        self.bars.saturating_mul(beats_per_bar)
    }

    /// Length in beats, or `None` if it does not fit in a `u32`
    pub fn checked_length_beats(&self, beats_per_bar: u32) -> Option<u32> {
        self.bars.checked_mul(beats_per_bar)
    }

    pub fn kind(&self) -> SectionKind {
        SectionKind::from_name(&self.name)
    }
}

/// Parses `Name:bars`, e.g. `Chorus:8`
impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, bars) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("Section '{}' must look like NAME:BARS", s))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("Section '{}' has no name", s));
        }
        let bars = bars
            .trim()
            .parse()
            .map_err(|_| format!("Section '{}' has an invalid bar count", s))?;
        Ok(Section::new(name, bars))
    }
}

/// Section roles the assembler reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Slower tempo when dynamic tempo is on
    Intro,

    /// Slowest tempo, decrescendo harmony
    Outro,

    /// Triggers key modulation
    Bridge,

    Other,
}

impl SectionKind {
    /// Classify a section by name (case-insensitive)
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "intro" => SectionKind::Intro,
            "outro" => SectionKind::Outro,
            "bridge" => SectionKind::Bridge,
            _ => SectionKind::Other,
        }
    }
}

/// Ordered list of sections forming a song
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongStructure {
    sections: Vec<Section>,
}

impl SongStructure {
    /// Create an empty structure
    pub fn new() -> Self {
        SongStructure::default()
    }

    pub fn from_sections(sections: Vec<Section>) -> Self {
        SongStructure { sections }
    }

    /// Load the default sections for a genre
    pub fn from_genre(genre: Genre) -> Self {
        let structure = SongStructure::from_sections(presets::default_sections(genre));
        log::info!(
            "Loaded sections for genre '{}': {:?}",
            genre,
            structure.sections.iter().map(|s| (&s.name, s.bars)).collect::<Vec<_>>()
        );
        structure
    }

    /// Append a section at the end
    pub fn add_section(&mut self, name: impl Into<String>, bars: u32) {
        self.sections.push(Section::new(name, bars));
    }

    /// Remove the section at `index`. Out-of-range indices are ignored.
    pub fn remove_section(&mut self, index: usize) -> Option<Section> {
        if index < self.sections.len() {
            Some(self.sections.remove(index))
        } else {
            None
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn total_bars(&self) -> u32 {
        self.sections.iter().fold(0, |total, s| total.saturating_add(s.bars))
    }

    /// Total song length in beats: sum of bars × beats per bar
    pub fn total_beats(&self, beats_per_bar: u32) -> u32 {
        self.sections
            .iter()
            .fold(0, |total, s| total.saturating_add(s.length_beats(beats_per_bar)))
    }

    /// Total song length in beats, or `None` on overflow
    pub fn checked_total_beats(&self, beats_per_bar: u32) -> Option<u32> {
        self.sections.iter().try_fold(0u32, |total, s| {
            total.checked_add(s.checked_length_beats(beats_per_bar)?)
        })
    }
}
