// Musical Time - Time signature parsing
// Beats per bar drives section lengths; the beat unit only matters for export

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeSignatureError {
    #[error("Time signature '{0}' must look like N/M")]
    Malformed(String),
    #[error("Time signature '{0}' needs at least one beat per bar")]
    NoBeats(String),
    #[error("Time signature '{0}' has a beat unit that is not a power of two")]
    BadBeatUnit(String),
}

/// Musical time signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Number of beats per bar (numerator)
    pub beats_per_bar: u32,

    /// Note value that gets one beat (denominator, 4 = quarter note)
    pub beat_unit: u32,
}

impl TimeSignature {
    pub const FOUR_FOUR: TimeSignature = TimeSignature {
        beats_per_bar: 4,
        beat_unit: 4,
    };

    /// Beat unit as a power of two, the form MIDI stores it in
    pub fn beat_unit_log2(&self) -> u8 {
        self.beat_unit.trailing_zeros() as u8
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        TimeSignature::FOUR_FOUR
    }
}

impl FromStr for TimeSignature {
    type Err = TimeSignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TimeSignatureError::Malformed(s.to_string());

        let (numerator, denominator) = s.trim().split_once('/').ok_or_else(malformed)?;
        let beats_per_bar: u32 = numerator.trim().parse().map_err(|_| malformed())?;
        let beat_unit: u32 = denominator.trim().parse().map_err(|_| malformed())?;

        if beats_per_bar == 0 {
            return Err(TimeSignatureError::NoBeats(s.to_string()));
        }
        if !beat_unit.is_power_of_two() || beat_unit > 64 {
            return Err(TimeSignatureError::BadBeatUnit(s.to_string()));
        }

        Ok(TimeSignature {
            beats_per_bar,
            beat_unit,
        })
    }
}

impl std::fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.beats_per_bar, self.beat_unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_common_signatures() {
        let four: TimeSignature = "4/4".parse().unwrap();
        assert_eq!(four, TimeSignature::FOUR_FOUR);

        let waltz: TimeSignature = "3/4".parse().unwrap();
        assert_eq!(waltz.beats_per_bar, 3);

        let compound: TimeSignature = "6/8".parse().unwrap();
        assert_eq!(compound.beats_per_bar, 6);
        assert_eq!(compound.beat_unit, 8);
        assert_eq!(compound.beat_unit_log2(), 3);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("44".parse::<TimeSignature>(), Err(TimeSignatureError::Malformed(_))));
        assert!(matches!("x/4".parse::<TimeSignature>(), Err(TimeSignatureError::Malformed(_))));
        assert!(matches!("0/4".parse::<TimeSignature>(), Err(TimeSignatureError::NoBeats(_))));
        assert!(matches!("4/3".parse::<TimeSignature>(), Err(TimeSignatureError::BadBeatUnit(_))));
    }

    #[test]
    fn test_display() {
        let sig: TimeSignature = " 7 / 8 ".parse().unwrap();
        assert_eq!(sig.to_string(), "7/8");
    }
}
