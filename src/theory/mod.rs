// Music Theory - Scales, genres and meter
// Pure lookup and rule data consumed by the composition engine

pub mod scale;
pub mod genre;
pub mod time;

// Re-export main types
pub use scale::{
    Pitch, Scale, ScaleError, ScaleResult, KEYS,
    resolve, modulate, key_pitch, scale_names, is_valid_key, is_valid_scale,
};
pub use genre::{Genre, ChordRules, Extension, MelodyRule, Ornament, PercussionRole};
pub use time::{TimeSignature, TimeSignatureError};
