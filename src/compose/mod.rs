// Composition Engine - Procedural musical content
// Progressions, melodies, dynamics, ornaments, percussion and voice-led harmony

pub mod progression;
pub mod melody;
pub mod dynamics;
pub mod percussion;
pub mod harmony;

// Re-export main types
pub use progression::{Chord, Progression, ProgressionError, generate_progression};
pub use melody::{MelodyLine, generate_melody, generate_countermelody, derive_bass_line};
pub use dynamics::{shape_dynamics, ornament};
pub use percussion::{generate_pattern, is_silent};
pub use harmony::{HarmonyPlacement, render_harmony, voice_lead};
