// Songsmith - Procedural multi-track song generator
// Module declarations

pub mod arranger;
pub mod commands;
pub mod compose;
pub mod pipeline;
pub mod presets;
pub mod theory;

pub use arranger::{compose as compose_song, Arrangement, SongRequest, SongStructure};
