// Pipeline monitoring module
// Records each generation run as a JSONL trace

pub mod trace;

pub use trace::{
    TraceEntry, TraceError, TraceResult, TraceStage, TraceWriter, read_trace_file, section_entries,
};
