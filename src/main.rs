// Songsmith CLI
// Parses flags into a generation request and prints listings

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use songsmith_lib::arranger::Section;
use songsmith_lib::commands::{self, FeatureFlags, GenerateInput};

#[derive(Debug, Parser)]
#[command(
    name = "songsmith",
    version,
    about = "Procedural multi-track MIDI song generator"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compose a song and write it as a MIDI file
    Generate(GenerateArgs),

    /// Show the available presets and lookup tables
    List {
        #[command(subcommand)]
        what: ListTarget,
    },
}

#[derive(Debug, Subcommand)]
enum ListTarget {
    Genres,
    Keys,
    Scales,
    Instruments,
    /// Default sections for a genre
    Sections { genre: String },
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// JSON request file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    genre: Option<String>,

    /// Key root, e.g. C, F#, A#
    #[arg(long)]
    key: Option<String>,

    /// Scale name, e.g. "Major", "Harmonic Minor"
    #[arg(long)]
    scale: Option<String>,

    /// Tempo in BPM (60-240)
    #[arg(long)]
    bpm: Option<u32>,

    /// Meter as N/M, e.g. 3/4
    #[arg(long)]
    time_signature: Option<String>,

    /// Instrument for the next track (repeatable)
    #[arg(long = "instrument", value_name = "NAME")]
    instruments: Vec<String>,

    /// Song section (repeatable, in order)
    #[arg(long = "section", value_name = "NAME:BARS")]
    sections: Vec<Section>,

    /// Chord label for an explicit progression (repeatable)
    #[arg(long = "progression", value_name = "LABEL")]
    progression: Vec<String>,

    /// RNG seed (same seed => same song)
    #[arg(long)]
    seed: Option<u64>,

    /// Slow down Intro and Outro sections
    #[arg(long)]
    dynamic_tempo: bool,

    /// Crescendo and decrescendo on the harmony
    #[arg(long)]
    dynamics: bool,

    /// Raise the key by a whole tone at each Bridge
    #[arg(long)]
    modulation: bool,

    /// Trills and grace notes on the melody
    #[arg(long)]
    ornamentation: bool,

    #[arg(long)]
    countermelody: bool,

    #[arg(long)]
    no_percussion: bool,

    /// Append a JSONL generation trace to this file
    #[arg(long, value_name = "FILE")]
    trace: Option<PathBuf>,

    /// Output .mid path
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,
}

impl From<GenerateArgs> for GenerateInput {
    fn from(args: GenerateArgs) -> Self {
        GenerateInput {
            config: args.config,
            file_name: args.output,
            genre: args.genre,
            key: args.key,
            scale: args.scale,
            bpm: args.bpm,
            time_signature: args.time_signature,
            instruments: args.instruments,
            sections: args.sections,
            progression: args.progression,
            seed: args.seed,
            features: FeatureFlags {
                dynamic_tempo: args.dynamic_tempo,
                dynamics: args.dynamics,
                modulation: args.modulation,
                ornamentation: args.ornamentation,
                countermelody: args.countermelody,
                no_percussion: args.no_percussion,
            },
            trace: args.trace,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            log::error!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Generate(args) => {
            let output = commands::generate_command(args.into()).map_err(|e| e.message().to_string())?;
            println!(
                "Wrote {} ({} tracks, {} notes, {} beats, seed {})",
                output.path.display(),
                output.tracks,
                output.notes,
                output.total_beats,
                output.seed
            );
        }
        Command::List { what } => match what {
            ListTarget::Genres => {
                for genre in commands::list_genres() {
                    println!("{:<12} {}", genre.genre, genre.description);
                }
            }
            ListTarget::Keys => println!("{}", commands::list_keys().join(" ")),
            ListTarget::Scales => {
                for scale in commands::list_scales() {
                    println!("{}", scale);
                }
            }
            ListTarget::Instruments => {
                for (name, program) in commands::list_instruments() {
                    println!("{:>3}  {}", program, name);
                }
            }
            ListTarget::Sections { genre } => {
                let sections = commands::list_sections(&genre).map_err(|e| e.message().to_string())?;
                for section in sections {
                    println!("{:<16} {} bars", section.name, section.bars);
                }
            }
        },
    }
    Ok(())
}
