// rezzer-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand};
use rezzer_core::Profile;
use rezzer_core::config::{DEFAULT_ENCODER_PROGRAM, ENCODER_ENV_VAR};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Rezzer: batch ProRes converter",
    long_about = "Converts video files to ProRes .mov files with ffmpeg, one encoder process per file, several files at once."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug output on the console.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Converts files to <name>_prores.mov next to each input
    Convert(ConvertArgs),
    /// Checks that the encoder can be launched
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Files to convert. Directories add the files directly inside them.
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// ProRes profile: 0-3 or proxy, lt, standard, hq
    #[arg(short, long, value_name = "PROFILE", default_value = "standard")]
    pub profile: Profile,

    /// Tell each encoder to use one thread instead of one per logical processor
    #[arg(long, default_value_t = false)]
    pub single_thread: bool,

    /// Maximum files converted at once (defaults to the number of logical processors)
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    /// Kill an encoder that runs longer than this many seconds
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    // --- Encoder ---
    /// Encoder executable.
    /// Can also be set via the REZZER_ENCODER environment variable.
    #[arg(long, value_name = "PATH", env = ENCODER_ENV_VAR, default_value = DEFAULT_ENCODER_PROGRAM)]
    pub encoder: PathBuf,

    /// Overwrite existing output files instead of failing those jobs
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,

    // --- Input Sources ---
    /// Additional inputs as a drag-and-drop payload, e.g. "{/my videos/a.mp4} /b.mov"
    #[arg(long, value_name = "PAYLOAD")]
    pub drop: Option<String>,

    // --- Output ---
    /// Print one JSON object per event on stdout instead of the progress display
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Hide encoder output lines, showing only per-file results
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Optional: Directory to write a run log file into
    #[arg(long, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Encoder executable.
    /// Can also be set via the REZZER_ENCODER environment variable.
    #[arg(long, value_name = "PATH", env = ENCODER_ENV_VAR, default_value = DEFAULT_ENCODER_PROGRAM)]
    pub encoder: PathBuf,
}
