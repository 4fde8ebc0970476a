//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "crashsym",
    about = "Annotate managed crash reports with source-level symbol information",
    after_help = "\
EXAMPLES:
    crashsym crash.json --root ./ide-syms --root ./runtime-syms
    crashsym crash.json --index runtime.symcache.gz --native-index mono.nsym
    crashsym crash.json --native-index mono.nsym --target ./mono-sgen
    crashsym --build-only --root ./runtime-syms --cache-dir ./caches
    crashsym --write-native-index mono.nsym --target ./mono-sgen"
)]
pub struct Args {
    /// Crash report to symbolicate
    #[arg(value_name = "CRASH_FILE")]
    pub crash: Option<PathBuf>,

    /// Scan root containing module symbol dumps (repeatable, priority order)
    #[arg(long, value_name = "DIR")]
    pub root: Vec<PathBuf>,

    /// Precomputed index cache to load (repeatable, probed before roots)
    #[arg(long, value_name = "FILE")]
    pub index: Vec<PathBuf>,

    /// Directory for per-root index caches (loaded when present, written after a scan)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Build and persist the per-root caches, then exit without symbolicating
    #[arg(long, requires = "cache_dir")]
    pub build_only: bool,

    /// Offline native symbol index
    #[arg(long, value_name = "FILE")]
    pub native_index: Option<PathBuf>,

    /// Binary handed to the external symbolizer
    #[arg(short, long, value_name = "BIN")]
    pub target: Option<PathBuf>,

    /// External symbolizer command
    #[arg(long, default_value = "llvm-symbolizer", value_name = "CMD")]
    pub symbolizer: String,

    /// Per-request symbolizer timeout in milliseconds
    #[arg(long, default_value = "10000", value_name = "MS")]
    pub symbolizer_timeout_ms: u64,

    /// Write the offline native index for --target and exit
    #[arg(long, value_name = "FILE", requires = "target")]
    pub write_native_index: Option<PathBuf>,

    /// Write the annotated report here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}
