//! dmtrace CLI - UID recovery from danmaku CRC32 fingerprints.
//!
//! Cracks 8-hex-digit fingerprints back into candidate UIDs and decodes
//! danmaku segment files. All operations are offline: bytes in, candidate
//! lists out.

mod commands;
mod utils;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use commands::{CrackStrategy, cmd_crack, cmd_parse, cmd_table_build, cmd_table_info};
use dmtrace_engine::brute::default_workers;
use dmtrace_engine::table::DEFAULT_CACHE_FILE;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dmtrace")]
#[command(
    author,
    version,
    about = "Recover UIDs from danmaku CRC32 fingerprints"
)]
#[command(long_about = "
dmtrace inverts the CRC32 fingerprint attached to danmaku records back into
candidate sender UIDs. Short (legacy) UIDs fall to an exhaustive
multithreaded scan; 16-digit UIDs fall to a meet-in-the-middle attack
backed by a precomputed table (~800 MiB, cached on disk after first build).

CRC32 collides, so the output is a candidate *set*: every listed UID hashes
back to the fingerprint, but which one really sent the comment is for an
upstream directory to say.

Examples:
  dmtrace crack 90a567c7
  dmtrace crack bc28c067 --strategy legacy --workers 16
  dmtrace crack 90a567c7 --strategy mitm --json
  dmtrace parse segment.bin --search \"hello\" --crack
  dmtrace table build --output /var/cache/mitm_table.bin
  dmtrace table info
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crack a fingerprint into candidate UIDs
    #[command(alias = "c")]
    Crack {
        /// Fingerprint: 1-8 hex characters, any case
        fingerprint: String,

        /// Cracking strategy
        #[arg(short, long, value_enum, default_value = "auto")]
        strategy: StrategyArg,

        /// Worker threads for the legacy scan (clamped to 1-64)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Low-half table cache file
        #[arg(short, long, default_value = DEFAULT_CACHE_FILE)]
        table: PathBuf,

        /// JSON file replacing the built-in modern-UID allow-table
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Show progress spinner
        #[arg(short = 'P', long, default_value = "true")]
        progress: bool,
    },

    /// Decode a danmaku segment file, optionally cracking each record
    #[command(alias = "p")]
    Parse {
        /// Segment file (DmSegMobileReply wire format)
        file: PathBuf,

        /// Show only records whose content contains this substring
        #[arg(short, long)]
        search: Option<String>,

        /// Crack each shown record's fingerprint
        #[arg(short, long)]
        crack: bool,

        /// Cracking strategy for --crack
        #[arg(long, value_enum, default_value = "auto")]
        strategy: StrategyArg,

        /// Worker threads for the legacy scan (clamped to 1-64)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Low-half table cache file
        #[arg(short, long, default_value = DEFAULT_CACHE_FILE)]
        table: PathBuf,

        /// JSON file replacing the built-in modern-UID allow-table
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Skip records whose danmaku id was already seen
        #[arg(short, long)]
        dedup: bool,

        /// Stop after showing this many records
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Manage the low-half table cache
    Table {
        #[command(subcommand)]
        action: TableAction,
    },

    /// Generate shell completion scripts
    #[command(hide = true)]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum TableAction {
    /// Build the cache file (no-op if a valid cache exists)
    Build {
        /// Cache file to write
        #[arg(short, long, default_value = DEFAULT_CACHE_FILE)]
        output: PathBuf,

        /// Rebuild even if the cache is valid
        #[arg(short, long)]
        force: bool,
    },

    /// Inspect a cache file header
    Info {
        /// Cache file to inspect
        #[arg(default_value = DEFAULT_CACHE_FILE)]
        path: PathBuf,
    },
}

/// Cracking strategy (for clap ValueEnum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Legacy scan first, MITM fallback when it finds nothing
    Auto,
    /// Exhaustive legacy-band scan only
    Legacy,
    /// Meet-in-the-middle scan only
    Mitm,
}

impl From<StrategyArg> for CrackStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Auto => CrackStrategy::Auto,
            StrategyArg::Legacy => CrackStrategy::Legacy,
            StrategyArg::Mitm => CrackStrategy::Mitm,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Crack {
            fingerprint,
            strategy,
            workers,
            table,
            rules,
            json,
            progress,
        } => cmd_crack(
            &fingerprint,
            strategy.into(),
            workers.unwrap_or_else(default_workers),
            Some(&table),
            rules.as_deref(),
            json,
            progress,
        ),
        Commands::Parse {
            file,
            search,
            crack,
            strategy,
            workers,
            table,
            rules,
            dedup,
            limit,
        } => cmd_parse(
            &file,
            search.as_deref(),
            crack,
            strategy.into(),
            workers.unwrap_or_else(default_workers),
            Some(&table),
            rules.as_deref(),
            dedup,
            limit,
            true,
        ),
        Commands::Table { action } => match action {
            TableAction::Build { output, force } => cmd_table_build(&output, force, true),
            TableAction::Info { path } => cmd_table_info(&path),
        },
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "dmtrace", &mut io::stdout());
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
