use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::{MediaKind, SortColumn};

struct DefaultArgs;

impl DefaultArgs {
    pub const DIR: &'static str = ".";
}

/// Photo and video catalog: ingest a directory, then list or inspect what was found.
#[derive(Clone, Parser)]
#[command(name = "photocat", version)]
#[command(about = "Index photos and videos into a local catalog with metadata and thumbnails.")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every subcommand. Unset flags fall back to `.photocat.toml`, then `PHOTOCAT_*` env.
#[derive(Clone, Debug, Default, Args)]
pub struct GlobalArgs {
    /// Catalog directory (holds catalog.db and thumbnails/). Default: `.photocat` in the working directory.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output.
    #[arg(long, short = 'v', global = true, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Probing program used for video metadata.
    #[arg(long, global = true, value_name = "PROGRAM")]
    pub ffprobe: Option<PathBuf>,

    /// Frame extraction program used for video thumbnails.
    #[arg(long, global = true, value_name = "PROGRAM")]
    pub ffmpeg: Option<PathBuf>,

    /// Time limit in seconds for each external tool call.
    #[arg(long, global = true, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub tool_timeout: Option<u64>,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Scan a directory and upsert every photo and video into the catalog.
    Ingest {
        /// Directory to ingest. Default: current directory.
        #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
        dir: PathBuf,

        /// Follow symbolic links.
        #[arg(long, short = 'f', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
        follow_links: Option<bool>,

        /// Exclude patterns (glob syntax). Can specify multiple: -e pattern1 pattern2 pattern3
        #[arg(long, short = 'e', num_args = 1..)]
        exclude: Vec<String>,
    },

    /// List catalog entries (deleted entries are hidden).
    List {
        /// Sort column.
        #[arg(long, value_enum, default_value_t = SortColumn::Path)]
        sort: SortColumn,

        /// Sort descending.
        #[arg(long)]
        desc: bool,

        /// Only this kind.
        #[arg(long, value_enum)]
        kind: Option<MediaKind>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show every stored field of one entry.
    Show {
        /// File path as ingested (relative paths are resolved against the working directory).
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Print JSON instead of key/value lines.
        #[arg(long)]
        json: bool,
    },
}
