use std::path::PathBuf;

use clap::{Parser, Subcommand};
use snapdiff::{AreaSpec, Backend};

use crate::config::DiffConfig;

#[derive(Parser)]
#[command(
    name = "snapdiff",
    about = "Locate visual differences between UI screenshots"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create .snapdiff/config.toml with default settings
    Init {
        /// Default region localization backend
        #[arg(long, value_enum, default_value_t)]
        backend: Backend,
        /// Overwrite existing config and gitignore
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Compare a baseline screenshot against a candidate (exit 0/1)
    Compare {
        /// Baseline screenshot
        #[arg(long)]
        base: PathBuf,
        /// Candidate screenshot
        #[arg(long)]
        new: PathBuf,
        /// Area to ignore: `LEFT,TOP,RIGHT,BOTTOM` or an element selector (repeatable)
        #[arg(long = "skip-area")]
        skip_area: Vec<AreaSpec>,
        /// Restrict the comparison to this area
        #[arg(long)]
        crop: Option<AreaSpec>,
        /// JSON file mapping selectors to `[left, top, right, bottom]` rectangles
        #[arg(long)]
        elements: Option<PathBuf>,
        /// Only decide equality; skip locating the region when possible
        #[arg(long)]
        quick: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Write annotated images here when the screenshots differ
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        diff: DiffConfig,
    },
}
