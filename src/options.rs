// ============================================================================
// options.rs — Command-line arguments (CLI)
// ============================================================================

use clap::Parser;
use std::path::PathBuf;

use crate::config::{GeneratorConfig, SourceMode};

/// How much the run prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn is_quiet(self) -> bool {
        self == Verbosity::Quiet
    }

    pub fn is_verbose(self) -> bool {
        self == Verbosity::Verbose
    }
}

#[derive(Parser, Debug, Default)]
#[command(name = "pwa-icons")]
#[command(about = "pwa-icons - Resize a logo into PWA icons (192x192, 512x512, 180x180)", long_about = None)]
pub struct IconOptions {
    /// Configuration file (default: pwa-icons.toml if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory searched for the source logo
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Output directory (relative to the root unless absolute)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Draw placeholder icons instead of resizing a logo
    #[arg(long)]
    pub placeholder: bool,

    /// Number of icons rendered in parallel (default: one per CPU)
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    pub jobs: Option<usize>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Verbose output (source path, modification time, checksums)
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: only errors and summary
    #[arg(short, long)]
    pub quiet: bool,
}

impl IconOptions {
    /// If both verbose and quiet are set, quiet takes precedence
    pub fn show_verbose_output(&self) -> bool {
        self.verbose && !self.quiet
    }

    pub fn show_quiet_output(&self) -> bool {
        self.quiet
    }

    pub fn verbosity(&self) -> Verbosity {
        if self.show_quiet_output() {
            Verbosity::Quiet
        } else if self.show_verbose_output() {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    /// Command-line flags win over the config file.
    pub fn apply(&self, config: &mut GeneratorConfig) {
        if let Some(root) = &self.root {
            config.workspace_root = root.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if self.placeholder {
            config.mode = SourceMode::Placeholder;
        }
        if self.jobs.is_some() {
            config.jobs = self.jobs;
        }
    }
}
