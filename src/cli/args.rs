//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Twenty-questions knowledge engine: guesses what you think of and learns when wrong
#[derive(Parser, Debug)]
#[command(name = "guesstree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more: -d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory for local config lookup (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play interactively, learning from wrong guesses
    Play {
        /// Knowledge base file (created on save if missing)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Show knowledge base as tree
    Show {
        /// Knowledge base file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Reformat knowledge base text
    Fmt {
        /// Knowledge base file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Write on a single line
        #[arg(long)]
        compact: bool,
        /// Rewrite the file in place instead of printing
        #[arg(short, long)]
        write: bool,
    },

    /// Export knowledge base as DOT graph
    Dot {
        /// Knowledge base file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// List the properties of a subject
    Define {
        /// Knowledge base file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Subject to define
        subject: String,
    },

    /// List all subjects in order
    Subjects {
        /// Knowledge base file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show size and shape figures
    Stats {
        /// Knowledge base file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
