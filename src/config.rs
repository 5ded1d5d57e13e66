//! Command-line surface and runtime configuration. The roster location can be
//! given with `--file`, through `STUDENT_ROSTER_FILE`, or falls back to
//! `students.csv` in the working directory. Logs always go to a file under the
//! user's home so they never fight the TUI for the terminal.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use directories::BaseDirs;

use crate::models::FIELD_COUNT;

/// Roster file used when nothing else is configured.
pub const DEFAULT_ROSTER_FILE: &str = "students.csv";
/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".student-roster";
/// Log file name stored inside the application data directory.
const LOG_FILE_NAME: &str = "student-roster.log";

#[derive(Debug, Parser)]
#[command(name = "student-roster", version)]
#[command(about = "Manage a student roster stored in a flat CSV file")]
pub struct Cli {
    /// Roster file to load and keep in sync
    #[arg(short, long, env = "STUDENT_ROSTER_FILE", default_value = DEFAULT_ROSTER_FILE)]
    pub file: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,

    /// Run a single command instead of opening the interactive grid
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print every student with its row number
    List,

    /// Append a student
    Add {
        #[arg(
            num_args = FIELD_COUNT,
            required = true,
            allow_hyphen_values = true,
            value_names = FIELD_VALUE_NAMES
        )]
        values: Vec<String>,
    },

    /// Overwrite every field of the student in ROW
    Edit {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        row: u64,
        #[arg(
            num_args = FIELD_COUNT,
            required = true,
            allow_hyphen_values = true,
            value_names = FIELD_VALUE_NAMES
        )]
        values: Vec<String>,
    },

    /// Delete the student in ROW
    Remove {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        row: u64,
    },
}

const FIELD_VALUE_NAMES: [&str; FIELD_COUNT] = [
    "REGISTRATION_ID",
    "NAME",
    "GENDER",
    "DATE_OF_BIRTH",
    "ADMISSION_DATE",
    "COURSE",
    "CURRENT_SEMESTER",
    "DISCOUNT",
    "MOBILE_NUMBER",
];

/// Settings resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub roster_path: PathBuf,
    pub verbose: bool,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            roster_path: cli.file.clone(),
            verbose: cli.verbose,
        }
    }

    /// Default tracing directive when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Resolve the absolute path to the log file inside the user's home.
pub fn log_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(LOG_FILE_NAME))
}
