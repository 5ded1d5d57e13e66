//! Binary entry point: parse the command line, set up file logging, then
//! either run one subcommand or open the interactive roster grid.
use clap::Parser;
use student_roster::cli::{run_command, run_interactive};
use student_roster::config::{Cli, Config};
use student_roster::logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_cli(&cli);

    if let Err(err) = logging::init(&config) {
        eprintln!("warning: file logging disabled: {err:#}");
    }

    match cli.command {
        Some(command) => run_command(&config, command),
        None => run_interactive(&config),
    }
}
