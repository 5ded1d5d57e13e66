//! Entry points behind `main`: the interactive grid and the one-shot
//! subcommands. Both build the store from the resolved `Config` and dispatch
//! through the same command handlers.

use anyhow::{anyhow, Context, Result};
use tracing::error;

use crate::commands::{execute, Command};
use crate::config::{CliCommand, Config};
use crate::models::{StudentRecord, FIELD_COUNT, FIELD_LABELS};
use crate::store::RecordStore;
use crate::ui::{run_app, App};

/// Load the roster and hand control to the TUI. A failed load is reported in
/// the footer and the session starts with an empty list.
pub fn run_interactive(config: &Config) -> Result<()> {
    let mut app = match RecordStore::open(&config.roster_path) {
        Ok(store) => App::new(store, None),
        Err(err) => {
            error!(error = %err, "failed to load roster, starting empty");
            App::new(RecordStore::empty(&config.roster_path), Some(&err))
        }
    };
    run_app(&mut app)
}

/// Run one subcommand against the roster file and print the result.
pub fn run_command(config: &Config, command: CliCommand) -> Result<()> {
    let mut store = RecordStore::open(&config.roster_path).context("failed to load roster")?;

    let command = match command {
        CliCommand::List => {
            print!("{}", render_table(store.records()));
            return Ok(());
        }
        CliCommand::Add { values } => Command::Add {
            fields: into_fields(values)?,
        },
        CliCommand::Edit { row, values } => Command::Update {
            selection: Some(row_index(row)?),
            fields: into_fields(values)?,
        },
        CliCommand::Remove { row } => Command::Remove {
            selection: Some(row_index(row)?),
        },
    };

    let outcome = execute(&mut store, command)?;
    println!("{}", outcome.message());
    Ok(())
}

/// Lay out the roster as a fixed-width table with 1-based row numbers.
pub fn render_table(records: &[StudentRecord]) -> String {
    let mut widths = FIELD_LABELS.map(str::len);
    for record in records {
        for (width, value) in widths.iter_mut().zip(record.fields()) {
            *width = (*width).max(value.chars().count());
        }
    }
    let number_width = records.len().to_string().len().max(1);

    let mut out = String::new();
    push_row(&mut out, "#", number_width, FIELD_LABELS, &widths);
    for (idx, record) in records.iter().enumerate() {
        push_row(&mut out, &(idx + 1).to_string(), number_width, record.fields(), &widths);
    }
    out
}

fn push_row(
    out: &mut String,
    number: &str,
    number_width: usize,
    values: [&str; FIELD_COUNT],
    widths: &[usize; FIELD_COUNT],
) {
    out.push_str(&format!("{number:>number_width$}"));
    for (value, width) in values.iter().zip(widths) {
        out.push_str(&format!("  {value:<width$}"));
    }
    let trimmed = out.trim_end_matches(' ').len();
    out.truncate(trimmed);
    out.push('\n');
}

fn into_fields(values: Vec<String>) -> Result<[String; FIELD_COUNT]> {
    let found = values.len();
    values
        .try_into()
        .map_err(|_| anyhow!("expected {FIELD_COUNT} values, got {found}"))
}

fn row_index(row: u64) -> Result<usize> {
    let row = usize::try_from(row).context("row number out of range")?;
    row.checked_sub(1)
        .ok_or_else(|| anyhow!("row numbers start at 1"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn values(id: &str) -> Vec<String> {
        [id, "Alice", "F", "2000-01-01", "2020-01-01", "CS", "3", "0", "9999999999"]
            .map(String::from)
            .to_vec()
    }

    fn config(dir: &TempDir) -> Config {
        Config {
            roster_path: dir.path().join("students.csv"),
            verbose: false,
        }
    }

    #[test]
    fn add_edit_remove_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);

        run_command(&config, CliCommand::Add { values: values("S1") }).unwrap();
        run_command(&config, CliCommand::Add { values: values("S2") }).unwrap();
        run_command(&config, CliCommand::Edit { row: 1, values: values("S9") }).unwrap();
        run_command(&config, CliCommand::Remove { row: 2 }).unwrap();

        let contents = fs::read_to_string(&config.roster_path).unwrap();
        assert_eq!(contents, "S9,Alice,F,2000-01-01,2020-01-01,CS,3,0,9999999999,\n");
    }

    #[test]
    fn row_past_end_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        run_command(&config, CliCommand::Add { values: values("S1") }).unwrap();

        let err = run_command(&config, CliCommand::Remove { row: 5 }).unwrap_err();
        assert_eq!(err.to_string(), "Row 5 does not exist (roster has 1 rows).");
    }

    #[test]
    fn wrong_value_count_is_an_error() {
        let err = into_fields(vec!["S1".to_string()]).unwrap_err();
        assert_eq!(err.to_string(), "expected 9 values, got 1");
    }

    #[test]
    fn table_is_numbered_and_aligned() {
        let record = StudentRecord::from_fields(values("S1").try_into().unwrap());
        let table = render_table(&[record]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("#  Registration ID  Student Name"));
        assert!(lines[1].starts_with("1  S1               Alice"));
        assert!(lines[1].ends_with("9999999999"));
    }
}
