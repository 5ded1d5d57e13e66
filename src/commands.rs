//! Command handlers shared by the TUI and the scripting CLI. Each command
//! carries raw user input plus the current row selection; `execute` trims and
//! validates it, applies it to the store, and reports what changed. Nothing in
//! here knows about terminals or key events.

use tracing::info;

use crate::models::{StudentRecord, FIELD_COUNT};
use crate::store::{RecordStore, StoreError};

/// A user-initiated change to the roster.
#[derive(Debug, Clone)]
pub enum Command {
    Add {
        fields: [String; FIELD_COUNT],
    },
    Update {
        selection: Option<usize>,
        fields: [String; FIELD_COUNT],
    },
    Remove {
        selection: Option<usize>,
    },
}

/// What a successful command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added { index: usize },
    Updated { index: usize },
    Removed { index: usize, record: StudentRecord },
}

impl Outcome {
    /// Row to keep selected after the command.
    pub fn focus(&self) -> usize {
        match self {
            Outcome::Added { index } | Outcome::Updated { index } | Outcome::Removed { index, .. } => {
                *index
            }
        }
    }

    /// Short confirmation text for the status line.
    pub fn message(&self) -> String {
        match self {
            Outcome::Added { index } => format!("Added student in row {}.", index + 1),
            Outcome::Updated { index } => format!("Updated student in row {}.", index + 1),
            Outcome::Removed { record, .. } => format!("Removed {record}."),
        }
    }
}

/// Apply `command` to `store`. On error nothing in the store has changed.
pub fn execute(store: &mut RecordStore, command: Command) -> Result<Outcome, StoreError> {
    let outcome = match command {
        Command::Add { fields } => {
            let index = store.add(record_from_input(fields))?;
            Outcome::Added { index }
        }
        Command::Update { selection, fields } => {
            let index = selection.ok_or(StoreError::NoSelection { action: "edit" })?;
            store.update(index, record_from_input(fields))?;
            Outcome::Updated { index }
        }
        Command::Remove { selection } => {
            let index = selection.ok_or(StoreError::NoSelection { action: "remove" })?;
            let record = store.remove(index)?;
            Outcome::Removed { index, record }
        }
    };

    info!(?outcome, rows = store.len(), "roster updated");
    Ok(outcome)
}

fn record_from_input(fields: [String; FIELD_COUNT]) -> StudentRecord {
    StudentRecord::from_fields(fields.map(|value| value.trim().to_string()))
}
