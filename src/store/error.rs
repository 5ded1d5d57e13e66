use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::ValidationError;

/// Failures raised by the record store and the command layer. A missing
/// backing file is not represented here: loading treats it as an empty roster.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to {action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Row {} does not exist (roster has {len} rows).", .index + 1)]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Please select a student to {action}.")]
    NoSelection { action: &'static str },
}

impl StoreError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
