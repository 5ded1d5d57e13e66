//! Core library surface for the student roster manager.
//!
//! The roster lives in a flat CSV file that is rewritten after every change.
//! `store` owns that file, `commands` is the single way to change it, and the
//! `ui` and `cli` modules are two front ends over the same commands.
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod store;
pub mod ui;

/// Convenience re-exports for the persistence layer.
pub use store::{RecordStore, StoreError};

/// The roster row and its validation error.
pub use models::{StudentRecord, ValidationError};

pub use commands::{execute, Command, Outcome};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
