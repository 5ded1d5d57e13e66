//! Ratatui front end: the roster grid, add/edit dialogs and the removal
//! prompt. All changes go through `commands::execute`; the grid only reads.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
