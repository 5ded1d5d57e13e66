use std::mem;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use tracing::{debug, warn};

use crate::commands::{execute, Command, Outcome};
use crate::models::{FIELD_COUNT, FIELD_LABELS, SEPARATOR};
use crate::store::{RecordStore, StoreError};

use super::forms::{ConfirmRemove, RecordForm};
use super::helpers::{centered_rect, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 10;

/// Fine-grained modes layered over the roster grid.
enum Mode {
    Normal,
    Adding(RecordForm),
    Editing { index: usize, form: RecordForm },
    ConfirmRemove(ConfirmRemove),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Interactive state: the store plus the current selection, dialog and
/// status line. The grid is a read-only projection of `store.records()`.
pub struct App {
    store: RecordStore,
    selected: Option<usize>,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Wrap a store. `load_error` is shown in the footer when the initial load
    /// failed and the store was started empty instead.
    pub fn new(store: RecordStore, load_error: Option<&StoreError>) -> Self {
        let mut app = Self {
            store,
            selected: None,
            mode: Mode::Normal,
            status: None,
        };
        if let Some(err) = load_error {
            app.set_status(
                format!("Starting with an empty list: {}", surface_error(err)),
                StatusKind::Error,
            );
        }
        app
    }

    /// Process one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Adding(form) => self.handle_add(code, form),
            Mode::Editing { index, form } => self.handle_edit(code, index, form),
            Mode::ConfirmRemove(confirm) => self.handle_confirm_remove(code, confirm),
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.move_selection(PAGE_STEP),
            KeyCode::Home => self.select_edge(false),
            KeyCode::End => self.select_edge(true),
            KeyCode::Char('+') | KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                return Mode::Adding(RecordForm::default());
            }
            KeyCode::Char('e') | KeyCode::Char('E') | KeyCode::Enter => {
                match self.selected_record() {
                    Some((index, form)) => {
                        self.clear_status();
                        return Mode::Editing { index, form };
                    }
                    None => {
                        self.report(&StoreError::NoSelection { action: "edit" });
                    }
                }
            }
            KeyCode::Char('-') | KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Delete => {
                let pending = self.selected.and_then(|index| {
                    self.store.get(index).cloned().map(|record| ConfirmRemove { index, record })
                });
                match pending {
                    Some(confirm) => {
                        self.clear_status();
                        return Mode::ConfirmRemove(confirm);
                    }
                    None => {
                        self.report(&StoreError::NoSelection { action: "remove" });
                    }
                }
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_add(&mut self, code: KeyCode, mut form: RecordForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add student cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Enter => {
                let command = Command::Add {
                    fields: form.to_fields(),
                };
                match self.dispatch(command) {
                    Ok(()) => keep_open = false,
                    Err(message) => form.error = Some(message),
                }
            }
            _ => Self::edit_form(code, &mut form),
        }

        if keep_open {
            Mode::Adding(form)
        } else {
            Mode::Normal
        }
    }

    fn handle_edit(&mut self, code: KeyCode, index: usize, mut form: RecordForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Enter => {
                let command = Command::Update {
                    selection: Some(index),
                    fields: form.to_fields(),
                };
                match self.dispatch(command) {
                    Ok(()) => keep_open = false,
                    Err(message) => form.error = Some(message),
                }
            }
            _ => Self::edit_form(code, &mut form),
        }

        if keep_open {
            Mode::Editing { index, form }
        } else {
            Mode::Normal
        }
    }

    /// Keys shared by both dialogs that only touch the form buffers.
    fn edit_form(code: KeyCode, form: &mut RecordForm) {
        match code {
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                } else if ch == SEPARATOR {
                    form.error = Some("Commas are not allowed in roster fields.".to_string());
                }
            }
            _ => {}
        }
    }

    fn handle_confirm_remove(&mut self, code: KeyCode, confirm: ConfirmRemove) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let command = Command::Remove {
                    selection: Some(confirm.index),
                };
                if self.dispatch(command).is_err() {
                    debug!(index = confirm.index, "removal left roster unchanged");
                }
                Mode::Normal
            }
            _ => Mode::ConfirmRemove(confirm),
        }
    }

    /// Run a command against the store and reflect the result in the
    /// selection and footer. Errors come back as display text for the dialog.
    fn dispatch(&mut self, command: Command) -> Result<(), String> {
        match execute(&mut self.store, command) {
            Ok(outcome) => {
                self.focus_after(&outcome);
                self.set_status(outcome.message(), StatusKind::Info);
                Ok(())
            }
            Err(err) => Err(self.report(&err)),
        }
    }

    fn focus_after(&mut self, outcome: &Outcome) {
        let len = self.store.len();
        self.selected = if len == 0 {
            None
        } else {
            Some(outcome.focus().min(len - 1))
        };
    }

    /// Log and show an error, returning the rendered message.
    fn report(&mut self, err: &StoreError) -> String {
        let message = surface_error(err);
        warn!(error = %message, "roster action failed");
        self.set_status(message.clone(), StatusKind::Error);
        message
    }

    fn selected_record(&self) -> Option<(usize, RecordForm)> {
        let index = self.selected?;
        let record = self.store.get(index)?;
        Some((index, RecordForm::from_record(record)))
    }

    fn move_selection(&mut self, offset: isize) {
        let len = self.store.len();
        if len == 0 {
            self.selected = None;
            return;
        }
        let next = match self.selected {
            Some(current) => (current as isize + offset).clamp(0, len as isize - 1) as usize,
            None if offset < 0 => len - 1,
            None => 0,
        };
        self.selected = Some(next);
    }

    fn select_edge(&mut self, last: bool) {
        let len = self.store.len();
        self.selected = match (len, last) {
            (0, _) => None,
            (_, true) => Some(len - 1),
            (_, false) => Some(0),
        };
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_grid(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Adding(form) => self.draw_form(frame, area, "Add Student", form),
            Mode::Editing { form, .. } => self.draw_form(frame, area, "Edit Student", form),
            Mode::ConfirmRemove(confirm) => self.draw_confirm_remove(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_grid(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Students ({}) ", self.store.len()))
            .title_bottom(Line::from(format!(" {} ", self.store.path().display())).right_aligned());

        if self.store.is_empty() {
            let message = Paragraph::new("No students yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let header_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let header = Row::new(
            std::iter::once(Cell::from("#"))
                .chain(FIELD_LABELS.iter().map(|label| Cell::from(*label))),
        )
        .style(header_style);

        let rows = self.store.records().iter().enumerate().map(|(idx, record)| {
            Row::new(
                std::iter::once(Cell::from(format!("{}", idx + 1)))
                    .chain(record.fields().into_iter().map(|value| Cell::from(value.to_string()))),
            )
        });

        let widths = std::iter::once(Constraint::Length(4))
            .chain(std::iter::repeat(Constraint::Fill(1)).take(FIELD_COUNT));

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(self.selected);
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match &self.mode {
            Mode::Adding(_) | Mode::Editing { .. } => Line::from(vec![
                Span::styled("[Tab/↑↓]", key_style),
                Span::raw(" Field   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Save   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            Mode::ConfirmRemove(_) => Line::from(vec![
                Span::styled("[y]", key_style),
                Span::raw(" Remove   "),
                Span::styled("[n/Esc]", key_style),
                Span::raw(" Keep"),
            ]),
            Mode::Normal => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[+]", key_style),
                Span::raw(" Add   "),
                Span::styled("[e]", key_style),
                Span::raw(" Edit   "),
                Span::styled("[-]", key_style),
                Span::raw(" Remove   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &RecordForm) {
        let popup_area = centered_rect(70, 70, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = (0..FIELD_COUNT).map(|field| form.build_line(field)).collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, inner);

        let cursor_x = inner.x + (RecordForm::label_width() + form.active_len()) as u16;
        let cursor_y = inner.y + form.active as u16;
        if cursor_y < inner.y + inner.height {
            frame.set_cursor_position((cursor_x.min(inner.x + inner.width), cursor_y));
        }
    }

    fn draw_confirm_remove(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmRemove) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Remove row {} ({})?",
                confirm.index + 1,
                confirm.record
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tempfile::TempDir;

    const ALICE: [&str; FIELD_COUNT] = [
        "S1",
        "Alice",
        "F",
        "2000-01-01",
        "2020-01-01",
        "CS",
        "3",
        "0",
        "9999999999",
    ];

    fn app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::open(dir.path().join("students.csv")).unwrap();
        (dir, App::new(store, None))
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch));
        }
    }

    fn fill_form(app: &mut App, values: &[&str; FIELD_COUNT]) {
        for value in values {
            type_text(app, value);
            app.handle_key(KeyCode::Tab);
        }
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(220, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn add_dialog_saves_and_selects_new_row() {
        let (_dir, mut app) = app();
        app.handle_key(KeyCode::Char('+'));
        fill_form(&mut app, &ALICE);
        app.handle_key(KeyCode::Enter);

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.store.len(), 1);
        assert_eq!(app.selected, Some(0));
        let on_disk = std::fs::read_to_string(app.store.path()).unwrap();
        assert_eq!(on_disk, "S1,Alice,F,2000-01-01,2020-01-01,CS,3,0,9999999999,\n");
    }

    #[test]
    fn incomplete_add_keeps_dialog_open() {
        let (_dir, mut app) = app();
        app.handle_key(KeyCode::Char('+'));
        type_text(&mut app, "S1");
        app.handle_key(KeyCode::Enter);

        match &app.mode {
            Mode::Adding(form) => {
                assert!(form.error.as_deref().unwrap().starts_with("Please fill all fields"))
            }
            _ => panic!("add dialog should stay open"),
        }
        assert!(app.store.is_empty());
        assert!(!app.store.path().exists());
    }

    #[test]
    fn edit_without_selection_reports_error() {
        let (_dir, mut app) = app();
        app.handle_key(KeyCode::Char('e'));

        assert!(matches!(app.mode, Mode::Normal));
        let status = app.status.as_ref().unwrap();
        assert_eq!(status.text, "Please select a student to edit.");
        assert!(matches!(status.kind, StatusKind::Error));
    }

    #[test]
    fn edit_overwrites_selected_row() {
        let (_dir, mut app) = app();
        app.handle_key(KeyCode::Char('+'));
        fill_form(&mut app, &ALICE);
        app.handle_key(KeyCode::Enter);

        app.handle_key(KeyCode::Char('e'));
        app.handle_key(KeyCode::Tab);
        for _ in 0.."Alice".len() {
            app.handle_key(KeyCode::Backspace);
        }
        type_text(&mut app, "Alicia");
        app.handle_key(KeyCode::Enter);

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.store.records()[0].name, "Alicia");
    }

    #[test]
    fn removal_requires_confirmation() {
        let (_dir, mut app) = app();
        app.handle_key(KeyCode::Char('+'));
        fill_form(&mut app, &ALICE);
        app.handle_key(KeyCode::Enter);

        app.handle_key(KeyCode::Char('-'));
        app.handle_key(KeyCode::Char('n'));
        assert_eq!(app.store.len(), 1);

        app.handle_key(KeyCode::Char('-'));
        app.handle_key(KeyCode::Char('y'));
        assert!(app.store.is_empty());
        assert_eq!(app.selected, None);
    }

    #[test]
    fn selection_is_clamped() {
        let (_dir, mut app) = app();
        for id in ["S1", "S2", "S3"] {
            app.handle_key(KeyCode::Char('+'));
            let mut values = ALICE;
            values[0] = id;
            fill_form(&mut app, &values);
            app.handle_key(KeyCode::Enter);
        }

        app.handle_key(KeyCode::PageDown);
        assert_eq!(app.selected, Some(2));
        app.handle_key(KeyCode::Up);
        assert_eq!(app.selected, Some(1));
        app.handle_key(KeyCode::Home);
        assert_eq!(app.selected, Some(0));
        app.handle_key(KeyCode::PageUp);
        assert_eq!(app.selected, Some(0));
    }

    #[test]
    fn grid_shows_headers_and_rows() {
        let (_dir, mut app) = app();
        assert!(screen_text(&app).contains("No students yet"));

        app.handle_key(KeyCode::Char('+'));
        fill_form(&mut app, &ALICE);
        app.handle_key(KeyCode::Enter);

        let text = screen_text(&app);
        assert!(text.contains("Registration ID"));
        assert!(text.contains("Alice"));
        assert!(text.contains("Added student in row 1."));
    }

    #[test]
    fn failed_startup_load_degrades_to_usable_empty_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("students.csv");
        let err = StoreError::Io {
            action: "read",
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let mut app = App::new(RecordStore::empty(&path), Some(&err));

        let status = app.status.as_ref().unwrap();
        assert!(status.text.starts_with("Starting with an empty list: failed to read"));
        assert!(status.text.ends_with(": denied"));
        assert!(matches!(status.kind, StatusKind::Error));
        assert!(app.store.is_empty());

        app.handle_key(KeyCode::Char('+'));
        fill_form(&mut app, &ALICE);
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.store.len(), 1);
        assert!(matches!(app.status.as_ref().unwrap().kind, StatusKind::Info));
        assert_eq!(RecordStore::load(&path).unwrap().len(), 1);
    }

    #[test]
    fn failed_removal_keeps_rows_and_reports_error() {
        let (_dir, mut app) = app();
        app.handle_key(KeyCode::Char('+'));
        fill_form(&mut app, &ALICE);
        app.handle_key(KeyCode::Enter);

        let path = app.store.path().to_path_buf();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        app.handle_key(KeyCode::Char('-'));
        app.handle_key(KeyCode::Char('y'));

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.store.len(), 1);
        assert!(matches!(app.status.as_ref().unwrap().kind, StatusKind::Error));
    }

    #[test]
    fn quit_keys_exit_from_grid_only() {
        let (_dir, mut app) = app();
        app.handle_key(KeyCode::Char('+'));
        assert!(!app.handle_key(KeyCode::Char('q')));
        app.handle_key(KeyCode::Esc);
        assert!(app.handle_key(KeyCode::Char('q')));
    }
}
