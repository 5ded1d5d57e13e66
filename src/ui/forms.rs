use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{StudentRecord, FIELD_COUNT, FIELD_LABELS, SEPARATOR};

/// Input state shared by the add and edit dialogs: one text buffer per
/// column plus the focused field and the last error.
#[derive(Default, Clone)]
pub(crate) struct RecordForm {
    pub(crate) values: [String; FIELD_COUNT],
    pub(crate) active: usize,
    pub(crate) error: Option<String>,
}

impl RecordForm {
    /// Populate the form from an existing record when editing.
    pub(crate) fn from_record(record: &StudentRecord) -> Self {
        Self {
            values: record.to_fields(),
            active: 0,
            error: None,
        }
    }

    /// Move focus down, wrapping to the first field.
    pub(crate) fn next_field(&mut self) {
        self.active = (self.active + 1) % FIELD_COUNT;
    }

    /// Move focus up, wrapping to the last field.
    pub(crate) fn previous_field(&mut self) {
        self.active = (self.active + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    /// Append a character to the active field. Control characters and the
    /// file separator are refused.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() || ch == SEPARATOR {
            return false;
        }
        self.values[self.active].push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.values[self.active].pop();
    }

    /// Hand the raw buffers to the command layer, which trims and validates.
    pub(crate) fn to_fields(&self) -> [String; FIELD_COUNT] {
        self.values.clone()
    }

    /// Width of the right-aligned label column, colon and space included.
    pub(crate) fn label_width() -> usize {
        FIELD_LABELS.iter().map(|label| label.len()).max().unwrap_or(0) + 2
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: usize) -> Line<'static> {
        let value = &self.values[field];
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let width = Self::label_width();
        Line::from(vec![
            Span::raw(format!("{:>width$}", format!("{}: ", FIELD_LABELS[field]))),
            Span::styled(display, style),
        ])
    }

    /// Character count of the active field, used to place the cursor.
    pub(crate) fn active_len(&self) -> usize {
        self.values[self.active].chars().count()
    }
}

/// Pending removal awaiting a Y/N answer.
#[derive(Clone)]
pub(crate) struct ConfirmRemove {
    pub(crate) index: usize,
    pub(crate) record: StudentRecord,
}
