//! Line codec for the backing file. One record per line, fields joined by
//! the separator, and a trailing separator before the newline. There is no
//! quoting, so values containing the separator cannot be represented.

use crate::models::{StudentRecord, FIELD_COUNT, SEPARATOR};

/// Serialize a record as a single line, newline included.
pub fn encode_line(record: &StudentRecord) -> String {
    let mut line = String::new();
    for value in record.fields() {
        line.push_str(value);
        line.push(SEPARATOR);
    }
    line.push('\n');
    line
}

/// Parse one line from the backing file.
///
/// Returns `None` for blank lines. Otherwise yields the record together with
/// the number of values found on the line so callers can flag malformed rows.
/// A single trailing separator is the line terminator and never counts as a
/// value. Short rows are padded with empty fields; values past the ninth are
/// dropped.
pub fn decode_line(line: &str) -> Option<(StudentRecord, usize)> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() {
        return None;
    }

    let body = line.strip_suffix(SEPARATOR).unwrap_or(line);
    let values: Vec<&str> = body.split(SEPARATOR).collect();
    let found = values.len();

    let mut fields: [String; FIELD_COUNT] = Default::default();
    for (slot, value) in fields.iter_mut().zip(values) {
        *slot = value.to_string();
    }

    Some((StudentRecord::from_fields(fields), found))
}
