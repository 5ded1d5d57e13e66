//! Domain model for a single roster row. A `StudentRecord` is a plain data
//! holder: nine strings in a fixed column order. The order matters because it
//! drives both the grid columns in the TUI and the on-disk field order.

use std::fmt;

use thiserror::Error;

/// Number of fields carried by every record.
pub const FIELD_COUNT: usize = 9;

/// Column headers, in on-disk order. These double as the form labels.
pub const FIELD_LABELS: [&str; FIELD_COUNT] = [
    "Registration ID",
    "Student Name",
    "Gender",
    "Date of Birth",
    "Admission Date",
    "Course",
    "Current Semester",
    "Discount",
    "Mobile No.",
];

/// Character used to join fields on disk. Values may not contain it because
/// the file format has no quoting.
pub const SEPARATOR: char = ',';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// One student row.
pub struct StudentRecord {
    pub registration_id: String,
    pub name: String,
    pub gender: String,
    pub date_of_birth: String,
    pub admission_date: String,
    pub course: String,
    pub current_semester: String,
    pub discount: String,
    pub mobile_number: String,
}

/// Reasons a record is rejected at the input boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill all fields ({label} is empty).")]
    EmptyField { label: &'static str },
    #[error("{label} may not contain a comma or line break.")]
    ForbiddenCharacter { label: &'static str },
}

impl StudentRecord {
    /// Build a record from nine values in column order.
    pub fn from_fields(fields: [String; FIELD_COUNT]) -> Self {
        let [registration_id, name, gender, date_of_birth, admission_date, course, current_semester, discount, mobile_number] =
            fields;
        Self {
            registration_id,
            name,
            gender,
            date_of_birth,
            admission_date,
            course,
            current_semester,
            discount,
            mobile_number,
        }
    }

    /// Borrow the fields in column order.
    pub fn fields(&self) -> [&str; FIELD_COUNT] {
        [
            &self.registration_id,
            &self.name,
            &self.gender,
            &self.date_of_birth,
            &self.admission_date,
            &self.course,
            &self.current_semester,
            &self.discount,
            &self.mobile_number,
        ]
    }

    /// Clone the fields out in column order, handy for pre-filling forms.
    pub fn to_fields(&self) -> [String; FIELD_COUNT] {
        self.fields().map(str::to_string)
    }

    /// Check the entry-boundary rules: every field non-blank and free of the
    /// separator or line breaks. Reports the first offending column.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (label, value) in FIELD_LABELS.iter().zip(self.fields()) {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyField { label });
            }
            if value.contains([SEPARATOR, '\n', '\r']) {
                return Err(ValidationError::ForbiddenCharacter { label });
            }
        }
        Ok(())
    }
}

impl fmt::Display for StudentRecord {
    /// `ID - Name`, used in confirmations and status lines.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.registration_id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> StudentRecord {
        StudentRecord::from_fields(
            [
                "S1",
                "Alice",
                "F",
                "2000-01-01",
                "2020-01-01",
                "CS",
                "3",
                "0",
                "9999999999",
            ]
            .map(String::from),
        )
    }

    #[test]
    fn fields_follow_column_order() {
        let record = alice();
        assert_eq!(record.fields()[0], "S1");
        assert_eq!(record.fields()[1], "Alice");
        assert_eq!(record.fields()[8], "9999999999");
        assert_eq!(StudentRecord::from_fields(record.to_fields()), record);
    }

    #[test]
    fn valid_record_passes() {
        assert_eq!(alice().validate(), Ok(()));
    }

    #[test]
    fn blank_field_is_rejected_with_its_label() {
        let mut record = alice();
        record.course = "   ".to_string();
        assert_eq!(
            record.validate(),
            Err(ValidationError::EmptyField { label: "Course" })
        );
    }

    #[test]
    fn separator_is_rejected() {
        let mut record = alice();
        record.name = "Smith, Alice".to_string();
        assert_eq!(
            record.validate(),
            Err(ValidationError::ForbiddenCharacter {
                label: "Student Name"
            })
        );
    }

    #[test]
    fn display_shows_id_and_name() {
        assert_eq!(alice().to_string(), "S1 - Alice");
    }
}
