use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::codec::{decode_line, encode_line};
use super::error::StoreError;
use crate::models::{StudentRecord, FIELD_COUNT};

/// Authoritative, ordered list of student records mirrored to a flat file.
///
/// Every mutation rewrites the whole file before returning. If that rewrite
/// fails the in-memory change is rolled back, so the list never drifts from
/// the last snapshot that made it to disk.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    records: Vec<StudentRecord>,
}

impl RecordStore {
    /// Load the roster at `path`. A missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = Self::load(&path)?;
        Ok(Self { path, records })
    }

    /// Start with an empty roster bound to `path` without touching the disk.
    /// Used when the initial load failed and the application degrades.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    /// Read every record from `path` in file order.
    pub fn load(path: &Path) -> Result<Vec<StudentRecord>, StoreError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "roster file not found, starting with an empty list");
                return Ok(Vec::new());
            }
            Err(err) => return Err(StoreError::io("open", path, err)),
        };

        let mut reader = BufReader::new(file);
        let mut records = Vec::new();
        let mut buf = Vec::new();
        let mut line_no: usize = 0;
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|err| StoreError::io("read", path, err))?;
            if read == 0 {
                break;
            }
            line_no += 1;

            let raw = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
            let line = String::from_utf8_lossy(raw);
            if let Cow::Owned(_) = line {
                warn!(path = %path.display(), line = line_no, "roster line is not valid UTF-8");
            }

            match decode_line(&line) {
                Some((record, found)) => {
                    if found != FIELD_COUNT {
                        warn!(
                            path = %path.display(),
                            line = line_no,
                            found,
                            expected = FIELD_COUNT,
                            "malformed roster line"
                        );
                    }
                    records.push(record);
                }
                None => debug!(line = line_no, "skipping blank roster line"),
            }
        }

        info!(path = %path.display(), count = records.len(), "loaded roster");
        Ok(records)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-only view of the roster in display order.
    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&StudentRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a record and persist. Returns the index of the new row.
    pub fn add(&mut self, record: StudentRecord) -> Result<usize, StoreError> {
        record.validate()?;
        self.records.push(record);
        if let Err(err) = self.persist() {
            self.records.pop();
            return Err(err);
        }
        Ok(self.records.len() - 1)
    }

    /// Overwrite every field of the row at `index` and persist.
    pub fn update(&mut self, index: usize, record: StudentRecord) -> Result<(), StoreError> {
        self.check_index(index)?;
        record.validate()?;
        let previous = std::mem::replace(&mut self.records[index], record);
        if let Err(err) = self.persist() {
            self.records[index] = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Delete the row at `index`, shifting later rows up, and persist.
    pub fn remove(&mut self, index: usize) -> Result<StudentRecord, StoreError> {
        self.check_index(index)?;
        let removed = self.records.remove(index);
        if let Err(err) = self.persist() {
            self.records.insert(index, removed);
            return Err(err);
        }
        Ok(removed)
    }

    /// Rewrite the backing file from the in-memory list. The snapshot goes to
    /// a sibling temporary file first and is then renamed over the target, so
    /// a crash mid-write leaves the previous file intact.
    pub fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|err| StoreError::io("create directory for", &self.path, err))?;
            }
        }

        let tmp_path = self.tmp_path();
        if let Err(err) = self.write_snapshot(&tmp_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::io("write", &tmp_path, err));
        }
        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::io("replace", &self.path, err));
        }

        debug!(path = %self.path.display(), count = self.records.len(), "roster saved");
        Ok(())
    }

    fn write_snapshot(&self, tmp_path: &Path) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(tmp_path)?);
        for record in &self.records {
            writer.write_all(encode_line(record).as_bytes())?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn check_index(&self, index: usize) -> Result<(), StoreError> {
        if index < self.records.len() {
            Ok(())
        } else {
            Err(StoreError::IndexOutOfRange {
                index,
                len: self.records.len(),
            })
        }
    }
}
