//! Streaming NDJSON reader
//!
//! Reads one JSON object per line with bounded memory: a single line buffer is
//! reused for the whole file, so file size is never a constraint. The reader is
//! a finite, non-restartable iterator that stops at the first malformed line.

use crate::domain::{Result, TallyError};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

/// Lazy iterator over the JSON objects of one NDJSON file
///
/// Blank (whitespace-only) lines are skipped. Line numbers reported in errors
/// are raw 1-based file line numbers, blank lines included.
///
/// # Examples
///
/// ```no_run
/// use tally::adapters::ndjson::NdjsonReader;
///
/// # fn example() -> tally::domain::Result<()> {
/// for record in NdjsonReader::open("data/raw/fhir/Encounter.000.ndjson")?.take(3) {
///     let record = record?;
///     println!("{}", record["id"]);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct NdjsonReader {
    path: PathBuf,
    display: String,
    reader: BufReader<File>,
    buf: String,
    line_number: usize,
    finished: bool,
}

impl NdjsonReader {
    /// Opens a file for streaming
    ///
    /// # Errors
    ///
    /// Returns [`TallyError::NotFound`] if the file does not exist and
    /// [`TallyError::Io`] if it cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = open_file(path)?;
        tracing::trace!(path = %path.display(), "Opened NDJSON file");

        Ok(Self {
            path: path.to_path_buf(),
            display: path.display().to_string(),
            reader: BufReader::new(file),
            buf: String::new(),
            line_number: 0,
            finished: false,
        })
    }

    /// Path being read
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw line number of the last line read
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn fail(&mut self, err: TallyError) -> Option<Result<Value>> {
        self.finished = true;
        Some(Err(err))
    }
}

impl Iterator for NdjsonReader {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => {
                    self.finished = true;
                    return None;
                }
                Ok(_) => {
                    self.line_number += 1;
                    let line = self.buf.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let err = match serde_json::from_str::<Value>(line) {
                        Ok(value @ Value::Object(_)) => return Some(Ok(value)),
                        Ok(_) => TallyError::malformed(
                            &self.display,
                            self.line_number,
                            line,
                            "expected a JSON object",
                        ),
                        Err(e) => TallyError::malformed(
                            &self.display,
                            self.line_number,
                            line,
                            e.to_string(),
                        ),
                    };
                    return self.fail(err);
                }
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    self.line_number += 1;
                    let err = TallyError::malformed(
                        &self.display,
                        self.line_number,
                        "<invalid UTF-8>",
                        "line is not valid UTF-8",
                    );
                    return self.fail(err);
                }
                Err(e) => {
                    let err = TallyError::Io(format!(
                        "Failed to read {} after line {}: {}",
                        self.display, self.line_number, e
                    ));
                    return self.fail(err);
                }
            }
        }
    }
}

impl FusedIterator for NdjsonReader {}

/// Opens `path` as an [`NdjsonReader`]
pub fn read_ndjson(path: impl AsRef<Path>) -> Result<NdjsonReader> {
    NdjsonReader::open(path)
}

/// Counts the non-blank lines of a file without parsing them
///
/// Uses the same bounded-memory line streaming as [`NdjsonReader`].
///
/// # Errors
///
/// Returns [`TallyError::NotFound`] if the file does not exist and
/// [`TallyError::Io`] on read failure.
pub fn count_ndjson_lines(path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let mut reader = BufReader::new(open_file(path)?);
    let mut line = Vec::new();
    let mut count = 0;

    loop {
        line.clear();
        let read = reader.read_until(b'\n', &mut line).map_err(|e| {
            TallyError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        if read == 0 {
            break;
        }
        if line.iter().any(|b| !b.is_ascii_whitespace()) {
            count += 1;
        }
    }

    Ok(count)
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            TallyError::NotFound(format!("NDJSON file {}", path.display()))
        }
        _ => TallyError::Io(format!("Failed to open {}: {}", path.display(), e)),
    })
}
