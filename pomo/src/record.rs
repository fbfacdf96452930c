//! Activity log: one line per finished work or pause segment

use anyhow::Context;
use chrono::{DateTime, Local};
use std::borrow::Cow;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const DELIMITER: char = ';';
const QUOTE: char = '|';
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Written in place of an empty description
pub const UNDEFINED_DESCRIPTION: &str = "undefined";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Work,
    Pause,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Work => "work",
            SegmentKind::Pause => "pause",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub description: String,
    pub kind: SegmentKind,
}

impl ActivityRecord {
    /// `start;end;description;kind` terminated by CRLF, quoting only the
    /// fields that need it.
    pub fn to_line(&self) -> String {
        let start = self.start.format(TIMESTAMP_FORMAT).to_string();
        let end = self.end.format(TIMESTAMP_FORMAT).to_string();
        let description = if self.description.is_empty() {
            UNDEFINED_DESCRIPTION
        } else {
            self.description.as_str()
        };
        let fields = [
            quote_field(&start),
            quote_field(&end),
            quote_field(description),
            quote_field(self.kind.as_str()),
        ];
        let mut line = fields.join(";");
        line.push_str("\r\n");
        line
    }
}

fn quote_field(field: &str) -> Cow<'_, str> {
    let needs_quoting = field
        .chars()
        .any(|c| c == DELIMITER || c == QUOTE || c == '\r' || c == '\n');
    if needs_quoting {
        let doubled = field.replace(QUOTE, "||");
        Cow::Owned(format!("{QUOTE}{doubled}{QUOTE}"))
    } else {
        Cow::Borrowed(field)
    }
}

/// Destination for finished segments
pub trait ActivityRecorder: Send {
    fn append(&mut self, record: &ActivityRecord) -> io::Result<()>;
}

/// Appends records to a semicolon-delimited file. Never rewrites it.
pub struct CsvRecorder {
    path: PathBuf,
}

impl CsvRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Make sure the log's directory exists before the first record is due.
    pub fn prepare(&self) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create activity log directory {:?}", dir))?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ActivityRecorder for CsvRecorder {
    fn append(&mut self, record: &ActivityRecord) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(record.to_line().as_bytes())
    }
}
