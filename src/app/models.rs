use crate::app::error::FileWarning;
use chrono::{DateTime, Local};
use std::path::PathBuf;

/// One selected file, read once during collection.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Path relative to the scanned root, always with `/` separators.
    pub relative_path: String,
    /// Lower-cased extension with its leading dot, or `(no extension)`.
    pub extension: String,
    pub lines: usize,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
    pub tokens: usize,
    pub content: String,
    /// True when the bytes were not valid UTF-8 and `content` is a lossy decode.
    pub decode_error: bool,
}

/// A contiguous run of records destined for one output file.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    /// 1-based part number.
    pub part: usize,
    pub total_parts: usize,
    pub files: &'a [FileRecord],
}

impl Chunk<'_> {
    pub fn lines(&self) -> usize {
        self.files.iter().map(|f| f.lines).sum()
    }

    pub fn size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn tokens(&self) -> usize {
        self.files.iter().map(|f| f.tokens).sum()
    }

    pub fn is_last(&self) -> bool {
        self.part == self.total_parts
    }
}

/// What a finished run produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub files: usize,
    pub lines: usize,
    pub bytes: u64,
    pub tokens: usize,
    pub binary_skipped: usize,
    pub warnings: Vec<FileWarning>,
    pub outputs: Vec<PathBuf>,
}
