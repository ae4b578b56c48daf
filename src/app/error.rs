use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Problems with the config file or the merged settings. Always fatal, and
/// always raised before the scan starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config {path:?} is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid chunk size {0}: must be greater than 0")]
    ChunkSize(usize),

    #[error("Invalid top file count {0}: must be greater than 0")]
    TopFiles(usize),

    #[error("Invalid exclusion pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Filesystem failures that end the run.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Target directory {0:?} does not exist")]
    TargetMissing(PathBuf),

    #[error("Target {0:?} is not a directory")]
    TargetNotDir(PathBuf),

    #[error("Path {0:?} does not exist")]
    SingleFileMissing(PathBuf),

    #[error("{0:?} is not a file")]
    NotAFile(PathBuf),

    #[error("Failed to create output directory {path:?}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A recoverable per-file problem. The run continues; the file is skipped
/// (or, for decode errors, included and flagged).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWarning {
    pub path: PathBuf,
    pub kind: WarningKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    Unreadable(String),
    Binary,
    Decode,
    Walk(String),
}

impl FileWarning {
    pub fn new(path: impl Into<PathBuf>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

impl fmt::Display for FileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.display();
        match &self.kind {
            WarningKind::Unreadable(reason) => write!(f, "{}: Failed to read ({})", path, reason),
            WarningKind::Binary => write!(f, "{}: Skipped (binary file)", path),
            WarningKind::Decode => write!(f, "{}: Not valid UTF-8, decoded lossily", path),
            WarningKind::Walk(reason) => write!(f, "{}: Skipped during walk ({})", path, reason),
        }
    }
}
