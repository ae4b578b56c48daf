use crate::app::error::{FileWarning, WarningKind};
use crate::app::models::FileRecord;
use crate::app::tokens::estimate_tokens;
use chrono::{DateTime, Local};
use pathdiff::diff_paths;
use std::fs;
use std::path::{Path, PathBuf};

/// Bytes inspected for a NUL when deciding whether a file is binary.
const BINARY_SAMPLE: usize = 1024;

#[derive(Debug, Default)]
pub struct Collection {
    pub records: Vec<FileRecord>,
    pub warnings: Vec<FileWarning>,
    pub binary_skipped: usize,
}

/// Reads every selected file once, in the given order.
pub fn collect(root: &Path, files: &[PathBuf]) -> Collection {
    let mut collection = Collection::default();

    for path in files {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Skipping {:?}: {}", path, e);
                collection
                    .warnings
                    .push(FileWarning::new(path, WarningKind::Unreadable(e.to_string())));
                continue;
            }
        };

        if is_binary(&bytes) {
            log::warn!("Skipping binary file {:?}", path);
            collection.binary_skipped += 1;
            collection
                .warnings
                .push(FileWarning::new(path, WarningKind::Binary));
            continue;
        }

        let size = bytes.len() as u64;
        let (content, decode_error) = match String::from_utf8(bytes) {
            Ok(text) => (text, false),
            Err(e) => {
                log::warn!("{:?} is not valid UTF-8, decoding lossily", path);
                collection
                    .warnings
                    .push(FileWarning::new(path, WarningKind::Decode));
                (String::from_utf8_lossy(e.as_bytes()).into_owned(), true)
            }
        };

        let modified = fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Local>::from);

        collection.records.push(FileRecord {
            relative_path: relative_display(root, path),
            extension: extension_of(path),
            lines: content.lines().count(),
            size,
            modified,
            tokens: estimate_tokens(&content),
            content,
            decode_error,
        });
    }

    log::debug!(
        "Collected {} records ({} binary skipped)",
        collection.records.len(),
        collection.binary_skipped
    );
    collection
}

fn is_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(BINARY_SAMPLE).any(|&b| b == 0)
}

fn relative_display(root: &Path, path: &Path) -> String {
    diff_paths(path, root)
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .replace('\\', "/")
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_else(|| "(no extension)".to_string())
}
