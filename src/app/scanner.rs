use crate::app::config::Config;
use crate::app::error::{ConfigError, FileWarning, PromptError, WarningKind};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};
use pathdiff::diff_paths;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Files chosen for the prompt, in traversal order, plus anything the walk
/// had to skip.
#[derive(Debug, Default)]
pub struct Selection {
    pub files: Vec<PathBuf>,
    pub warnings: Vec<FileWarning>,
}

pub struct Scanner {
    root: PathBuf,
    extensions: Vec<String>,
    exclude_files: HashSet<String>,
    exclude_set: GlobSet,
    exclude_dirs: HashSet<String>,
    focus_dirs: Vec<String>,
    use_gitignore: bool,
}

impl Scanner {
    pub fn new(root: PathBuf, config: &Config) -> Result<Self, ConfigError> {
        let (patterns, literals): (Vec<String>, Vec<String>) = config
            .exclude_files
            .iter()
            .map(|f| normalize_path(f))
            .filter(|f| !f.is_empty())
            .partition(|f| is_glob(f));

        Ok(Self {
            root,
            extensions: config
                .extensions
                .iter()
                .map(|e| normalize_extension(e))
                .filter(|e| e.len() > 1)
                .collect(),
            exclude_files: literals.into_iter().collect(),
            exclude_set: build_globset(&patterns)?,
            exclude_dirs: config.exclude_dirs.iter().cloned().collect(),
            focus_dirs: config
                .focus_dirs
                .iter()
                .map(|d| normalize_path(d))
                .filter(|d| !d.is_empty())
                .collect(),
            use_gitignore: config.use_gitignore,
        })
    }

    /// Walks the root and returns every file that passes the selection rules.
    /// Excluded and out-of-focus directories are pruned before descending.
    /// Entries are visited depth-first in file-name order, so output is
    /// reproducible on an unchanged tree.
    pub fn scan(&self) -> Selection {
        let mut selection = Selection::default();

        let root = self.root.clone();
        let exclude_dirs = self.exclude_dirs.clone();
        let focus_dirs = self.focus_dirs.clone();

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .git_ignore(self.use_gitignore)
            .git_exclude(self.use_gitignore)
            .parents(self.use_gitignore)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| keep_entry(entry, &root, &exclude_dirs, &focus_dirs))
            .build();

        for result in walker {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if file_type.is_dir() || !self.is_selected(entry.path()) {
                        continue;
                    }
                    // Links are not followed for walking, but a link to a file is read through
                    if file_type.is_file() || entry.path().is_file() {
                        selection.files.push(entry.into_path());
                    } else if file_type.is_symlink() && !entry.path().exists() {
                        log::warn!("Skipping dangling link {:?}", entry.path());
                        selection.warnings.push(FileWarning::new(
                            entry.path(),
                            WarningKind::Walk("dangling symlink".to_string()),
                        ));
                    }
                }
                Err(err) => {
                    let path = error_path(&err).unwrap_or_else(|| self.root.clone());
                    log::warn!("Error walking entry: {}", err);
                    selection
                        .warnings
                        .push(FileWarning::new(path, WarningKind::Walk(err.to_string())));
                }
            }
        }

        log::debug!(
            "Selected {} files under {:?}",
            selection.files.len(),
            self.root
        );
        selection
    }

    fn is_selected(&self, path: &Path) -> bool {
        let Some(relative) = diff_paths(path, &self.root) else {
            return false;
        };
        let relative = normalize_path(&relative.to_string_lossy());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if !self.extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
            return false;
        }
        if is_minified(&name) {
            log::trace!("Skipping minified file {}", relative);
            return false;
        }
        if self.exclude_files.contains(&relative) || self.exclude_set.is_match(&relative) {
            log::trace!("Skipping excluded file {}", relative);
            return false;
        }
        self.focus_dirs.is_empty()
            || self
                .focus_dirs
                .iter()
                .any(|fd| relative.starts_with(&format!("{}/", fd)))
    }
}

/// Directory filter for the walker. Files always pass here; they are judged in
/// `is_selected`.
fn keep_entry(
    entry: &DirEntry,
    root: &Path,
    exclude_dirs: &HashSet<String>,
    focus_dirs: &[String],
) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_dir()) {
        return true;
    }
    if let Some(name) = entry.file_name().to_str() {
        if exclude_dirs.contains(name) {
            log::debug!("Pruning excluded directory {:?}", entry.path());
            return false;
        }
    }
    if focus_dirs.is_empty() {
        return true;
    }
    let Some(relative) = diff_paths(entry.path(), root) else {
        return false;
    };
    let relative = normalize_path(&relative.to_string_lossy());
    focus_dirs.iter().any(|fd| {
        *fd == relative
            || relative.starts_with(&format!("{}/", fd))
            || fd.starts_with(&format!("{}/", relative))
    })
}

/// Resolves `--single-file` against the target directory.
pub fn select_single(root: &Path, file: &Path) -> Result<PathBuf, PromptError> {
    let path = root.join(file);
    if !path.exists() {
        return Err(PromptError::SingleFileMissing(path));
    }
    if !path.is_file() {
        return Err(PromptError::NotAFile(path));
    }
    Ok(path)
}

/// The one normalization rule used for exclusions, focus directories and
/// candidate paths: forward slashes, no leading `./`, no repeated or trailing
/// `/`, lower case.
pub fn normalize_path(raw: &str) -> String {
    raw.trim()
        .replace('\\', "/")
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
        .to_lowercase()
}

fn normalize_extension(raw: &str) -> String {
    let ext = raw.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

/// A name containing `.min.` (`app.min.js`, `style.min.css`) is treated as
/// minified. Expects a lower-cased name.
pub fn is_minified(name: &str) -> bool {
    name.contains(".min.")
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).map_err(|source| ConfigError::Glob {
            pattern: pat.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| ConfigError::Glob {
        pattern: patterns.join(", "),
        source,
    })
}

fn error_path(err: &ignore::Error) -> Option<PathBuf> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.clone()),
        _ => None,
    }
}
