use crate::app::cli::Cli;
use crate::app::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_DIR_NAME: &str = "code-prompt-builder";
pub const CONFIG_FILE_NAME: &str = "config.json";
/// Used when the platform has no config directory.
pub const FALLBACK_CONFIG_FILE: &str = "code_prompt_builder_config.json";

/// Effective settings for one run. Missing keys in the JSON file take the
/// defaults below; `ignore_dirs` is accepted as an older name for
/// `exclude_dirs`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub extensions: Vec<String>,
    pub exclude_files: Vec<String>,
    #[serde(alias = "ignore_dirs")]
    pub exclude_dirs: Vec<String>,
    pub focus_dirs: Vec<String>,
    pub chunk_size: Option<usize>,
    pub include_summary: bool,
    pub repeat_summary: bool,
    pub use_gitignore: bool,
    pub top_files: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: to_strings(&[".html", ".css", ".js", ".py", ".md", ".json"]),
            exclude_files: Vec::new(),
            exclude_dirs: to_strings(&[
                ".git",
                ".venv",
                "venv",
                "node_modules",
                "__pycache__",
                ".idea",
                ".vscode",
                "dist",
                "build",
                "env",
                ".pytest_cache",
            ]),
            focus_dirs: Vec::new(),
            chunk_size: None,
            include_summary: true,
            repeat_summary: false,
            use_gitignore: false,
            top_files: 5,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(0) = self.chunk_size {
            return Err(ConfigError::ChunkSize(0));
        }
        if self.top_files == 0 {
            return Err(ConfigError::TopFiles(0));
        }
        Ok(())
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_CONFIG_FILE))
}

/// Reads the config at `path`, writing the defaults there first if the file
/// does not exist. Failing to create the file is only a warning; failing to
/// read or parse an existing one is an error.
pub fn load_or_create(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        let defaults = Config::default();
        match write_config(path, &defaults) {
            Ok(()) => log::info!("Created default config {:?}", path),
            Err(e) => log::warn!("Could not create config {:?} ({}), using defaults", path, e),
        }
        return Ok(defaults);
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;

    log::debug!("Loaded config from {:?}", path);
    Ok(config)
}

pub fn write_config(path: &Path, config: &Config) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config).map_err(io::Error::other)?;
    fs::write(path, json + "\n")
}

fn merge_vecs(base: Vec<String>, cli_items: &[String]) -> Vec<String> {
    let mut combined = base;
    combined.extend(cli_items.iter().cloned());
    // Deduplicate while keeping order
    let mut seen = std::collections::HashSet::new();
    combined.retain(|item| seen.insert(item.clone()));
    combined
}

fn merge_excludes(base: Vec<String>, cli_items: &[String], cli_only: bool) -> Vec<String> {
    if cli_only {
        merge_vecs(Vec::new(), cli_items)
    } else {
        merge_vecs(base, cli_items)
    }
}

/// Applies command-line overrides on top of the loaded config.
pub fn resolve_config(cli: &Cli, base: Config) -> Result<Config, ConfigError> {
    let config = Config {
        extensions: match &cli.extensions {
            Some(list) => merge_vecs(Vec::new(), list),
            None => base.extensions,
        },
        exclude_files: merge_excludes(
            base.exclude_files,
            &cli.exclude_files,
            cli.no_default_excludes,
        ),
        exclude_dirs: merge_excludes(base.exclude_dirs, &cli.exclude_dirs, cli.no_default_excludes),
        focus_dirs: merge_vecs(base.focus_dirs, &cli.focus_dirs),
        chunk_size: cli.chunk_size.or(base.chunk_size),
        include_summary: base.include_summary && !cli.no_summary,
        repeat_summary: base.repeat_summary || cli.repeat_summary,
        use_gitignore: base.use_gitignore || cli.gitignore,
        top_files: cli.top.unwrap_or(base.top_files),
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["code-prompt-builder"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn missing_config_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = load_or_create(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let written: Config =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, Config::default());
        assert_eq!(written.chunk_size, None);
        assert!(written.exclude_dirs.contains(&"node_modules".to_string()));
    }

    #[test]
    fn partial_config_fills_in_defaults_and_accepts_ignore_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"extensions": [".rs"], "ignore_dirs": ["target"], "chunk_size": 500}"#,
        )
        .unwrap();

        let config = load_or_create(&path).unwrap();
        assert_eq!(config.extensions, vec![".rs"]);
        assert_eq!(config.exclude_dirs, vec!["target"]);
        assert_eq!(config.chunk_size, Some(500));
        assert!(config.include_summary);
        assert_eq!(config.top_files, 5);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "invalid json").unwrap();

        let err = load_or_create(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"chunk_size": 0}"#).unwrap();
        assert!(matches!(
            load_or_create(&path).unwrap_err(),
            ConfigError::ChunkSize(0)
        ));

        let err = resolve_config(&cli(&["-c", "0"]), Config::default()).unwrap_err();
        assert!(matches!(err, ConfigError::ChunkSize(0)));
    }

    #[test]
    fn cli_extensions_replace_config_list() {
        let config = resolve_config(&cli(&["--extensions", ".rs"]), Config::default()).unwrap();
        assert_eq!(config.extensions, vec![".rs"]);
    }

    #[test]
    fn cli_excludes_are_additive() {
        let base = Config {
            exclude_files: vec!["a.py".to_string()],
            ..Config::default()
        };
        let config = resolve_config(&cli(&["-e", "b.py", "-d", "target"]), base).unwrap();
        assert_eq!(config.exclude_files, vec!["a.py", "b.py"]);
        assert!(config.exclude_dirs.contains(&".git".to_string()));
        assert!(config.exclude_dirs.contains(&"target".to_string()));
    }

    #[test]
    fn no_default_excludes_keeps_only_cli_excludes() {
        let base = Config {
            exclude_files: vec!["a.py".to_string()],
            ..Config::default()
        };
        let config =
            resolve_config(&cli(&["--no-default-excludes", "-d", "target"]), base).unwrap();
        assert!(config.exclude_files.is_empty());
        assert_eq!(config.exclude_dirs, vec!["target"]);
    }

    #[test]
    fn flags_override_scalars() {
        let base = Config {
            chunk_size: Some(1000),
            focus_dirs: vec!["src".to_string()],
            ..Config::default()
        };
        let config = resolve_config(
            &cli(&["-c", "200", "--no-summary", "-f", "docs", "-f", "src", "--top", "3"]),
            base,
        )
        .unwrap();
        assert_eq!(config.chunk_size, Some(200));
        assert!(!config.include_summary);
        assert_eq!(config.focus_dirs, vec!["src", "docs"]);
        assert_eq!(config.top_files, 3);
    }
}
