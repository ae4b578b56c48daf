use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Bundle project source files into a single text prompt for LLMs"
)]
pub struct Cli {
    /// Directory to scan for code files
    #[arg(short = 't', long, default_value = ".")]
    pub target_dir: PathBuf,

    /// Directory to save the output file(s) in
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: PathBuf,

    /// File extensions to include (replaces the config list)
    #[arg(long, num_args = 1..)]
    pub extensions: Option<Vec<String>>,

    /// Process only this file (relative to the target directory)
    #[arg(short = 's', long)]
    pub single_file: Option<PathBuf>,

    /// Additional file to exclude (repeatable)
    #[arg(short = 'e', long = "exclude-file")]
    pub exclude_files: Vec<String>,

    /// Additional directory name to exclude (repeatable)
    #[arg(short = 'd', long = "exclude-dir")]
    pub exclude_dirs: Vec<String>,

    /// Only process files under these directories (repeatable)
    #[arg(short = 'f', long = "focus-dir")]
    pub focus_dirs: Vec<String>,

    /// Ignore config excludes and use only command-line excludes
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Maximum estimated tokens per output chunk
    #[arg(short = 'c', long)]
    pub chunk_size: Option<usize>,

    /// Disable the project summary
    #[arg(long)]
    pub no_summary: bool,

    /// Repeat the project summary in every chunk
    #[arg(long)]
    pub repeat_summary: bool,

    /// Also honor .gitignore files
    #[arg(long)]
    pub gitignore: bool,

    /// Number of entries in the summary's largest/recent file lists
    #[arg(long)]
    pub top: Option<usize>,

    /// Path to the JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeatable_flags_accumulate() {
        let cli = Cli::try_parse_from([
            "code-prompt-builder",
            "-e",
            "a.py",
            "--exclude-file",
            "b.py",
            "-d",
            "target",
            "-f",
            "src",
            "-f",
            "docs",
        ])
        .unwrap();
        assert_eq!(cli.exclude_files, vec!["a.py", "b.py"]);
        assert_eq!(cli.exclude_dirs, vec!["target"]);
        assert_eq!(cli.focus_dirs, vec!["src", "docs"]);
        assert_eq!(cli.target_dir, PathBuf::from("."));
    }

    #[test]
    fn extensions_take_multiple_values() {
        let cli =
            Cli::try_parse_from(["code-prompt-builder", "--extensions", ".rs", ".toml"]).unwrap();
        assert_eq!(
            cli.extensions,
            Some(vec![".rs".to_string(), ".toml".to_string()])
        );
    }

    #[test]
    fn verbosity_maps_to_log_level() {
        let cli = Cli::try_parse_from(["code-prompt-builder", "-vv"]).unwrap();
        assert_eq!(cli.log_level(), log::LevelFilter::Trace);
        let cli = Cli::try_parse_from(["code-prompt-builder", "-q"]).unwrap();
        assert_eq!(cli.log_level(), log::LevelFilter::Error);
        assert!(Cli::try_parse_from(["code-prompt-builder", "-q", "-v"]).is_err());
    }
}
