// Declare modules
pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod metadata;
pub mod models;
pub mod scanner;
pub mod summary;
pub mod tokens;
pub mod writer;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};

use self::cli::Cli;
use self::config::{default_config_path, load_or_create, resolve_config, Config};
use self::error::PromptError;
use self::formatter::{format_file_size, format_with_commas, RenderContext};
use self::models::BuildReport;
use self::scanner::{select_single, Scanner, Selection};
use self::summary::generate_summary;
use self::writer::write_chunks;

/// Everything one build needs, resolved up front.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub target_dir: PathBuf,
    pub output_dir: PathBuf,
    pub single_file: Option<PathBuf>,
    pub config: Config,
    pub generated_at: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Selecting,
    Collecting,
    Summarizing,
    Writing,
    Done,
    Error,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "initializing",
            Stage::Selecting => "selecting files",
            Stage::Collecting => "collecting metadata",
            Stage::Summarizing => "summarizing",
            Stage::Writing => "writing output",
            Stage::Done => "done",
            Stage::Error => "error",
        };
        f.write_str(name)
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    log::debug!("Stage: {} -> {}", stage, next);
    *stage = next;
}

/// Initializes components and orchestrates data flow.
pub fn run(cli: Cli) -> Result<BuildReport> {
    // 1. Effective config: file (created if missing) + CLI overrides
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let base = load_or_create(&config_path)?;
    let config = resolve_config(&cli, base)?;

    log::info!("Building code prompt...");
    let request = BuildRequest {
        target_dir: cli.target_dir,
        output_dir: cli.output_dir,
        single_file: cli.single_file,
        config,
        generated_at: Local::now(),
    };

    // 2. Scan, collect, summarize, write
    let report = build_prompt(&request)?;

    // 3. Report to stdout
    print_report(&request, &report);
    Ok(report)
}

/// Runs one build. Per-file problems end up in `BuildReport::warnings`; only
/// filesystem and config failures return `Err`.
pub fn build_prompt(request: &BuildRequest) -> Result<BuildReport> {
    let mut stage = Stage::Init;
    let result = execute(request, &mut stage);
    result.map_err(|err| {
        let failed_in = stage;
        advance(&mut stage, Stage::Error);
        err.context(format!("Failed while {}", failed_in))
    })
}

fn execute(request: &BuildRequest, stage: &mut Stage) -> Result<BuildReport> {
    let root = resolve_root(&request.target_dir)?;
    let folder = folder_name(&root);

    advance(stage, Stage::Selecting);
    let selection = match &request.single_file {
        Some(file) => Selection {
            files: vec![select_single(&root, file)?],
            warnings: Vec::new(),
        },
        None => Scanner::new(root.clone(), &request.config)?.scan(),
    };

    advance(stage, Stage::Collecting);
    let collection = metadata::collect(&root, &selection.files);
    let records = collection.records;
    let mut warnings = selection.warnings;
    warnings.extend(collection.warnings);
    if records.is_empty() {
        log::warn!("No files matched the selection rules in {:?}", root);
    }

    let summary = if request.config.include_summary && !records.is_empty() {
        advance(stage, Stage::Summarizing);
        Some(generate_summary(
            &folder,
            &root,
            &records,
            collection.binary_skipped,
            request.config.top_files,
        ))
    } else {
        None
    };

    advance(stage, Stage::Writing);
    let prefix = match &request.single_file {
        Some(file) => single_file_prefix(file),
        None => folder.clone(),
    };
    let ctx = RenderContext {
        folder: &folder,
        generated_at: request.generated_at,
        summary: summary.as_deref(),
        repeat_summary: request.config.repeat_summary,
        total_files: records.len(),
        binary_skipped: collection.binary_skipped,
        warnings: &warnings,
    };
    let outputs = write_chunks(
        &request.output_dir,
        &prefix,
        &ctx,
        &records,
        request.config.chunk_size,
    )?;

    advance(stage, Stage::Done);
    Ok(BuildReport {
        files: records.len(),
        lines: records.iter().map(|r| r.lines).sum(),
        bytes: records.iter().map(|r| r.size).sum(),
        tokens: records.iter().map(|r| r.tokens).sum(),
        binary_skipped: collection.binary_skipped,
        warnings,
        outputs,
    })
}

fn resolve_root(target: &Path) -> Result<PathBuf> {
    if !target.exists() {
        return Err(PromptError::TargetMissing(target.to_path_buf()).into());
    }
    if !target.is_dir() {
        return Err(PromptError::TargetNotDir(target.to_path_buf()).into());
    }
    target
        .canonicalize()
        .with_context(|| format!("Failed to resolve target directory {:?}", target))
}

fn folder_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

/// `./src/app.py` becomes `src_app`.
fn single_file_prefix(file: &Path) -> String {
    let normalized = file.to_string_lossy().replace('\\', "/");
    let trimmed = normalized.trim_start_matches("./");
    let stem = match trimmed.rfind('.') {
        Some(dot) if dot > trimmed.rfind('/').map_or(0, |slash| slash + 1) => &trimmed[..dot],
        _ => trimmed,
    };
    stem.replace('/', "_")
}

fn completion_message(totals: &str, warnings: usize) -> String {
    if warnings == 0 {
        format!("Done! {}", totals)
    } else {
        format!(
            "Completed with warnings! {} See {} warnings in output.",
            totals, warnings
        )
    }
}

fn print_report(request: &BuildRequest, report: &BuildReport) {
    let target = request
        .target_dir
        .canonicalize()
        .unwrap_or_else(|_| request.target_dir.clone());
    let binary_note = if report.binary_skipped > 0 {
        format!(" (Skipped {} binary files)", report.binary_skipped)
    } else {
        String::new()
    };
    let totals = format!(
        "Processed {} files with {} lines, {} tokens ({}) from {:?}{}.",
        report.files,
        report.lines,
        format_with_commas(report.tokens as u64),
        format_file_size(report.bytes),
        target,
        binary_note
    );
    println!("{}", completion_message(&totals, report.warnings.len()));

    if report.outputs.len() > 1 {
        println!("Output split into {} files:", report.outputs.len());
    }
    for path in &report.outputs {
        println!("- {}", path.display());
    }
}
