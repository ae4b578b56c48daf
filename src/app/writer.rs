use crate::app::error::PromptError;
use crate::app::formatter::{OutputGenerator, RenderContext};
use crate::app::models::{Chunk, FileRecord};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Splits `records` into contiguous ranges, one per output file.
///
/// Without a budget everything lands in one range. With one, files are added
/// greedily until the next file's tokens would push the running total past the
/// budget. Files are never split, so a file over the budget on its own ends up
/// alone in its chunk. Always returns at least one range.
pub fn plan_chunks(records: &[FileRecord], budget: Option<usize>) -> Vec<Range<usize>> {
    let Some(budget) = budget else {
        return vec![0..records.len()];
    };

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut used = 0usize;
    for (i, record) in records.iter().enumerate() {
        if i > start && used.saturating_add(record.tokens) > budget {
            chunks.push(start..i);
            start = i;
            used = 0;
        }
        if record.tokens > budget {
            log::debug!(
                "{} ({} tokens) exceeds chunk size {}, giving it its own chunk",
                record.relative_path,
                record.tokens,
                budget
            );
        }
        used = used.saturating_add(record.tokens);
    }
    chunks.push(start..records.len());
    chunks
}

/// `<prefix>-code-prompt-<stamp>.txt`, or `..._part<N>.txt` when there is more
/// than one part.
pub fn output_paths(output_dir: &Path, prefix: &str, stamp: &str, parts: usize) -> Vec<PathBuf> {
    let base = format!("{}-code-prompt-{}", prefix, stamp);
    if parts <= 1 {
        return vec![output_dir.join(format!("{}.txt", base))];
    }
    (1..=parts)
        .map(|part| output_dir.join(format!("{}_part{}.txt", base, part)))
        .collect()
}

/// Renders and writes every chunk, returning the written paths in part order.
pub fn write_chunks(
    output_dir: &Path,
    prefix: &str,
    ctx: &RenderContext,
    records: &[FileRecord],
    budget: Option<usize>,
) -> Result<Vec<PathBuf>, PromptError> {
    fs::create_dir_all(output_dir).map_err(|source| PromptError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let ranges = plan_chunks(records, budget);
    let stamp = ctx.generated_at.format("%Y-%m-%d_%H%M").to_string();
    let paths = output_paths(output_dir, prefix, &stamp, ranges.len());

    for (i, (range, path)) in ranges.into_iter().zip(&paths).enumerate() {
        let chunk = Chunk {
            part: i + 1,
            total_parts: paths.len(),
            files: &records[range],
        };
        let text = OutputGenerator::render_chunk(ctx, &chunk);
        write_file(path, &text)?;
        log::debug!(
            "Wrote part {} ({} files, ~{} tokens) to {:?}",
            chunk.part,
            chunk.files.len(),
            chunk.tokens(),
            path
        );
    }

    Ok(paths)
}

fn write_file(path: &Path, text: &str) -> Result<(), PromptError> {
    let to_error = |source: std::io::Error| PromptError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(to_error)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(text.as_bytes()).map_err(to_error)?;
    writer.flush().map_err(to_error)
}
