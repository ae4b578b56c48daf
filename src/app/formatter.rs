use crate::app::error::FileWarning;
use crate::app::models::{Chunk, FileRecord};
use chrono::{DateTime, Local};

pub const SEPARATOR: &str = "###";
pub const DECODE_MARKER: &str = "[decode error: lossy UTF-8]";

/// Everything shared by the chunks of one run.
pub struct RenderContext<'a> {
    pub folder: &'a str,
    pub generated_at: DateTime<Local>,
    pub summary: Option<&'a str>,
    pub repeat_summary: bool,
    pub total_files: usize,
    pub binary_skipped: usize,
    pub warnings: &'a [FileWarning],
}

pub struct OutputGenerator;

impl OutputGenerator {
    /// Renders one self-contained output file.
    pub fn render_chunk(ctx: &RenderContext, chunk: &Chunk) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "{} Code Export ({})",
            ctx.folder,
            ctx.generated_at.format("%Y-%m-%d %H:%M")
        ));
        if chunk.total_parts > 1 {
            out.push_str(&format!(" - Part {} of {}", chunk.part, chunk.total_parts));
        }
        out.push('\n');
        out.push_str(SEPARATOR);
        out.push('\n');

        if let Some(summary) = ctx.summary {
            if chunk.part == 1 || ctx.repeat_summary {
                out.push_str(summary);
                out.push_str("\n\n");
                out.push_str(SEPARATOR);
                out.push('\n');
            }
        }

        for record in chunk.files {
            out.push_str(&Self::file_section(ctx.folder, record));
        }

        out.push_str(&Self::footer(ctx, chunk));
        out
    }

    /// Header line, raw content and separator for a single file.
    pub fn file_section(folder: &str, record: &FileRecord) -> String {
        let mut section = format!(
            "{}/{} ({}L, {}, Mod: {})",
            folder,
            record.relative_path,
            record.lines,
            format_file_size(record.size),
            format_timestamp(record.modified.as_ref())
        );
        if record.decode_error {
            section.push(' ');
            section.push_str(DECODE_MARKER);
        }
        section.push('\n');
        section.push_str(&record.content);
        if !record.content.is_empty() && !record.content.ends_with('\n') {
            section.push('\n');
        }
        section.push_str(SEPARATOR);
        section.push('\n');
        section
    }

    fn footer(ctx: &RenderContext, chunk: &Chunk) -> String {
        let mut footer = format!(
            "Files: {}, Lines: {}, Size: {}",
            chunk.files.len(),
            chunk.lines(),
            format_file_size(chunk.size())
        );
        if chunk.is_last() && ctx.binary_skipped > 0 {
            footer.push_str(&format!(" (Skipped {} binary files)", ctx.binary_skipped));
        }
        footer.push('\n');

        if chunk.total_parts > 1 {
            footer.push_str(&format!(
                "Part {} of {}, total files: {}\n",
                chunk.part, chunk.total_parts, ctx.total_files
            ));
        }

        if chunk.is_last() && !ctx.warnings.is_empty() {
            footer.push_str("Errors:\n");
            for warning in ctx.warnings {
                footer.push_str(&format!("- {}\n", warning));
            }
        }

        footer.push_str("END\n");
        footer
    }
}

/// Bytes below 1 KiB, one decimal KB below 1 MiB, two decimal MB above.
pub fn format_file_size(size: u64) -> String {
    if size < 1024 {
        format!("{} bytes", size)
    } else if size < 1024 * 1024 {
        format!("{:.1} KB", size as f64 / 1024.0)
    } else {
        format!("{:.2} MB", size as f64 / (1024.0 * 1024.0))
    }
}

pub fn format_timestamp(time: Option<&DateTime<Local>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Format a number with thousands separators (e.g. 1048576 → "1,048,576").
pub fn format_with_commas(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, ch) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(path: &str, content: &str) -> FileRecord {
        FileRecord {
            relative_path: path.to_string(),
            extension: ".py".to_string(),
            lines: content.lines().count(),
            size: content.len() as u64,
            modified: Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).single(),
            tokens: 1,
            content: content.to_string(),
            decode_error: false,
        }
    }

    fn ctx<'a>(summary: Option<&'a str>, warnings: &'a [FileWarning]) -> RenderContext<'a> {
        RenderContext {
            folder: "demo",
            generated_at: Local.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap(),
            summary,
            repeat_summary: false,
            total_files: 2,
            binary_skipped: 0,
            warnings,
        }
    }

    #[test]
    fn sizes_and_counts_are_human_readable() {
        assert_eq!(format_file_size(512), "512 bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024), "3.00 MB");
        assert_eq!(format_with_commas(999), "999");
        assert_eq!(format_with_commas(1_048_576), "1,048,576");
    }

    #[test]
    fn file_section_has_header_content_and_separator() {
        let section = OutputGenerator::file_section("demo", &record("src/a.py", "x = 1"));
        assert_eq!(
            section,
            "demo/src/a.py (1L, 5 bytes, Mod: 2024-03-01 09:30)\nx = 1\n###\n"
        );
    }

    #[test]
    fn decode_errors_are_marked_in_the_header() {
        let mut rec = record("bad.py", "caf\u{FFFD}\n");
        rec.decode_error = true;
        let section = OutputGenerator::file_section("demo", &rec);
        assert!(section.lines().next().unwrap().ends_with(DECODE_MARKER));
    }

    #[test]
    fn single_chunk_layout() {
        let files = vec![record("a.py", "a\n"), record("b.py", "b\nb\n")];
        let chunk = Chunk {
            part: 1,
            total_parts: 1,
            files: &files,
        };
        let text = OutputGenerator::render_chunk(&ctx(Some("SUMMARY"), &[]), &chunk);
        assert!(text.starts_with("demo Code Export (2024-03-02 10:00)\n###\nSUMMARY\n\n###\n"));
        assert!(text.contains("demo/a.py (1L, 2 bytes, Mod: 2024-03-01 09:30)\na\n###\n"));
        assert!(text.ends_with("Files: 2, Lines: 3, Size: 6 bytes\nEND\n"));
        assert!(!text.contains("Part"));
    }

    #[test]
    fn later_parts_skip_summary_and_last_part_lists_errors() {
        let files = vec![record("b.py", "b\n")];
        let warnings = vec![FileWarning::new(
            "blob.js",
            crate::app::error::WarningKind::Binary,
        )];
        let chunk = Chunk {
            part: 2,
            total_parts: 2,
            files: &files,
        };
        let text = OutputGenerator::render_chunk(&ctx(Some("SUMMARY"), &warnings), &chunk);
        assert!(text.starts_with("demo Code Export (2024-03-02 10:00) - Part 2 of 2\n###\n"));
        assert!(!text.contains("SUMMARY"));
        assert!(text.contains("Part 2 of 2, total files: 2\n"));
        assert!(text.contains("Errors:\n- blob.js: Skipped (binary file)\n"));
    }
}
