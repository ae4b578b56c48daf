use crate::app::formatter::{format_file_size, format_timestamp, format_with_commas};
use crate::app::models::FileRecord;
use std::collections::BTreeMap;
use std::path::Path;

/// Project overview placed at the top of the output.
pub fn generate_summary(
    folder: &str,
    root: &Path,
    records: &[FileRecord],
    binary_skipped: usize,
    top_n: usize,
) -> String {
    let total_lines: usize = records.iter().map(|r| r.lines).sum();
    let total_size: u64 = records.iter().map(|r| r.size).sum();
    let total_tokens: usize = records.iter().map(|r| r.tokens).sum();

    let mut lines = vec![format!("## {} PROJECT SUMMARY", folder), String::new()];
    lines.push(format!("Root Directory: {}", root.display()));
    lines.push(format!("Total Files: {}", records.len()));
    lines.push(format!("Total Lines: {}", format_with_commas(total_lines as u64)));
    lines.push(format!("Total Size: {}", format_file_size(total_size)));
    lines.push(format!(
        "Estimated Code Tokens: {}",
        format_with_commas(total_tokens as u64)
    ));
    if binary_skipped > 0 {
        lines.push(format!("Binary Files Skipped: {}", binary_skipped));
    }

    lines.push(String::new());
    lines.push("### Files by Type".to_string());
    lines.extend(extension_lines(records));

    lines.push(String::new());
    lines.push("### Directory Structure".to_string());
    lines.extend(tree_lines(records));

    lines.push(String::new());
    lines.push(format!("### Largest Files (top {})", top_n));
    let mut by_lines: Vec<&FileRecord> = records.iter().collect();
    by_lines.sort_by(|a, b| {
        b.lines
            .cmp(&a.lines)
            .then_with(|| a.relative_path.cmp(&b.relative_path))
    });
    for (i, record) in by_lines.iter().take(top_n).enumerate() {
        lines.push(format!(
            "{}. {}: {} lines, {}",
            i + 1,
            record.relative_path,
            record.lines,
            format_file_size(record.size)
        ));
    }

    lines.push(String::new());
    lines.push(format!("### Recently Modified (top {})", top_n));
    let mut by_time: Vec<&FileRecord> = records.iter().collect();
    // `None` sorts below any timestamp, so files without one come last
    by_time.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| a.relative_path.cmp(&b.relative_path))
    });
    for (i, record) in by_time.iter().take(top_n).enumerate() {
        lines.push(format!(
            "{}. {} (Mod: {})",
            i + 1,
            record.relative_path,
            format_timestamp(record.modified.as_ref())
        ));
    }

    lines.join("\n")
}

#[derive(Default)]
struct ExtensionStats {
    files: usize,
    lines: usize,
    size: u64,
}

fn extension_lines(records: &[FileRecord]) -> Vec<String> {
    let mut stats: BTreeMap<&str, ExtensionStats> = BTreeMap::new();
    for record in records {
        let entry = stats.entry(record.extension.as_str()).or_default();
        entry.files += 1;
        entry.lines += record.lines;
        entry.size += record.size;
    }

    let mut sorted: Vec<(&str, ExtensionStats)> = stats.into_iter().collect();
    // BTreeMap order is the tie-break; sort_by is stable
    sorted.sort_by(|a, b| b.1.files.cmp(&a.1.files));
    sorted
        .into_iter()
        .map(|(ext, s)| {
            format!(
                "- {}: {} files, {} lines, {}",
                ext,
                s.files,
                s.lines,
                format_file_size(s.size)
            )
        })
        .collect()
}

enum TreeNode<'a> {
    Dir(BTreeMap<&'a str, TreeNode<'a>>),
    File(&'a FileRecord),
}

fn tree_lines(records: &[FileRecord]) -> Vec<String> {
    let mut root: BTreeMap<&str, TreeNode> = BTreeMap::new();
    for record in records {
        let parts: Vec<&str> = record.relative_path.split('/').collect();
        insert_path(&mut root, &parts, record);
    }
    let mut lines = Vec::new();
    render_tree(&root, "", &mut lines);
    lines
}

fn insert_path<'a>(
    level: &mut BTreeMap<&'a str, TreeNode<'a>>,
    parts: &[&'a str],
    record: &'a FileRecord,
) {
    match parts {
        [] => {}
        [name] => {
            level.insert(*name, TreeNode::File(record));
        }
        [dir, rest @ ..] => {
            let node = level
                .entry(*dir)
                .or_insert_with(|| TreeNode::Dir(BTreeMap::new()));
            if let TreeNode::Dir(children) = node {
                insert_path(children, rest, record);
            }
        }
    }
}

fn render_tree(level: &BTreeMap<&str, TreeNode>, prefix: &str, lines: &mut Vec<String>) {
    let count = level.len();
    for (i, (name, node)) in level.iter().enumerate() {
        let is_last = i + 1 == count;
        let branch = if is_last { "└── " } else { "├── " };
        match node {
            TreeNode::Dir(children) => {
                lines.push(format!("{}{}{}/", prefix, branch, name));
                let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
                render_tree(children, &child_prefix, lines);
            }
            TreeNode::File(record) => lines.push(format!(
                "{}{}{}: {} lines, {}, Mod: {}",
                prefix,
                branch,
                name,
                record.lines,
                format_file_size(record.size),
                format_timestamp(record.modified.as_ref())
            )),
        }
    }
}
