//! Human-readable preview of a deduplication run.

use crate::error::Result;
use crate::mapping::DedupReport;
use std::fmt::Write as _;
use std::io::Write;

/// Options for preview rendering.
#[derive(Debug, Clone)]
pub struct PreviewOptions {
    /// Maximum number of groups to show.
    pub limit: usize,

    /// Width of the horizontal rules around the header.
    pub rule_width: usize,

    /// Names longer than this are cut off with an ellipsis (0 = never).
    pub max_name_chars: usize,

    /// Marker placed before the seed when it is not the canonical name.
    pub seed_marker: String,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            limit: 30,
            rule_width: 80,
            max_name_chars: 60,
            seed_marker: "→".to_string(),
        }
    }
}

impl PreviewOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of groups to show.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Truncates long names.
    pub fn with_max_name_chars(mut self, chars: usize) -> Self {
        self.max_name_chars = chars;
        self
    }

    /// Sets the seed marker.
    pub fn with_seed_marker(mut self, marker: impl Into<String>) -> Self {
        self.seed_marker = marker.into();
        self
    }
}

/// Renders the groups of a report for human review.
///
/// Each group lists its canonical name and the names it replaces. The seed
/// is marked with an arrow when it is not itself the canonical name.
pub fn render_preview(report: &DedupReport, options: &PreviewOptions) -> String {
    let mut out = String::new();
    let rule = "=".repeat(options.rule_width);

    // Writing to a String cannot fail
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "DEDUPLICATION PREVIEW");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Names examined: {}", report.total_names);
    let _ = writeln!(out, "Duplicate groups found: {}", report.groups.len());
    let _ = writeln!(out, "Names that will be merged: {}", report.merge_count());

    if report.groups.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "No duplicates found.");
        return out;
    }

    let shown = report.groups.len().min(options.limit);
    let _ = writeln!(out);
    let _ = writeln!(out, "Showing first {shown} groups:");

    for (i, group) in report.groups.iter().take(shown).enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}. Canonical: {}",
            i + 1,
            truncate(&group.canonical, options.max_name_chars)
        );
        let _ = writeln!(out, "   Duplicates ({}):", group.len().saturating_sub(1));

        for name in group.duplicates() {
            let marker = if Some(name) == group.seed() {
                options.seed_marker.as_str()
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "   {marker:>3} {}",
                truncate(name, options.max_name_chars)
            );
        }
    }

    if report.groups.len() > shown {
        let _ = writeln!(out);
        let _ = writeln!(out, "... and {} more groups", report.groups.len() - shown);
    }

    out
}

/// Renders the preview and writes it to a writer.
pub fn render_to_writer<W: Write>(
    report: &DedupReport,
    writer: &mut W,
    options: &PreviewOptions,
) -> Result<()> {
    let content = render_preview(report, options);
    writer.write_all(content.as_bytes())?;
    Ok(())
}

/// Cuts `text` to `max_chars` characters, appending "..." when shortened.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}
