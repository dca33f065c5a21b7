//! Plain-text rendering for command output.

use crate::sections::SectionIndex;
use crate::suggest::KeySuggestion;
use crate::table::IndexEntry;
use crate::validate::ValidationReport;
use std::fmt::Write;

/// Renders an entry with one indented block per occurrence.
///
/// ```text
/// operator-> (2 results)
///   bpstd::optional::operator->() noexcept
///     ../d8/d86/classbpstd_1_1optional.html#a334797ec02170eb692ab7162e6f8b64f
/// ```
pub fn render_entry(out: &mut String, entry: &IndexEntry) {
    let count = entry.occurrences.len();
    let _ = writeln!(
        out,
        "{} ({} result{})",
        entry.label_text(),
        count,
        if count == 1 { "" } else { "s" }
    );
    for occ in &entry.occurrences {
        let _ = writeln!(out, "  {}", occ.title_text());
        let _ = writeln!(out, "    {}", occ.url);
    }
}

pub fn render_suggestions(out: &mut String, query: &str, suggestions: &[KeySuggestion<'_>]) {
    let _ = writeln!(out, "No entry for '{}'.", query);
    if suggestions.is_empty() {
        return;
    }
    out.push_str("Did you mean:\n");
    for s in suggestions {
        let _ = writeln!(out, "  {} ({:.2})", s.entry.label_text(), s.score);
    }
}

/// One header line, then each violation prefixed by its severity.
pub fn render_report(out: &mut String, name: &str, report: &ValidationReport) {
    let _ = writeln!(
        out,
        "{}: {} entries, {} occurrences, {} errors, {} warnings",
        name,
        report.entries,
        report.occurrences,
        report.error_count(),
        report.warning_count()
    );
    for violation in &report.violations {
        let _ = writeln!(out, "  {}: {}", violation.severity(), violation);
    }
}

pub fn render_sections(out: &mut String, index: &SectionIndex) {
    for section in &index.sections {
        let _ = writeln!(
            out,
            "{:>2}  {:<16} {:<20} {} chunks ({})",
            section.id,
            section.name,
            section.label,
            section.letters.chars().count(),
            section.letters
        );
    }
}
