//! Emits chunk files in the generator's layout.

use crate::table::{IndexEntry, Occurrence, SearchTable};
use std::fmt::Write as _;

use super::SEARCH_DATA_VAR;

/// Renders a table exactly as the generator lays it out: one entry per line,
/// two-space indent, no spaces inside the literals.
pub fn write_table(table: &SearchTable) -> String {
    write_entries(table.entries())
}

/// Renders entries in order. Entries need not satisfy table invariants.
pub fn write_entries(entries: &[IndexEntry]) -> String {
    let estimate: usize = entries
        .iter()
        .map(|e| 32 + e.key.len() + e.label.len() + e.occurrences.len() * 96)
        .sum();
    let mut out = String::with_capacity(estimate + 32);
    out.push_str("var ");
    out.push_str(SEARCH_DATA_VAR);
    out.push_str("=\n[\n");
    for (i, entry) in entries.iter().enumerate() {
        out.push_str("  ['");
        push_js_str(&mut out, &entry.key);
        out.push_str("',['");
        push_js_str(&mut out, &entry.label);
        out.push('\'');
        for occurrence in &entry.occurrences {
            out.push(',');
            push_occurrence(&mut out, occurrence);
        }
        out.push_str("]]");
        if i + 1 < entries.len() {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str("];\n");
    out
}

fn push_occurrence(out: &mut String, occurrence: &Occurrence) {
    out.push_str("['");
    push_js_str(out, &occurrence.url);
    out.push_str("',");
    out.push(if occurrence.parent_target { '1' } else { '0' });
    out.push_str(",'");
    push_js_str(out, &occurrence.title);
    out.push_str("']");
}

/// Appends `s` as the body of a single-quoted JavaScript string literal.
fn push_js_str(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                // Infallible: writing to a String
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_entries;
    use assert2::{check, let_assert};

    fn entry(key: &str, label: &str, titles: &[&str]) -> IndexEntry {
        IndexEntry {
            key: key.to_string(),
            label: label.to_string(),
            occurrences: titles
                .iter()
                .enumerate()
                .map(|(i, title)| Occurrence {
                    url: format!("../a/b/page.html#a{}", i),
                    parent_target: true,
                    title: (*title).to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_quotes_and_backslashes_survive() {
        let entries = vec![entry("it_27s", "it's", &["C:\\path", "line\nbreak"])];
        let text = write_entries(&entries);
        check!(text.contains(r"'it\'s'"));
        check!(text.contains(r"'C:\\path'"));
        let_assert!(Ok(parsed) = parse_entries(&text));
        check!(parsed == entries);
    }

    #[test]
    fn test_last_entry_has_no_trailing_comma() {
        let text = write_entries(&[entry("a", "a", &["x"]), entry("b", "b", &["y", "z"])]);
        let lines: Vec<&str> = text.lines().collect();
        check!(lines[0] == "var searchData=");
        check!(lines[1] == "[");
        check!(lines[2].ends_with("]],"));
        check!(lines[3].ends_with("]]"));
        check!(lines[4] == "];");
    }

    #[test]
    fn test_empty_entries() {
        check!(write_entries(&[]) == "var searchData=\n[\n];\n");
        let_assert!(Ok(parsed) = parse_entries(&write_entries(&[])));
        check!(parsed.is_empty());
    }
}
