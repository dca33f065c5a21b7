mod common;

use assert2::{check, let_assert};
use common::{fixture_table, functions_chunk};
use doxy_search::escape::search_key;
use doxy_search::{SearchTable, ValidationOptions, parse_entries, parse_table, validate, write_table};
use regex::Regex;
use rstest::rstest;
use std::collections::HashSet;

// --- Structural properties of the generator's output ---

/// Every key is non-empty and unique.
#[rstest]
fn keys_are_unique_and_non_empty(fixture_table: SearchTable) {
    let mut seen = HashSet::new();
    for key in fixture_table.keys() {
        check!(!key.is_empty());
        check!(seen.insert(key), "duplicate key {}", key);
    }
    check!(seen.len() == 7);
}

/// Every entry has occurrences, every occurrence a title and a path+anchor url.
#[rstest]
fn occurrences_are_well_formed(fixture_table: SearchTable) {
    let url = Regex::new(r"^\.\./[0-9a-f]{2}/[0-9a-f]{3}/[A-Za-z0-9_]+\.html#a[0-9a-f]{32}$").unwrap();
    for entry in &fixture_table {
        check!(!entry.occurrences.is_empty(), "{} has no occurrences", entry.key);
        for occ in &entry.occurrences {
            check!(!occ.title.is_empty());
            check!(url.is_match(&occ.url), "bad url {}", occ.url);
            check!(occ.parent_target);
        }
    }
}

/// Entry order is the generator's, not alphabetical.
#[rstest]
fn order_is_insertion_order(fixture_table: SearchTable) {
    let keys: Vec<&str> = fixture_table.keys().collect();
    check!(
        keys == vec![
            "basic_5fstring_3c_20chart_2c_20traits_2c_20allocator_20_3e",
            "operator_20bool",
            "operator_2a",
            "operator_2d_3e",
            "operator_3d",
            "operator_5b_5d",
            "optional",
        ]
    );
}

#[rstest]
fn fixture_passes_default_validation(functions_chunk: String) {
    let_assert!(Ok(entries) = parse_entries(&functions_chunk));
    let report = validate(&entries, &ValidationOptions::default());
    check!(report.violations.is_empty(), "{:?}", report.violations);
    check!(report.entries == 7);
    check!(report.occurrences == 1 + 1 + 4 + 2 + 11 + 2 + 12);
}

#[rstest]
fn strict_validation_flags_repeated_constructor_overloads(functions_chunk: String) {
    let_assert!(Ok(entries) = parse_entries(&functions_chunk));
    let options = ValidationOptions {
        require_anchor: true,
        allow_duplicate_occurrences: false,
    };
    let report = validate(&entries, &options);
    check!(report.is_ok());
    check!(report.warning_count() == 3);
}

// --- Lookups ---

/// `optional` resolves to the constructors on the optional class page.
#[rstest]
fn optional_lookup(fixture_table: SearchTable) {
    let_assert!(Some(entry) = fixture_table.get("optional"));
    check!(entry.label == "optional");
    check!(entry.occurrences.len() == 12);
    for occ in &entry.occurrences {
        check!(occ.url.starts_with("../d8/d86/classbpstd_1_1optional.html#"));
        check!(occ.title.starts_with("bpstd::optional::optional("));
    }
}

/// `operator_3d` lists each assignment overload once, told apart by anchor.
#[rstest]
fn operator_assign_overloads(fixture_table: SearchTable) {
    let_assert!(Some(entry) = fixture_table.get("operator_3d"));
    check!(entry.label_text() == "operator=");
    check!(entry.occurrences.len() == 11);

    let anchors: HashSet<&str> = entry.occurrences.iter().filter_map(|o| o.anchor()).collect();
    check!(anchors.len() == entry.occurrences.len());

    let titles: Vec<String> = entry.occurrences.iter().map(|o| o.title_text().into_owned()).collect();
    check!(titles.iter().all(|t| t.starts_with("bpstd::") && t.contains("::operator=(")));
    check!(titles.iter().filter(|t| t.starts_with("bpstd::any::")).count() == 3);
    check!(titles.iter().filter(|t| t.starts_with("bpstd::optional::")).count() == 6);
    check!(titles.contains(&"bpstd::any::operator=(const any &other)".to_string()));
}

#[rstest]
#[case("operator=", 11)]
#[case("operator*", 4)]
#[case("operator->", 2)]
#[case("operator[]", 2)]
#[case("operator bool", 1)]
#[case("basic_string< CharT, Traits, Allocator >", 1)]
fn find_by_symbol(fixture_table: SearchTable, #[case] symbol: &str, #[case] count: usize) {
    let_assert!(Some(entry) = fixture_table.find_symbol(symbol));
    check!(entry.key == search_key(symbol));
    check!(entry.occurrences.len() == count);
}

#[rstest]
fn unknown_symbol_misses(fixture_table: SearchTable) {
    check!(fixture_table.find_symbol("operator==").is_none());
    check!(fixture_table.get("Optional").is_none());
}

// --- Round trips ---

/// Writing a parsed generator file reproduces it byte for byte.
#[rstest]
fn writer_reproduces_generator_output(functions_chunk: String, fixture_table: SearchTable) {
    check!(write_table(&fixture_table) == functions_chunk);
}

#[rstest]
fn json_round_trip_preserves_order(fixture_table: SearchTable) {
    let json = serde_json::to_string(&fixture_table).unwrap();
    let_assert!(Ok(back) = serde_json::from_str::<SearchTable>(&json));
    check!(back == fixture_table);
    check!(back.keys().eq(fixture_table.keys()));
}

#[rstest]
fn postcard_round_trip_preserves_order(fixture_table: SearchTable) {
    let bytes = postcard::to_stdvec(&fixture_table).unwrap();
    let_assert!(Ok(back) = postcard::from_bytes::<SearchTable>(&bytes));
    check!(back == fixture_table);
    check!(back.position("optional") == Some(6));
}

#[rstest]
fn reparsing_written_table_is_identity(fixture_table: SearchTable) {
    let_assert!(Ok(back) = parse_table(&write_table(&fixture_table)));
    check!(back == fixture_table);
}
