//! Reading and writing search data chunk files.
//!
//! A chunk file binds a single variable, `searchData`, to an array of entries:
//!
//! ```text
//! var searchData=
//! [
//!   ['operator_3d',['operator=',['../d8/dbe/classbpstd_1_1any.html#a4096…',1,'bpstd::any::operator=(…)'],…]],
//!   …
//! ];
//! ```
//!
//! Each entry is `[key, [label, occurrence, occurrence, …]]` and each
//! occurrence is `[url, parent_target, title]`.

pub(crate) mod lexer;
mod writer;

pub use lexer::{Binding, ParseError, SyntaxErrorKind, Value, parse_bindings};
pub use writer::{write_entries, write_table};

use crate::table::{IndexEntry, Occurrence, SearchTable, TableError};

/// Name of the variable a chunk file assigns.
pub const SEARCH_DATA_VAR: &str = "searchData";

/// Error returned when a chunk file cannot be turned into a table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Syntax(#[from] ParseError),
    #[error("no `{0}` variable found")]
    MissingVariable(&'static str),
    /// A value has the wrong type or arity. `path` indexes from the root array,
    /// e.g. `/3/1/2` is the second occurrence of the fourth entry.
    #[error("at {path}: expected {expected}, found {found}")]
    Shape {
        path: String,
        expected: &'static str,
        found: String,
    },
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Parses a chunk file into its entries without enforcing table invariants.
///
/// Use this when every problem should be reported, as [`crate::validate`] does;
/// use [`parse_table`] to get a lookup-ready table.
pub fn parse_entries(source: &str) -> Result<Vec<IndexEntry>, DecodeError> {
    let bindings = parse_bindings(source)?;
    let Some(binding) = bindings.into_iter().find(|b| b.name == SEARCH_DATA_VAR) else {
        return Err(DecodeError::MissingVariable(SEARCH_DATA_VAR));
    };

    let rows = expect_array(binding.value, String::new(), "array of entries")?;
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| decode_entry(row, format!("/{}", i)))
        .collect()
}

/// Parses a chunk file into a [`SearchTable`].
pub fn parse_table(source: &str) -> Result<SearchTable, DecodeError> {
    Ok(SearchTable::new(parse_entries(source)?)?)
}

fn decode_entry(value: Value, path: String) -> Result<IndexEntry, DecodeError> {
    let [key, body] = expect_tuple::<2>(value, &path, "[key, [label, ...occurrences]]")?;
    let key = expect_str(key, format!("{}/0", path))?;

    let body_path = format!("{}/1", path);
    let mut body = expect_array(body, body_path.clone(), "[label, ...occurrences]")?.into_iter();
    let Some(label) = body.next() else {
        return Err(DecodeError::Shape {
            path: body_path,
            expected: "[label, ...occurrences]",
            found: "empty array".to_string(),
        });
    };
    let label = expect_str(label, format!("{}/0", body_path))?;

    let occurrences = body
        .enumerate()
        .map(|(i, occ)| decode_occurrence(occ, format!("{}/{}", body_path, i + 1)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(IndexEntry {
        key,
        label,
        occurrences,
    })
}

fn decode_occurrence(value: Value, path: String) -> Result<Occurrence, DecodeError> {
    let [url, flag, title] = expect_tuple::<3>(value, &path, "[url, flag, title]")?;
    let url = expect_str(url, format!("{}/0", path))?;
    let parent_target = match flag {
        Value::Int(n) => n != 0,
        other => {
            return Err(DecodeError::Shape {
                path: format!("{}/1", path),
                expected: "integer",
                found: other.type_name().to_string(),
            });
        }
    };
    let title = expect_str(title, format!("{}/2", path))?;
    Ok(Occurrence {
        url,
        parent_target,
        title,
    })
}

fn expect_array(value: Value, path: String, expected: &'static str) -> Result<Vec<Value>, DecodeError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(DecodeError::Shape {
            path: display_path(path),
            expected,
            found: other.type_name().to_string(),
        }),
    }
}

fn expect_tuple<const N: usize>(
    value: Value,
    path: &str,
    expected: &'static str,
) -> Result<[Value; N], DecodeError> {
    let items = expect_array(value, path.to_string(), expected)?;
    let len = items.len();
    items.try_into().map_err(|_| DecodeError::Shape {
        path: display_path(path.to_string()),
        expected,
        found: format!("array of length {}", len),
    })
}

fn expect_str(value: Value, path: String) -> Result<String, DecodeError> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(DecodeError::Shape {
            path,
            expected: "string",
            found: other.type_name().to_string(),
        }),
    }
}

fn display_path(path: String) -> String {
    if path.is_empty() { "/".to_string() } else { path }
}
