//! Typed access to the search index tables Doxygen writes into
//! `html/search/`: parsing, validation, lookup, and a parsed-table cache.

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod escape;
pub mod format;
pub mod sections;
pub mod suggest;
pub mod table;
pub mod tools;
pub mod tracing;
pub mod validate;

pub use catalog::SearchCatalog;
pub use codec::{DecodeError, parse_entries, parse_table, write_table};
pub use config::Config;
pub use error::LoadError;
pub use sections::{SectionFile, SectionIndex};
pub use table::{IndexEntry, Occurrence, SearchTable, TableError};
pub use validate::{ValidationOptions, ValidationReport, Violation, validate};
