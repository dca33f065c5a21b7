//! Command implementations. Each `handle_*` function takes a request and
//! returns the text to print, so they can be driven from the CLI or tests.

pub mod check;
pub mod dump;
pub mod get;
pub mod sections;

pub use check::*;
pub use dump::*;
pub use get::*;
pub use sections::*;
