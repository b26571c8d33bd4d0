//! The command language: lexing, parsing and error reporting.
//!
//! ```
//! use compile::{parse_command, Command};
//!
//! let command = parse_command("select from users where age = 28").unwrap();
//! assert!(matches!(command, Command::Select { predicate: Some(_), .. }));
//! ```

pub mod command;
pub mod diagnostics;
pub mod lexer;
pub mod parser;

pub use command::{ColumnDef, Command};
pub use diagnostics::{report_error, render_plain, ParseError, SyntaxError};
pub use parser::{parse_command, parse_set, parse_values, parse_where};
