//! Purpose: Define the public Rust API boundary for typed text-format messages.
//! Exports: `TextMessage`, recoverable and fail-fast parse/read/write, test assertions.
//! Role: Public surface used by the CLI, tests, and downstream crates.
//! Invariants: Fail-fast (`*_or_die`) and recoverable (`Result`) entrypoints stay separate.
//! Invariants: All decoding routes through `core::parse`; all encoding through `core::print`.

mod io;
mod message;
mod or_die;
mod text;
pub mod testing;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::diff::{DiffEntry, DiffKind, MessageDiff, diff_messages};
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::parse::{ParseFailureCategory, parse_message};
pub use crate::core::print::{PrintOptions, print_message};
pub use io::{read_to_string, write_string};
pub use message::TextMessage;
pub use or_die::{die, fatal_report, parse_or_die, read_or_die, write_or_die};
pub use prost_reflect::{DynamicMessage, MessageDescriptor};
pub use text::{parse_text, read_text, to_text, to_text_with, write_text};
