//! Purpose: Typed protobuf text-format messages with fail-fast parse, read, and write helpers.
//! Exports: `core` (codec boundary, diff, errors), `api` (typed surface), `proto` (generated schemas).
//! Role: Library backing the `pbtext` CLI and downstream tests.
//! Invariants: `*_or_die` helpers either return a fully decoded value or abort the process.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
pub mod proto;

pub use api::{parse_or_die, read_or_die, write_or_die};
