//! Purpose: Fail-fast parse/read/write helpers for typed text-format messages.
//! Exports: `parse_or_die`, `read_or_die`, `write_or_die`, `die`, `fatal_report`.
//! Role: Unwraps the recoverable API and aborts the process on any error.
//! Invariants: These functions either return a value or never return; no partial results.
//! Invariants: A diagnostic naming the operation (and path/field when known) reaches stderr before abort.

use std::error::Error as StdError;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use crate::api::message::TextMessage;
use crate::api::text::{parse_text, read_text, write_text};
use crate::core::error::Error;
use crate::core::parse::hint_for_error;

pub fn parse_or_die<T: TextMessage>(input: &str) -> T {
    match parse_text(input) {
        Ok(message) => message,
        Err(err) => die(&format!("parse_or_die<{}>", T::type_name()), &err),
    }
}

pub fn read_or_die<T: TextMessage>(path: impl AsRef<Path>) -> T {
    match read_text(path.as_ref()) {
        Ok(message) => message,
        Err(err) => die(&format!("read_or_die<{}>", T::type_name()), &err),
    }
}

pub fn write_or_die<T: TextMessage>(path: impl AsRef<Path>, message: &T) {
    if let Err(err) = write_text(path.as_ref(), message) {
        die(&format!("write_or_die<{}>", T::type_name()), &err);
    }
}

/// Logs `err`, writes the fatal report to stderr, and aborts.
pub fn die(operation: &str, err: &Error) -> ! {
    tracing::error!(operation, error = %err, "aborting on text-format failure");
    let report = fatal_report(operation, err);
    let mut stderr = io::stderr().lock();
    let _ = stderr.write_all(report.as_bytes());
    let _ = stderr.flush();
    process::abort()
}

pub fn fatal_report(operation: &str, err: &Error) -> String {
    let mut lines = vec![format!("fatal: {operation}: {err}")];
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    if err.category().is_some() {
        lines.push(format!("note: {}", hint_for_error(err, operation)));
    }
    let mut cause = StdError::source(err);
    while let Some(source) = cause {
        lines.push(format!("caused by: {source}"));
        cause = source.source();
    }
    let mut report = lines.join("\n");
    report.push('\n');
    report
}
