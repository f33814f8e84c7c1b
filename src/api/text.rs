//! Purpose: Recoverable parse/read/write entrypoints for typed text-format messages.
//! Exports: `parse_text`, `read_text`, `write_text`, `to_text`, `to_text_with`.
//! Role: `Result`-returning interface; the fail-fast wrappers in `or_die` sit on top of it.
//! Invariants: `read_text(p)` is equivalent to `parse_text(contents of p)` plus path context.
//! Invariants: `write_text` output always satisfies `read_text(p) == value`.
#![allow(clippy::result_large_err)]

use std::path::Path;

use crate::api::io::{read_to_string, write_string};
use crate::api::message::TextMessage;
use crate::core::error::Error;
use crate::core::parse::parse_message;
use crate::core::print::{PrintOptions, print_message};

pub fn parse_text<T: TextMessage>(input: &str) -> Result<T, Error> {
    let message = parse_message(input, &T::message_descriptor())?;
    T::from_dynamic(&message)
}

pub fn read_text<T: TextMessage>(path: impl AsRef<Path>) -> Result<T, Error> {
    let path = path.as_ref();
    let contents = read_to_string(path)?;
    parse_text(&contents).map_err(|err| err.with_path(path))
}

pub fn write_text<T: TextMessage>(path: impl AsRef<Path>, message: &T) -> Result<(), Error> {
    write_string(path.as_ref(), &to_text(message))
}

pub fn to_text<T: TextMessage>(message: &T) -> String {
    to_text_with(message, &PrintOptions::default())
}

pub fn to_text_with<T: TextMessage>(message: &T, options: &PrintOptions) -> String {
    print_message(&message.to_dynamic(), options)
}
