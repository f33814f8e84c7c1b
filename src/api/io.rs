//! Purpose: Whole-file read and write primitives for text-format messages.
//! Exports: `read_to_string`, `write_string`.
//! Role: Filesystem seam; maps `std::io` failures onto crate errors with the path attached.
//! Invariants: Writes replace the whole file (create or truncate); reads never mutate.
//! Invariants: No locking; concurrent writers to one path must serialize externally.
#![allow(clippy::result_large_err)]

use std::fs;
use std::path::Path;

use crate::core::error::{Error, ErrorKind};
use crate::core::parse::ParseFailureCategory;

pub fn read_to_string(path: &Path) -> Result<String, Error> {
    let bytes = fs::read(path).map_err(|err| {
        Error::from_io(err, path).with_message("failed to read text-format file")
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read text-format file");
    String::from_utf8(bytes).map_err(|err| {
        Error::new(ErrorKind::Parse)
            .with_message("text-format file is not valid UTF-8")
            .with_path(path)
            .with_category(ParseFailureCategory::Utf8)
            .with_source(err)
    })
}

pub fn write_string(path: &Path, contents: &str) -> Result<(), Error> {
    fs::write(path, contents).map_err(|err| {
        Error::from_io(err, path)
            .with_message("failed to write text-format file")
            .with_hint("Check that the parent directory exists and is writable.")
    })?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote text-format file");
    Ok(())
}
