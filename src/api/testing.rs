//! Purpose: Structural equality assertions for typed messages in tests.
//! Exports: `compare`, `equals_text`, `assert_equals`, `assert_equals_text`.
//! Role: Test helper; the expected side may be a value or a text-format literal.
//! Invariants: Pure comparison; never performs I/O.
//! Invariants: The pass/fail outcome is exactly "diff is empty"; the diff only aids debugging.
#![allow(clippy::result_large_err)]

use crate::api::message::TextMessage;
use crate::api::text::parse_text;
use crate::core::diff::{MessageDiff, diff_messages};
use crate::core::error::Error;

pub fn compare<T: TextMessage>(expected: &T, actual: &T) -> MessageDiff {
    diff_messages(&expected.to_dynamic(), &actual.to_dynamic())
}

/// Parses `expected` as `T` and diffs it against `actual`.
pub fn equals_text<T: TextMessage>(actual: &T, expected: &str) -> Result<MessageDiff, Error> {
    let expected: T = parse_text(expected)?;
    Ok(compare(&expected, actual))
}

#[track_caller]
pub fn assert_equals<T: TextMessage>(actual: &T, expected: &T) {
    let diff = compare(expected, actual);
    if !diff.is_empty() {
        panic!(
            "messages of type {} differ:\n{diff}",
            T::type_name()
        );
    }
}

#[track_caller]
pub fn assert_equals_text<T: TextMessage>(actual: &T, expected: &str) {
    match equals_text(actual, expected) {
        Ok(diff) if diff.is_empty() => {}
        Ok(diff) => panic!(
            "message of type {} does not equal expected text:\n{diff}",
            T::type_name()
        ),
        Err(err) => panic!("expected text does not parse: {err}"),
    }
}
