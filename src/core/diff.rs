//! Purpose: Structural comparison of two messages with a path-qualified diff.
//! Exports: `diff_messages`, `MessageDiff`, `DiffEntry`, `DiffKind`.
//! Role: Backs equality assertions in tests and the `diff` CLI command.
//! Invariants: An empty diff means the messages are structurally equal (and vice versa).
//! Invariants: Repeated fields compare element-wise by index; order is significant.
//! Invariants: Entry kinds read the same in text and JSON: `added`, `removed`, `modified`.

use std::fmt;

use prost_reflect::{DynamicMessage, FieldDescriptor, ReflectMessage, Value};
use serde::Serialize;

use crate::core::print::{PrintOptions, print_message};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    /// Present in actual, absent in expected.
    Added,
    /// Present in expected, absent in actual.
    Removed,
    Modified,
}

impl DiffKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DiffEntry {
    pub path: String,
    pub kind: DiffKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct MessageDiff {
    pub entries: Vec<DiffEntry>,
}

impl MessageDiff {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for MessageDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            let expected = entry.expected.as_deref().unwrap_or_default();
            let actual = entry.actual.as_deref().unwrap_or_default();
            match entry.kind {
                DiffKind::Added => writeln!(f, "{}: {}: {actual}", entry.kind, entry.path)?,
                DiffKind::Removed => writeln!(f, "{}: {}: {expected}", entry.kind, entry.path)?,
                DiffKind::Modified => {
                    writeln!(f, "{}: {}: {expected} -> {actual}", entry.kind, entry.path)?
                }
            }
        }
        Ok(())
    }
}

/// Compares `actual` against `expected`. Descriptor mismatches yield a single root entry.
pub fn diff_messages(expected: &DynamicMessage, actual: &DynamicMessage) -> MessageDiff {
    let mut diff = MessageDiff::default();
    if expected.descriptor() != actual.descriptor() {
        diff.entries.push(DiffEntry {
            path: "<root>".to_string(),
            kind: DiffKind::Modified,
            expected: Some(expected.descriptor().full_name().to_string()),
            actual: Some(actual.descriptor().full_name().to_string()),
        });
        return diff;
    }
    compare_messages(expected, actual, "", &mut diff);
    diff
}

fn compare_messages(
    expected: &DynamicMessage,
    actual: &DynamicMessage,
    prefix: &str,
    diff: &mut MessageDiff,
) {
    for field in expected.descriptor().fields() {
        let path = join_path(prefix, field.name());
        if field.is_list() {
            let left = expected.get_field(&field);
            let right = actual.get_field(&field);
            compare_repeated(
                &field,
                left.as_list().unwrap_or_default(),
                right.as_list().unwrap_or_default(),
                &path,
                diff,
            );
        } else {
            // Implicit-presence scalars report unset when equal to their default.
            let left = expected
                .has_field(&field)
                .then(|| expected.get_field(&field));
            let right = actual.has_field(&field).then(|| actual.get_field(&field));
            compare_singular(&field, left.as_deref(), right.as_deref(), &path, diff);
        }
    }
}

fn compare_repeated(
    field: &FieldDescriptor,
    expected: &[Value],
    actual: &[Value],
    path: &str,
    diff: &mut MessageDiff,
) {
    let longest = expected.len().max(actual.len());
    for index in 0..longest {
        let element_path = format!("{path}[{index}]");
        compare_singular(field, expected.get(index), actual.get(index), &element_path, diff);
    }
}

fn compare_singular(
    field: &FieldDescriptor,
    expected: Option<&Value>,
    actual: Option<&Value>,
    path: &str,
    diff: &mut MessageDiff,
) {
    match (expected, actual) {
        (None, None) => {}
        (Some(Value::Message(left)), Some(Value::Message(right))) => {
            compare_messages(left, right, path, diff);
        }
        (Some(left), Some(right)) => {
            if !values_equal(left, right) {
                diff.entries.push(DiffEntry {
                    path: path.to_string(),
                    kind: DiffKind::Modified,
                    expected: Some(render(field, left)),
                    actual: Some(render(field, right)),
                });
            }
        }
        (Some(left), None) => diff.entries.push(DiffEntry {
            path: path.to_string(),
            kind: DiffKind::Removed,
            expected: Some(render(field, left)),
            actual: None,
        }),
        (None, Some(right)) => diff.entries.push(DiffEntry {
            path: path.to_string(),
            kind: DiffKind::Added,
            expected: None,
            actual: Some(render(field, right)),
        }),
    }
}

/// Like `==`, except NaN equals NaN so round-tripped floats compare equal.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::F32(a), Value::F32(b)) => a == b || (a.is_nan() && b.is_nan()),
        (Value::F64(a), Value::F64(b)) => a == b || (a.is_nan() && b.is_nan()),
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        _ => left == right,
    }
}

fn render(field: &FieldDescriptor, value: &Value) -> String {
    match value {
        Value::Message(message) => {
            let body = print_message(message, &PrintOptions::new().single_line(true));
            if body.is_empty() {
                "{ }".to_string()
            } else {
                format!("{{ {body} }}")
            }
        }
        Value::EnumNumber(number) => field
            .kind()
            .as_enum()
            .and_then(|descriptor| descriptor.get_value(*number))
            .map_or_else(|| number.to_string(), |value| value.name().to_string()),
        Value::String(text) => format!("{text:?}"),
        Value::Bytes(bytes) => format!("\"{}\"", bytes.escape_ascii()),
        Value::F32(number) => render_float(f64::from(*number)),
        Value::F64(number) => render_float(*number),
        Value::Bool(flag) => flag.to_string(),
        Value::I32(number) => number.to_string(),
        Value::I64(number) => number.to_string(),
        Value::U32(number) => number.to_string(),
        Value::U64(number) => number.to_string(),
        Value::List(items) => {
            let rendered = items
                .iter()
                .map(|item| render(field, item))
                .collect::<Vec<_>>();
            format!("[{}]", rendered.join(", "))
        }
        other => format!("{other:?}"),
    }
}

fn render_float(number: f64) -> String {
    if number.is_nan() {
        "nan".to_string()
    } else {
        number.to_string()
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}
