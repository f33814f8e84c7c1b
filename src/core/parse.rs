//! Purpose: Decode protobuf text format into a schema-checked `DynamicMessage`.
//! Exports: `parse_message`, `ParseFailureCategory`, `categorize_error`, `hint_for_error`.
//! Role: The only text decode boundary; typed and fail-fast APIs call through here.
//! Invariants: Every error carries a category; a 1-based position is attached whenever the parser reports a span.
//! Invariants: Unknown field names are rejected, with the owning message's fields as a hint.
//! Notes: Grammar and value checks come from `prost_reflect::text_format`; this module adds positions, categories, and hints.

use std::fmt;

use miette::Diagnostic;
use prost_reflect::text_format::ParseError;
use prost_reflect::{DynamicMessage, MessageDescriptor};

use crate::core::error::{Error, ErrorKind};
use crate::core::escapes::fold_surrogate_escapes;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseFailureCategory {
    Syntax,
    UnknownField,
    TypeMismatch,
    NumericRange,
    DuplicateField,
    Utf8,
    Unknown,
}

impl ParseFailureCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::UnknownField => "unknown-field",
            Self::TypeMismatch => "type-mismatch",
            Self::NumericRange => "numeric-range",
            Self::DuplicateField => "duplicate-field",
            Self::Utf8 => "utf8",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ParseFailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn categorize_error(err: &Error) -> ParseFailureCategory {
    err.category().unwrap_or(ParseFailureCategory::Unknown)
}

pub fn hint_for_error(err: &Error, context: &str) -> String {
    format!(
        "parse category: {}; context: {context}",
        categorize_error(err)
    )
}

pub fn parse_message(input: &str, descriptor: &MessageDescriptor) -> Result<DynamicMessage, Error> {
    let source = fold_surrogate_escapes(input)?;
    DynamicMessage::parse_text_format(descriptor.clone(), &source)
        .map_err(|err| parse_error(&source, descriptor, &err))
}

fn parse_error(source: &str, descriptor: &MessageDescriptor, err: &ParseError) -> Error {
    let message = err.to_string();
    let category = categorize_message(&message);
    let mut error = Error::new(ErrorKind::Parse)
        .with_message(message.clone())
        .with_category(category);
    if let Some((line, column)) = error_position(source, err) {
        error = error.with_position(line, column);
    }
    if category == ParseFailureCategory::UnknownField {
        let owner = owning_message(&message)
            .and_then(|name| descriptor.parent_pool().get_message_by_name(name))
            .unwrap_or_else(|| descriptor.clone());
        error = error.with_hint(known_fields_hint(&owner));
    }
    error
}

/// Maps the parser's message text onto a stable category.
fn categorize_message(message: &str) -> ParseFailureCategory {
    let lower = message.to_ascii_lowercase();
    if lower.contains("not found") || lower.contains("unknown field") {
        ParseFailureCategory::UnknownField
    } else if lower.contains("already set") || lower.contains("multiple times") {
        ParseFailureCategory::DuplicateField
    } else if lower.contains("utf-8") || lower.contains("utf8") {
        ParseFailureCategory::Utf8
    } else if lower.contains("out of range") || lower.contains("value between") {
        ParseFailureCategory::NumericRange
    } else if [
        "expected a string",
        "expected an integer",
        "expected a float",
        "'true' or 'false'",
        "is not a valid value",
        "expected a value of type",
    ]
    .iter()
    .any(|needle| lower.contains(needle))
    {
        ParseFailureCategory::TypeMismatch
    } else {
        ParseFailureCategory::Syntax
    }
}

/// 1-based line and column (in characters) of the first labeled span.
fn error_position(source: &str, err: &ParseError) -> Option<(usize, usize)> {
    let offset = err.labels()?.next()?.offset();
    let before = source.get(..offset)?;
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map_or(0, |tail| tail.chars().count())
        + 1;
    Some((line, column))
}

/// Extracts `pkg.Name` from "... for message 'pkg.Name'".
fn owning_message(message: &str) -> Option<&str> {
    let (_, rest) = message.rsplit_once("message '")?;
    rest.split('\'').next().filter(|name| !name.is_empty())
}

fn known_fields_hint(descriptor: &MessageDescriptor) -> String {
    let names = descriptor
        .fields()
        .map(|field| field.name().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("Known fields of {}: {names}", descriptor.full_name())
}

#[cfg(test)]
mod tests {
    use super::{
        ParseFailureCategory, categorize_message, hint_for_error, owning_message, parse_message,
    };
    use crate::core::error::{Error, ErrorKind};
    use crate::proto::instructions::InstructionProto;
    use prost_reflect::{DynamicMessage, MessageDescriptor, ReflectMessage};

    fn instruction() -> MessageDescriptor {
        InstructionProto::default().descriptor()
    }

    fn parse(input: &str) -> DynamicMessage {
        parse_message(input, &instruction()).expect("parse")
    }

    fn parse_err(input: &str) -> Error {
        parse_message(input, &instruction()).expect_err("parse error")
    }

    #[test]
    fn parses_scalar_nested_and_repeated_fields() {
        let message = parse(
            "llvm_mnemonic: 'ADD32mr' protection_mode: -3 \
             syntax { mnemonic: 'add' operands { encoding: MODRM_RM_ENCODING } } \
             implicit_input_operands: ['RAX', 'RBX']",
        );
        let mnemonic = message.get_field_by_name("llvm_mnemonic").expect("field");
        assert_eq!(mnemonic.as_str(), Some("ADD32mr"));
        let mode = message.get_field_by_name("protection_mode").expect("field");
        assert_eq!(mode.as_i32(), Some(-3));
        let operands = message.get_field_by_name("implicit_input_operands").expect("field");
        assert_eq!(operands.as_list().map(<[_]>::len), Some(2));
        let syntax = message.get_field_by_name("syntax").expect("field");
        assert!(syntax.as_message().is_some());
    }

    #[test]
    fn empty_input_is_an_empty_message() {
        let message = parse("  # nothing but a comment\n");
        assert!(instruction().fields().all(|field| !message.has_field(&field)));
    }

    #[test]
    fn surrogate_pair_escape_decodes_to_one_character() {
        let message = parse(r#"description: "\ud83d\ude00""#);
        let description = message.get_field_by_name("description").expect("field");
        assert_eq!(description.as_str(), Some("\u{1F600}"));
    }

    #[test]
    fn unknown_field_reports_position_and_hint() {
        let err = parse_err("llvm_mnemonic: 'a'\nbogus: 1");
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.category(), Some(ParseFailureCategory::UnknownField));
        assert_eq!(err.line(), Some(2));
        assert!(err.message().is_some_and(|message| message.contains("bogus")));
        let hint = err.hint().expect("hint");
        assert!(hint.starts_with("Known fields of exegesis.InstructionProto: description, llvm_mnemonic"));
    }

    #[test]
    fn unknown_nested_field_hints_the_nested_type() {
        let err = parse_err("syntax { bogus: 1 }");
        assert_eq!(err.category(), Some(ParseFailureCategory::UnknownField));
        assert_eq!(
            err.hint(),
            Some("Known fields of exegesis.InstructionFormat: mnemonic, operands")
        );
    }

    #[test]
    fn malformed_inputs_are_parse_errors() {
        for input in [
            "llvm_mnemonic 'x'",
            "llvm_mnemonic: 'unterminated",
            "syntax { mnemonic: 'a'",
            "llvm_mnemonic: 12",
            "protection_mode: 2147483648",
            "vendor_syntax { operands { encoding: NOT_AN_ENCODING } }",
        ] {
            let err = parse_err(input);
            assert_eq!(err.kind(), ErrorKind::Parse, "{input}");
            assert!(err.category().is_some(), "{input}");
        }
    }

    #[test]
    fn parser_messages_map_to_categories() {
        let cases = [
            (
                "field 'bogus' not found for message 'exegesis.InstructionProto'",
                ParseFailureCategory::UnknownField,
            ),
            ("'llvm_mnemonic' is already set", ParseFailureCategory::DuplicateField),
            ("string is not valid utf-8", ParseFailureCategory::Utf8),
            (
                "expected an integer value between -2147483648 and 2147483647, but found '2147483648'",
                ParseFailureCategory::NumericRange,
            ),
            ("expected a string, but found '12'", ParseFailureCategory::TypeMismatch),
            (
                "'NOT_AN_ENCODING' is not a valid value for enum 'exegesis.InstructionOperand.Encoding'",
                ParseFailureCategory::TypeMismatch,
            ),
            ("expected ':', but found ''x''", ParseFailureCategory::Syntax),
        ];
        for (message, expected) in cases {
            assert_eq!(categorize_message(message), expected, "{message}");
        }
    }

    #[test]
    fn owning_message_reads_quoted_type_name() {
        assert_eq!(
            owning_message("field 'x' not found for message 'exegesis.InstructionFormat'"),
            Some("exegesis.InstructionFormat")
        );
        assert_eq!(owning_message("unexpected token"), None);
    }

    #[test]
    fn hint_contains_category_and_context() {
        let err = Error::new(ErrorKind::Parse).with_category(ParseFailureCategory::NumericRange);
        let hint = hint_for_error(&err, "test.context");
        assert!(hint.contains("parse category: numeric-range"));
        assert!(hint.contains("context: test.context"));
        assert!(hint_for_error(&Error::new(ErrorKind::Parse), "x").contains("unknown"));
    }
}
