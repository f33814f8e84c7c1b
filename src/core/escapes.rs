//! Purpose: Fold UTF-16 surrogate pair escapes in string literals into the characters they encode.
//! Exports: `fold_surrogate_escapes`.
//! Role: Runs before the text-format parser, which decodes each `\u` escape on its own.
//! Invariants: Text outside string literals and every other escape pass through unchanged.
//! Invariants: A lone or reversed surrogate is a syntax error at the escape's 1-based position.

use std::borrow::Cow;

use crate::core::error::{Error, ErrorKind};
use crate::core::parse::ParseFailureCategory;

const HIGH_SURROGATES: std::ops::RangeInclusive<u32> = 0xD800..=0xDBFF;
const LOW_SURROGATES: std::ops::RangeInclusive<u32> = 0xDC00..=0xDFFF;
// `\uXXXX` is six characters; a pair is two of them.
const ESCAPE_LEN: usize = 6;

/// Returns `input` unchanged (borrowed) unless a `\uD83D\uDE00`-style pair was folded.
pub fn fold_surrogate_escapes(input: &str) -> Result<Cow<'_, str>, Error> {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut folded = false;
    let mut quote: Option<char> = None;
    let mut cursor = Cursor::default();

    while let Some(&ch) = chars.get(cursor.index) {
        let open_quote = quote;
        match open_quote {
            None if ch == '#' => {
                while let Some(&next) = chars.get(cursor.index) {
                    if next == '\n' {
                        break;
                    }
                    cursor.copy(next, &mut out);
                }
                continue;
            }
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None => {}
            Some(_) if ch == '\\' => {
                if let Some(unit) = unicode_escape(&chars, cursor.index)
                    .filter(|unit| HIGH_SURROGATES.contains(unit) || LOW_SURROGATES.contains(unit))
                {
                    let decoded = surrogate_pair(&chars, cursor.index, unit)
                        .ok_or_else(|| lone_surrogate(unit, cursor.line, cursor.column))?;
                    out.push(decoded);
                    folded = true;
                    cursor.skip(2 * ESCAPE_LEN);
                    continue;
                }
                cursor.copy(ch, &mut out);
                if let Some(&escaped) = chars.get(cursor.index) {
                    cursor.copy(escaped, &mut out);
                }
                continue;
            }
            Some(open) if ch == open || ch == '\n' => quote = None,
            Some(_) => {}
        }
        cursor.copy(ch, &mut out);
    }

    Ok(if folded {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(input)
    })
}

struct Cursor {
    index: usize,
    line: usize,
    column: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            index: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Cursor {
    fn copy(&mut self, ch: char, out: &mut String) {
        out.push(ch);
        self.index += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Only used for escapes, which never contain a newline.
    fn skip(&mut self, count: usize) {
        self.index += count;
        self.column += count;
    }
}

/// Code unit of a `\uXXXX` escape whose backslash sits at `at`.
fn unicode_escape(chars: &[char], at: usize) -> Option<u32> {
    if chars.get(at + 1) != Some(&'u') {
        return None;
    }
    chars
        .get(at + 2..at + ESCAPE_LEN)?
        .iter()
        .try_fold(0u32, |value, ch| ch.to_digit(16).map(|digit| value * 16 + digit))
}

fn surrogate_pair(chars: &[char], at: usize, high: u32) -> Option<char> {
    if !HIGH_SURROGATES.contains(&high) {
        return None;
    }
    let next = at + ESCAPE_LEN;
    if chars.get(next) != Some(&'\\') {
        return None;
    }
    let low = unicode_escape(chars, next).filter(|low| LOW_SURROGATES.contains(low))?;
    char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
}

fn lone_surrogate(unit: u32, line: usize, column: usize) -> Error {
    let expected = if HIGH_SURROGATES.contains(&unit) {
        "a following \\uDC00-\\uDFFF escape"
    } else {
        "a preceding \\uD800-\\uDBFF escape"
    };
    Error::new(ErrorKind::Parse)
        .with_message(format!("unpaired surrogate \\u{unit:04x} in string; expected {expected}"))
        .with_position(line, column)
        .with_category(ParseFailureCategory::Syntax)
}

#[cfg(test)]
mod tests {
    use super::fold_surrogate_escapes;
    use crate::core::parse::ParseFailureCategory;
    use std::borrow::Cow;

    #[test]
    fn folds_surrogate_pair_into_one_character() {
        let folded = fold_surrogate_escapes(r#"description: "smile \ud83d\ude00!""#).expect("fold");
        assert_eq!(folded, "description: \"smile \u{1F600}!\"");
        let upper = fold_surrogate_escapes(r"name: '\uD83D\uDE00'").expect("fold");
        assert_eq!(upper, "name: '\u{1F600}'");
    }

    #[test]
    fn input_without_pairs_is_borrowed() {
        let input = r#"a: "\u00e9 \n \\ud83d" # \ud83d in a comment"#;
        let folded = fold_surrogate_escapes(input).expect("fold");
        assert!(matches!(folded, Cow::Borrowed(_)));
        assert_eq!(folded, input);
    }

    #[test]
    fn lone_high_surrogate_is_syntax_error() {
        let err = fold_surrogate_escapes("x: 1\na: \"\\ud83d\"").expect_err("lone");
        assert_eq!(err.category(), Some(ParseFailureCategory::Syntax));
        assert_eq!((err.line(), err.column()), (Some(2), Some(5)));
        assert!(err.message().is_some_and(|message| message.contains("following")));
    }

    #[test]
    fn reversed_pair_is_rejected() {
        let err = fold_surrogate_escapes(r"a: '\ude00\ud83d'").expect_err("reversed");
        assert_eq!(err.column(), Some(5));
        assert!(err.message().is_some_and(|message| message.contains("preceding")));
    }

    #[test]
    fn high_surrogate_followed_by_non_surrogate_is_rejected() {
        assert!(fold_surrogate_escapes(r"a: '\ud83d\u0041'").is_err());
        assert!(fold_surrogate_escapes(r"a: '\ud83dx'").is_err());
    }
}
