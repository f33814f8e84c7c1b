//! Purpose: Add ANSI colors to canonical text-format output for CLI display.
//! Exports: colorize_text.
//! Role: Small, pure line formatter used by `fmt` when stdout is a terminal.
//! Invariants: When color is disabled, output equals the input text byte for byte.
//! Invariants: Stripping the ANSI escapes from colored output yields the input text.
// Conservative 8/16-color palette for broad terminal compatibility.
const COLOR_FIELD: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_SYMBOL: &str = "35";
const COLOR_PUNCT: &str = "39";

pub fn colorize_text(text: &str, use_color: bool) -> String {
    if !use_color {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() * 2);
    for line in text.split_inclusive('\n') {
        let body = line.strip_suffix('\n').unwrap_or(line);
        colorize_line(body, &mut out);
        if body.len() < line.len() {
            out.push('\n');
        }
    }
    out
}

/// Colors one `name: value`, `name {`, or `}` line; anything else passes through.
fn colorize_line(line: &str, out: &mut String) {
    let trimmed = line.trim_start();
    out.push_str(&line[..line.len() - trimmed.len()]);
    if trimmed.starts_with('}') || trimmed.starts_with(']') {
        push_colored(trimmed, COLOR_PUNCT, out);
        return;
    }
    let name_end = trimmed
        .find(|ch: char| !(ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '[' | ']' | '/')))
        .unwrap_or(trimmed.len());
    let (name, rest) = trimmed.split_at(name_end);
    if name.is_empty() {
        out.push_str(trimmed);
        return;
    }
    push_colored(name, COLOR_FIELD, out);
    let rest = match rest.strip_prefix(':') {
        Some(after_colon) => {
            push_colored(":", COLOR_PUNCT, out);
            after_colon
        }
        None => rest,
    };
    let value = rest.trim_start();
    out.push_str(&rest[..rest.len() - value.len()]);
    if !value.is_empty() {
        push_colored(value, value_color(value), out);
    }
}

fn value_color(value: &str) -> &'static str {
    match value.chars().next() {
        Some('"' | '\'') => COLOR_STRING,
        Some('{' | '[' | '<') => COLOR_PUNCT,
        Some(ch) if ch.is_ascii_digit() || ch == '-' || ch == '.' => COLOR_NUMBER,
        _ => COLOR_SYMBOL,
    }
}

fn push_colored(text: &str, color: &str, out: &mut String) {
    out.push_str("\u{1b}[");
    out.push_str(color);
    out.push('m');
    out.push_str(text);
    out.push_str("\u{1b}[0m");
}
