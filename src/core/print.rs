//! Purpose: Encode a `DynamicMessage` as canonical protobuf text format.
//! Exports: `print_message`, `PrintOptions`.
//! Role: The only text encode boundary; `prost_reflect::text_format` does the writing.
//! Invariants: Multi-line output is empty or newline-terminated; single-line output has no newline.
//! Invariants: Printing is total, and its output re-parses to an equal message.

use prost_reflect::DynamicMessage;
use prost_reflect::text_format::FormatOptions;

#[derive(Clone, Debug, Default)]
pub struct PrintOptions {
    pub single_line: bool,
}

impl PrintOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single_line(mut self, single_line: bool) -> Self {
        self.single_line = single_line;
        self
    }
}

pub fn print_message(message: &DynamicMessage, options: &PrintOptions) -> String {
    let format = FormatOptions::new().pretty(!options.single_line);
    let mut text = message.to_text_format_with_options(&format);
    if options.single_line {
        text.truncate(text.trim_end().len());
    } else if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
