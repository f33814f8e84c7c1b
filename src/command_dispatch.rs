//! Purpose: Hold top-level CLI command dispatch for `pbtext`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: `fmt --write` only touches the file after the whole input parsed cleanly.
//! Invariants: `diff` exits 1 on difference; errors still map through `to_exit_code`.

use super::*;
use color_text::colorize_text;
use pbtext::api::{PrintOptions, diff_messages, print_message, write_string};

pub(super) fn dispatch_command(command: Command, color_mode: ColorMode) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "pbtext", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output();
            Ok(RunOutcome::ok())
        }
        Command::Types => {
            let types = message_types()
                .iter()
                .map(type_json)
                .collect::<Vec<_>>();
            emit_json(json!({ "types": types }));
            Ok(RunOutcome::ok())
        }
        Command::Check { type_name, files } => {
            let descriptor = resolve_type(&type_name)?;
            let mut checked = Vec::with_capacity(files.len());
            for path in &files {
                let message = load_message(path, &descriptor)?;
                let fields = set_field_count(&message);
                tracing::debug!(path = %path.display(), fields, "checked");
                checked.push(json!({
                    "path": path.display().to_string(),
                    "type": descriptor.full_name(),
                    "fields": fields,
                }));
            }
            emit_json(json!({ "checked": checked }));
            Ok(RunOutcome::ok())
        }
        Command::Fmt {
            type_name,
            file,
            write,
            single_line,
        } => {
            let descriptor = resolve_type(&type_name)?;
            let message = load_message(&file, &descriptor)?;
            let options = PrintOptions::new().single_line(single_line);
            if write {
                let mut text = print_message(&message, &options);
                if single_line {
                    text.push('\n');
                }
                write_string(&file, &text)?;
                return Ok(RunOutcome::ok());
            }
            if single_line {
                println!("{}", print_message(&message, &options));
            } else {
                let use_color = color_mode.use_color(io::stdout().is_terminal());
                let text = print_message(&message, &options);
                print!("{}", colorize_text(&text, use_color));
            }
            Ok(RunOutcome::ok())
        }
        Command::Diff {
            type_name,
            expected,
            actual,
            json,
        } => {
            let descriptor = resolve_type(&type_name)?;
            let expected_message = load_message(&expected, &descriptor)?;
            let actual_message = load_message(&actual, &descriptor)?;
            let diff = diff_messages(&expected_message, &actual_message);
            if json {
                emit_json(json!({
                    "equal": diff.is_empty(),
                    "entries": diff.entries,
                }));
            } else {
                print!("{diff}");
            }
            if diff.is_empty() {
                Ok(RunOutcome::ok())
            } else {
                Ok(RunOutcome::with_code(1))
            }
        }
    }
}
