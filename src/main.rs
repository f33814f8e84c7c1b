//! Purpose: `pbtext` CLI entry point for checking, formatting, and diffing text-format files.
//! Role: Binary crate root; parses args, initializes tracing, runs commands.
//! Invariants: Machine-readable reports are JSON on stdout; canonical text is printed as-is.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod color_text;
mod command_dispatch;

use pbtext::api::{
    DynamicMessage, Error, ErrorKind, MessageDescriptor, parse_message, read_to_string,
    to_exit_code,
};
use pbtext::proto::{find_message_type, message_types};
use prost_reflect::{Kind, ReflectMessage};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Try `pbtext --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    init_tracing(cli.verbose);
    let color_mode = cli.color;

    command_dispatch::dispatch_command(cli.command, color_mode)
        .map_err(add_parse_hint)
        .map_err(add_io_hint)
        .map_err(|err| (err, color_mode))
}

/// Logs go to stderr so stdout stays parseable; `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "pbtext",
    version,
    about = "Check, format, and diff protobuf text-format files",
    help_template = r#"{about-with-newline}
USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    after_help = r#"EXAMPLES
  $ pbtext check --type InstructionProto add.pbtxt
  $ pbtext fmt --type InstructionProto add.pbtxt --write
  $ pbtext diff --type InstructionProto golden.pbtxt add.pbtxt
  $ pbtext types

LEARN MORE
  $ pbtext <command> --help"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        global = true,
        help = "Colorize stderr diagnostics and formatted output: auto|always|never"
    )]
    color: ColorMode,
    #[arg(long, global = true, help = "Enable debug logging on stderr (RUST_LOG overrides)")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        arg_required_else_help = true,
        about = "Parse files and report field counts",
        after_help = r#"EXAMPLES
  $ pbtext check --type InstructionProto a.pbtxt b.pbtxt"#
    )]
    Check {
        #[arg(long = "type", short = 't', help = "Message type (full or short name)")]
        type_name: String,
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,
    },
    #[command(
        arg_required_else_help = true,
        about = "Print the canonical encoding of a file",
        after_help = r#"EXAMPLES
  $ pbtext fmt --type InstructionProto add.pbtxt
  $ pbtext fmt --type InstructionProto add.pbtxt --write"#
    )]
    Fmt {
        #[arg(long = "type", short = 't', help = "Message type (full or short name)")]
        type_name: String,
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[arg(long, help = "Rewrite the file in place instead of printing")]
        write: bool,
        #[arg(long, help = "Emit the whole message on one line")]
        single_line: bool,
    },
    #[command(
        arg_required_else_help = true,
        about = "Structurally compare two files (exit 1 when they differ)",
        after_help = r#"EXAMPLES
  $ pbtext diff --type InstructionProto expected.pbtxt actual.pbtxt
  $ pbtext diff --type InstructionProto expected.pbtxt actual.pbtxt --json"#
    )]
    Diff {
        #[arg(long = "type", short = 't', help = "Message type (full or short name)")]
        type_name: String,
        #[arg(value_hint = ValueHint::FilePath)]
        expected: PathBuf,
        #[arg(value_hint = ValueHint::FilePath)]
        actual: PathBuf,
        #[arg(long, help = "Emit the diff as JSON")]
        json: bool,
    },
    #[command(about = "List registered message types and their fields as JSON")]
    Types,
    #[command(arg_required_else_help = true, about = "Generate shell completion scripts")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    #[command(about = "Print version info")]
    Version,
}

fn resolve_type(name: &str) -> Result<MessageDescriptor, Error> {
    find_message_type(name).ok_or_else(|| {
        let known = message_types()
            .iter()
            .map(|descriptor| descriptor.full_name().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Error::new(ErrorKind::Usage)
            .with_message(format!("unknown message type \"{name}\""))
            .with_hint(format!("Known types: {known}. Run `pbtext types` for details."))
    })
}

fn load_message(path: &Path, descriptor: &MessageDescriptor) -> Result<DynamicMessage, Error> {
    let contents = read_to_string(path)?;
    parse_message(&contents, descriptor).map_err(|err| err.with_path(path))
}

/// Fields holding a non-default value (or a present submessage).
fn set_field_count(message: &DynamicMessage) -> usize {
    message
        .descriptor()
        .fields()
        .filter(|field| message.has_field(field))
        .count()
}

fn kind_name(kind: &Kind) -> String {
    match kind {
        Kind::Message(message) => message.full_name().to_string(),
        Kind::Enum(enumeration) => enumeration.full_name().to_string(),
        scalar => format!("{scalar:?}").to_ascii_lowercase(),
    }
}

fn type_json(descriptor: &MessageDescriptor) -> Value {
    let fields = descriptor
        .fields()
        .map(|field| {
            json!({
                "name": field.name(),
                "number": field.number(),
                "type": kind_name(&field.kind()),
                "repeated": field.is_list(),
            })
        })
        .collect::<Vec<_>>();
    json!({
        "name": descriptor.full_name(),
        "fields": fields,
    })
}

fn add_parse_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Parse || err.hint().is_some() {
        return err;
    }
    err.with_hint("Fix the reported location, or run `pbtext types` to list valid field names.")
}

fn add_io_hint(err: Error) -> Error {
    match err.kind() {
        ErrorKind::NotFound if err.hint().is_none() => {
            err.with_hint("Check the file path; relative paths resolve from the current directory.")
        }
        ErrorKind::Permission if err.hint().is_none() => {
            err.with_hint("Check file permissions for the current user.")
        }
        _ => err,
    }
}

fn emit_version_output() {
    if io::stdout().is_terminal() {
        println!("pbtext {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(json!({
            "name": "pbtext",
            "version": env!("CARGO_PKG_VERSION"),
        }));
    }
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Parse => "parse error".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    if let Some(column) = err.column() {
        inner.insert("column".to_string(), json!(column));
    }
    if let Some(category) = err.category() {
        inner.insert("category".to_string(), json!(category.as_str()));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let (Some(line), Some(column)) = (err.line(), err.column()) {
        lines.push(format!(
            "{} {line}:{column}",
            colorize_label("line:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

#[cfg(test)]
mod tests {
    use super::{
        Cli, ColorMode, add_io_hint, add_parse_hint, error_json, error_text, resolve_type,
        set_field_count, type_json,
    };
    use clap::{CommandFactory, Parser};
    use pbtext::api::{Error, ErrorKind, ParseFailureCategory, parse_message};
        use std::io;
    use std::path::Path;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn triple_dash_flags_are_usage_errors() {
        let err = Cli::try_parse_from(["pbtext", "---help"]).err().expect("rejected");
        assert_ne!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn error_text_respects_color_flag() {
        let err = Error::new(ErrorKind::Parse)
            .with_message("bad token")
            .with_hint("fix it")
            .with_path("/tmp/a.pbtxt")
            .with_position(3, 7);
        let plain = error_text(&err, false);
        assert_eq!(
            plain,
            "error: bad token\nhint: fix it\npath: /tmp/a.pbtxt\nline: 3:7"
        );
        let colored = error_text(&err, true);
        assert!(colored.contains("\u{1b}[31merror:\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[33mhint:\u{1b}[0m"));
        assert!(ColorMode::Auto.use_color(true));
        assert!(!ColorMode::Never.use_color(true));
    }

    #[test]
    fn error_json_carries_position_and_category() {
        let err = Error::new(ErrorKind::Parse)
            .with_message("unknown field")
            .with_position(1, 1)
            .with_category(ParseFailureCategory::UnknownField);
        let value = error_json(&err);
        assert_eq!(value["error"]["kind"], "Parse");
        assert_eq!(value["error"]["line"], 1);
        assert_eq!(value["error"]["category"], "unknown-field");
        assert!(value["error"].get("path").is_none());
    }

    #[test]
    fn error_json_lists_causes() {
        let err = Error::from_io(io::Error::other("disk on fire"), Path::new("/x"));
        let value = error_json(&err);
        assert_eq!(value["error"]["causes"][0], "disk on fire");
    }

    #[test]
    fn hints_fill_only_when_missing() {
        let parse = add_parse_hint(Error::new(ErrorKind::Parse));
        assert!(parse.hint().is_some_and(|hint| hint.contains("pbtext types")));
        let kept = add_io_hint(Error::new(ErrorKind::NotFound).with_hint("custom"));
        assert_eq!(kept.hint(), Some("custom"));
        let usage = add_io_hint(Error::new(ErrorKind::Usage));
        assert!(usage.hint().is_none());
    }

    #[test]
    fn resolve_type_reports_known_types() {
        let err = resolve_type("Nope").expect_err("unknown");
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.hint().is_some_and(|hint| hint.contains("exegesis.InstructionProto")));
        assert!(resolve_type("InstructionOperand").is_ok());
    }

    #[test]
    fn type_json_lists_fields_in_declaration_order() {
        let value = type_json(&resolve_type("exegesis.InstructionOperand").expect("operand"));
        assert_eq!(value["name"], "exegesis.InstructionOperand");
        assert_eq!(value["fields"][0]["name"], "addressing_mode");
        assert_eq!(
            value["fields"][0]["type"],
            "exegesis.InstructionOperand.AddressingMode"
        );
        assert_eq!(value["fields"][2]["type"], "uint32");
        assert_eq!(value["fields"][3]["repeated"], false);
    }

    #[test]
    fn field_count_skips_defaults_but_counts_present_submessages() {
        let descriptor = resolve_type("InstructionProto").expect("type");
        let message = parse_message(
            "llvm_mnemonic: 'ADD32mr' protection_mode: 0 syntax {} implicit_input_operands: []",
            &descriptor,
        )
        .expect("parse");
        assert_eq!(set_field_count(&message), 2);
    }
}
