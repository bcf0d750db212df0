//! # Flag Registry
//!
//! [`FlagSet`] is the single registry every record binds into during one
//! orchestration call. It is built on clap's builder API: each binding becomes
//! a `clap::Arg` with a typed value parser, and clap owns tokenization, help
//! rendering and value validation.
//!
//! ## Syntax
//!
//! Flags may be written with one or two dashes. A single-dash token whose name
//! is longer than one character is read as its long form, so `-port=80` and
//! `--port=80` are the same flag. Flag names in argv match case-insensitively.
//!
//! Boolean flags take an optional `=value`; a bare `-verbose` sets `true`.
//! Every other flag takes a value as `-name=value` or `-name value`.
//!
//! One positional argument, the `NAME:METHOD` command token, is accepted.

use crate::error::{CommanderError, Result};
use crate::value::{FieldType, Value, parse_duration};
use clap::{Arg, ArgAction, ArgMatches, value_parser};
use std::ffi::OsString;
use std::time::Duration;
use tracing::debug;

const COMMAND_ARG: &str = "command-token";
const RESERVED: &[&str] = &["help", "h"];

/// One registered flag.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagBinding {
    pub name: String,
    pub ty: FieldType,
    pub default: Value,
    pub help: String,
}

/// The shared flag registry.
pub struct FlagSet {
    command: clap::Command,
    bindings: Vec<FlagBinding>,
}

impl FlagSet {
    pub fn new(bin_name: impl Into<String>) -> Self {
        let command = clap::Command::new(bin_name.into())
            .arg(
                Arg::new(COMMAND_ARG)
                    .value_name("NAME:METHOD")
                    .help("Record and method to run")
                    .action(ArgAction::Set),
            );
        Self {
            command,
            bindings: Vec::new(),
        }
    }

    /// Adds a flag. Names must be unique across the whole set.
    pub fn register(&mut self, binding: FlagBinding) -> Result<()> {
        if RESERVED.contains(&binding.name.as_str()) || self.lookup(&binding.name).is_some() {
            return Err(CommanderError::FlagRedefined(binding.name));
        }
        if !binding.ty.is_supported() {
            return Err(CommanderError::UnsupportedFieldType {
                field: binding.name,
                type_name: binding.ty.type_name(),
            });
        }

        let arg = build_arg(&binding);
        debug!(flag = %binding.name, ty = binding.ty.type_name(), default = %binding.default, "registered flag");
        self.command = std::mem::take(&mut self.command).arg(arg);
        self.bindings.push(binding);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&FlagBinding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|b| b.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Help text listing every registered flag.
    pub fn usage(&mut self) -> String {
        self.command.render_help().to_string()
    }

    /// Parses argv (program name first) against the registered flags.
    pub fn parse<I, T>(&mut self, args: I) -> Result<ParsedArgs>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args = normalize_args(args.into_iter().map(Into::into), &self.bindings);
        let matches = self.command.try_get_matches_from_mut(args)?;
        let parsed = ParsedArgs { matches };
        debug!(command = ?parsed.command_token(), "parsed argv");
        Ok(parsed)
    }
}

fn build_arg(binding: &FlagBinding) -> Arg {
    let mut arg = Arg::new(binding.name.clone())
        .long(binding.name.clone())
        .help(binding.help.clone())
        .action(ArgAction::Set);

    let mut chars = binding.name.chars();
    if let (Some(c), None) = (chars.next(), chars.next())
        && c.is_ascii_alphanumeric()
    {
        arg = arg.short(c);
    }

    let default = binding.default.to_string();
    if !default.is_empty() {
        arg = arg.default_value(default);
    }

    match binding.ty {
        FieldType::Bool => arg
            .value_parser(value_parser!(bool))
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true"),
        FieldType::I32 => arg
            .value_parser(value_parser!(i32))
            .allow_negative_numbers(true),
        FieldType::I64 => arg
            .value_parser(value_parser!(i64))
            .allow_negative_numbers(true),
        FieldType::U32 => arg.value_parser(value_parser!(u32)),
        FieldType::U64 => arg.value_parser(value_parser!(u64)),
        FieldType::F64 => arg
            .value_parser(value_parser!(f64))
            .allow_negative_numbers(true),
        FieldType::Str => arg
            .value_parser(value_parser!(String))
            .allow_hyphen_values(true),
        FieldType::Duration => arg.value_parser(parse_duration).value_name("DURATION"),
        FieldType::Unsupported(_) => arg,
    }
}

/// Rewrites `-name=value` to `--name=value` and lowercases flag names.
/// The token after a non-bool flag written without `=` is its value and is
/// passed through as is. Everything after a bare `--` is left alone.
fn normalize_args(args: impl Iterator<Item = OsString>, bindings: &[FlagBinding]) -> Vec<OsString> {
    let mut out = Vec::new();
    let mut flags_done = false;
    let mut value_next = false;
    for (i, arg) in args.enumerate() {
        if i == 0 || flags_done {
            out.push(arg);
            continue;
        }
        if value_next {
            value_next = false;
            out.push(arg);
            continue;
        }
        let Some(text) = arg.to_str() else {
            out.push(arg);
            continue;
        };
        if text == "--" {
            flags_done = true;
            out.push(arg);
            continue;
        }
        let normalized = normalize_flag(text);
        value_next = takes_separate_value(&normalized, bindings);
        out.push(OsString::from(normalized));
    }
    out
}

fn takes_separate_value(token: &str, bindings: &[FlagBinding]) -> bool {
    let Some(name) = token.strip_prefix("--").or_else(|| token.strip_prefix('-')) else {
        return false;
    };
    if name.is_empty() || name.contains('=') {
        return false;
    }
    bindings
        .iter()
        .any(|b| b.name == name && b.ty != FieldType::Bool)
}

fn normalize_flag(text: &str) -> String {
    let (dashes, body) = if let Some(body) = text.strip_prefix("--") {
        ("--", body)
    } else if let Some(body) = text.strip_prefix('-') {
        ("-", body)
    } else {
        return text.to_string();
    };

    // Negative numbers are values, not flags.
    if body.is_empty() || body.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return text.to_string();
    }

    let (name, value) = match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    };
    let dashes = if dashes == "-" && name.chars().count() > 1 {
        "--"
    } else {
        dashes
    };
    let name = name.to_lowercase();
    match value {
        Some(value) => format!("{}{}={}", dashes, name, value),
        None => format!("{}{}", dashes, name),
    }
}

/// Result of parsing argv against a [`FlagSet`].
#[derive(Debug)]
pub struct ParsedArgs {
    matches: ArgMatches,
}

impl ParsedArgs {
    /// The positional `NAME:METHOD` token, if one was given.
    pub fn command_token(&self) -> Option<&str> {
        self.matches.get_one::<String>(COMMAND_ARG).map(String::as_str)
    }

    /// Parsed value of a registered flag, or its default when absent.
    pub fn value(&self, flag: &str, ty: FieldType) -> Option<Value> {
        match ty {
            FieldType::Bool => self.matches.get_one::<bool>(flag).copied().map(Value::Bool),
            FieldType::I32 => self.matches.get_one::<i32>(flag).copied().map(Value::I32),
            FieldType::I64 => self.matches.get_one::<i64>(flag).copied().map(Value::I64),
            FieldType::U32 => self.matches.get_one::<u32>(flag).copied().map(Value::U32),
            FieldType::U64 => self.matches.get_one::<u64>(flag).copied().map(Value::U64),
            FieldType::F64 => self.matches.get_one::<f64>(flag).copied().map(Value::F64),
            FieldType::Str => self.matches.get_one::<String>(flag).cloned().map(Value::Str),
            FieldType::Duration => self
                .matches
                .get_one::<Duration>(flag)
                .copied()
                .map(Value::Duration),
            FieldType::Unsupported(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(name: &str, default: Value) -> FlagBinding {
        FlagBinding {
            name: name.to_string(),
            ty: default.field_type(),
            default,
            help: format!("{name} flag"),
        }
    }

    fn set_with(bindings: Vec<FlagBinding>) -> FlagSet {
        let mut flags = FlagSet::new("test");
        for b in bindings {
            flags.register(b).unwrap();
        }
        flags
    }

    #[test]
    fn single_dash_long_flags_are_accepted() {
        let mut flags = set_with(vec![
            binding("bool", Value::Bool(false)),
            binding("str", Value::Str(String::new())),
        ]);
        let parsed = flags
            .parse(["test", "-bool=true", "-str=hello", "Test:Try"])
            .unwrap();
        assert_eq!(parsed.value("bool", FieldType::Bool), Some(Value::Bool(true)));
        assert_eq!(
            parsed.value("str", FieldType::Str),
            Some(Value::Str("hello".into()))
        );
        assert_eq!(parsed.command_token(), Some("Test:Try"));
    }

    #[test]
    fn bare_bool_flag_means_true() {
        let mut flags = set_with(vec![binding("verbose", Value::Bool(false))]);
        let parsed = flags.parse(["test", "--verbose", "A:b"]).unwrap();
        assert_eq!(
            parsed.value("verbose", FieldType::Bool),
            Some(Value::Bool(true))
        );
        assert_eq!(parsed.command_token(), Some("A:b"));
    }

    #[test]
    fn absent_flags_report_their_default() {
        let mut flags = set_with(vec![
            binding("port", Value::U32(8080)),
            binding("timeout", Value::Duration(Duration::from_secs(1))),
        ]);
        let parsed = flags.parse(["test"]).unwrap();
        assert_eq!(parsed.value("port", FieldType::U32), Some(Value::U32(8080)));
        assert_eq!(
            parsed.value("timeout", FieldType::Duration),
            Some(Value::Duration(Duration::from_secs(1)))
        );
        assert_eq!(parsed.command_token(), None);
    }

    #[test]
    fn empty_string_default_stays_unset() {
        let mut flags = set_with(vec![binding("name", Value::Str(String::new()))]);
        let parsed = flags.parse(["test"]).unwrap();
        assert_eq!(parsed.value("name", FieldType::Str), None);
    }

    #[test]
    fn negative_numbers_are_values() {
        let mut flags = set_with(vec![
            binding("i64", Value::I64(0)),
            binding("f64", Value::F64(0.0)),
        ]);
        let parsed = flags
            .parse(["test", "-i64", "-10000000000", "--f64=-2.5"])
            .unwrap();
        assert_eq!(
            parsed.value("i64", FieldType::I64),
            Some(Value::I64(-10_000_000_000))
        );
        assert_eq!(parsed.value("f64", FieldType::F64), Some(Value::F64(-2.5)));
    }

    #[test]
    fn separated_values_keep_their_dashes_and_case() {
        let mut flags = set_with(vec![
            binding("str", Value::Str(String::new())),
            binding("n", Value::I32(0)),
            binding("bool", Value::Bool(false)),
        ]);
        let parsed = flags
            .parse(["test", "-STR", "-Hello", "-n", "-7", "-bool", "Test:Try"])
            .unwrap();
        assert_eq!(
            parsed.value("str", FieldType::Str),
            Some(Value::Str("-Hello".into()))
        );
        assert_eq!(parsed.value("n", FieldType::I32), Some(Value::I32(-7)));
        assert_eq!(parsed.value("bool", FieldType::Bool), Some(Value::Bool(true)));
        assert_eq!(parsed.command_token(), Some("Test:Try"));
    }

    #[test]
    fn only_the_token_after_a_value_flag_is_kept_verbatim() {
        let bindings = vec![
            binding("str", Value::Str(String::new())),
            binding("verbose", Value::Bool(false)),
        ];
        let args = ["test", "-Str", "-Hello", "-Verbose", "-Other=X", "--", "-Raw"]
            .into_iter()
            .map(OsString::from);
        assert_eq!(
            normalize_args(args, &bindings),
            ["test", "--str", "-Hello", "--verbose", "--other=X", "--", "-Raw"]
        );
    }

    #[test]
    fn flag_names_match_case_insensitively() {
        let mut flags = set_with(vec![binding("port", Value::U32(0))]);
        let parsed = flags.parse(["test", "-PORT=9"]).unwrap();
        assert_eq!(parsed.value("port", FieldType::U32), Some(Value::U32(9)));
    }

    #[test]
    fn single_char_names_work_as_short_flags() {
        let mut flags = set_with(vec![binding("n", Value::I32(0))]);
        let parsed = flags.parse(["test", "-n=3"]).unwrap();
        assert_eq!(parsed.value("n", FieldType::I32), Some(Value::I32(3)));
    }

    #[test]
    fn bad_values_are_rejected_by_clap() {
        let mut flags = set_with(vec![binding("port", Value::U32(0))]);
        let err = flags.parse(["test", "-port=-1"]).unwrap_err();
        assert!(matches!(err, CommanderError::Flags(_)));

        let mut flags = set_with(vec![binding("wait", Value::Duration(Duration::ZERO))]);
        assert!(flags.parse(["test", "-wait=soon"]).is_err());
    }

    #[test]
    fn unknown_flags_and_extra_positionals_fail() {
        let mut flags = set_with(vec![binding("port", Value::U32(0))]);
        assert!(flags.parse(["test", "-nope=1", "A:b"]).is_err());
        assert!(flags.parse(["test", "A:b", "C:d"]).is_err());
    }

    #[test]
    fn duplicate_and_reserved_names_are_refused() {
        let mut flags = set_with(vec![binding("port", Value::U32(0))]);
        let err = flags.register(binding("port", Value::U32(1))).unwrap_err();
        assert!(matches!(err, CommanderError::FlagRedefined(name) if name == "port"));

        assert!(flags.register(binding("help", Value::Bool(false))).is_err());
        assert_eq!(flags.len(), 1);
    }

    #[test]
    fn usage_lists_flags_with_help_and_defaults() {
        let mut flags = set_with(vec![binding("port", Value::U32(8080))]);
        let usage = flags.usage();
        assert!(usage.contains("--port"));
        assert!(usage.contains("port flag"));
        assert!(usage.contains("8080"));
        assert!(usage.contains("NAME:METHOD"));
    }

    #[test]
    fn normalization_leaves_values_and_positionals_alone() {
        assert_eq!(normalize_flag("-Bool=True"), "--bool=True");
        assert_eq!(normalize_flag("--Str=Hello"), "--str=Hello");
        assert_eq!(normalize_flag("-v"), "-v");
        assert_eq!(normalize_flag("-5"), "-5");
        assert_eq!(normalize_flag("Test:Try"), "Test:Try");
        assert_eq!(normalize_flag("-"), "-");
    }
}
