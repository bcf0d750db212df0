//! # Commanderize Architecture
//!
//! Commanderize turns plain structs into command-line commands. Public fields
//! become typed flags, public zero-argument methods become actions, and a
//! single positional token `Name:Method` picks which method of which struct
//! runs. No per-command parsing code is written by hand.
//!
//! ```text
//! $ server -addr=0.0.0.0 -port=9000 -timeout=30s Server:Start
//!          └──────── flags from Server's fields ───┘ └ token ┘
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Records (caller-owned structs)                             │
//! │  - #[derive(Record)] describes fields                       │
//! │  - #[behaviors] describes methods                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │  check_is_record
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Commands (command.rs)                                      │
//! │  - Type name + borrowed instance                            │
//! │  - bind_flags: fields ──▶ FlagSet                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  FlagSet (flags.rs)                                         │
//! │  - One registry per run, backed by clap                     │
//! │  - Parses argv, values flow back into the fields            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Commander (commander.rs)                                   │
//! │  - Splits Name:Method, finds the command, runs the method   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No Runtime Reflection
//!
//! Rust has no runtime field or method enumeration. Each record instead
//! exposes a static table through [`Reflect`]: field names, declared types,
//! visibility and annotation strings, plus its method names. The derive
//! macros build that table at compile time, and it can also be written by
//! hand. Values that are not structs implement [`Reflect`] too, so passing
//! one is a typed [`CommanderError::NotARecord`] instead of a compile error.
//!
//! ## Errors
//!
//! Every step returns [`Result`]. The first failure ends the run; errors are
//! never aggregated across records. The one side effect on failure is the
//! usage dump written before [`CommanderError::MissingCommandArgument`].
//! A panic inside a dispatched method is not caught.
//!
//! ## Module Overview
//!
//! - [`commander`]: The entry point, runs the whole pipeline
//! - [`command`]: Per-record binding and method dispatch
//! - [`flags`]: The flag registry
//! - [`reflect`]: The self-description traits and non-record impls
//! - [`value`]: Supported field types, values and duration syntax
//! - [`config`]: Binding options
//! - [`error`]: Error types

extern crate self as commanderize;

pub mod command;
pub mod commander;
pub mod config;
pub mod error;
pub mod flags;
pub mod reflect;
pub mod value;

pub use command::Command;
pub use commander::{Commander, commanderize};
pub use commanderize_derive::{Record, behaviors};
pub use config::Options;
pub use error::{CommanderError, Result};
pub use flags::{FlagBinding, FlagSet, ParsedArgs};
pub use reflect::{Behaviors, EXCLUDE, FieldInfo, MethodInfo, Reflect, TypeKind, check_is_record};
pub use value::{FieldType, FlagType, Value};
