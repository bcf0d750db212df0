//! # Orchestration
//!
//! [`Commander`] drives one full pass over a set of records:
//!
//! ```text
//! construct ──▶ bind ──▶ parse argv ──▶ match NAME ──▶ exec METHOD
//! ```
//!
//! Every phase runs for all records before the next phase starts, and the
//! first failure in any phase ends the pass with that error. Nothing is
//! retried.
//!
//! ## Matching
//!
//! The command token is split on `:` into exactly two non-empty parts. The
//! first part is compared case-insensitively against each record's type name
//! in registration order; the first record that matches handles the call. A
//! `CommandNotFound` error is returned only after every record was checked.

use crate::command::Command;
use crate::config::Options;
use crate::error::{CommanderError, Result};
use crate::flags::FlagSet;
use crate::reflect::Reflect;
use std::ffi::OsString;
use std::io::{self, Write};
use tracing::debug;

const SEPARATOR: char = ':';

/// Binds a set of records to flags and dispatches the command token.
///
/// ```no_run
/// use commanderize::{Commander, Options, Record, behaviors};
///
/// #[derive(Record, Default)]
/// pub struct Greeter {
///     #[cmd = "Who to greet"]
///     pub name: String,
/// }
///
/// #[behaviors]
/// impl Greeter {
///     pub fn hello(&self) {
///         println!("hello {}", self.name);
///     }
/// }
///
/// let mut greeter = Greeter::default();
/// // greeter -name=world Greeter:Hello
/// Commander::new(Options::DEFAULT)
///     .command(&mut greeter)
///     .run()
///     .unwrap();
/// ```
pub struct Commander<'a> {
    options: Options,
    instances: Vec<&'a mut dyn Reflect>,
}

impl<'a> Commander<'a> {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            instances: Vec::new(),
        }
    }

    /// Adds a record. Records are matched in the order they are added.
    pub fn command(mut self, instance: &'a mut dyn Reflect) -> Self {
        self.instances.push(instance);
        self
    }

    /// Runs against the process arguments, printing usage to stdout.
    pub fn run(self) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_from(std::env::args_os(), &mut out)
    }

    /// Runs against `args` (program name first). Usage text for a missing
    /// command token is written to `out`.
    pub fn run_from<I, T>(self, args: I, out: &mut dyn Write) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let Commander { options, instances } = self;

        let mut commands = Vec::with_capacity(instances.len());
        for instance in instances {
            commands.push(Command::new(instance)?);
        }

        let mut flags = FlagSet::new(env!("CARGO_PKG_NAME"));
        for command in &mut commands {
            command.bind_flags(&options, &mut flags)?;
        }
        debug!(
            commands = commands.len(),
            flags = flags.len(),
            namespaced = options.namespaced,
            "bound flags"
        );

        let parsed = flags.parse(args)?;
        for command in &mut commands {
            command.apply(&parsed);
        }

        let Some(token) = parsed.command_token() else {
            write!(out, "{}", flags.usage())?;
            return Err(CommanderError::MissingCommandArgument);
        };
        let (name, method) = split_token(token)?;

        let command = commands
            .iter_mut()
            .find(|c| c.matches(name))
            .ok_or_else(|| CommanderError::CommandNotFound(name.to_string()))?;
        command.exec(method)
    }
}

/// Runs `instances` against the process arguments.
///
/// Shorthand for adding each instance to a [`Commander`] and calling
/// [`Commander::run`].
pub fn commanderize(options: Options, instances: &mut [&mut dyn Reflect]) -> Result<()> {
    instances
        .iter_mut()
        .fold(Commander::new(options), |commander, instance| {
            commander.command(&mut **instance)
        })
        .run()
}

fn split_token(token: &str) -> Result<(&str, &str)> {
    let parts: Vec<&str> = token.split(SEPARATOR).collect();
    match parts.as_slice() {
        [name, method] if !name.is_empty() && !method.is_empty() => Ok((*name, *method)),
        _ => Err(CommanderError::MalformedCommandToken(token.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_name_and_method() {
        assert_eq!(split_token("Test:Try").unwrap(), ("Test", "Try"));
        assert_eq!(split_token("a:b").unwrap(), ("a", "b"));
    }

    #[test]
    fn rejects_tokens_without_exactly_two_parts() {
        for token in ["Test", "Test:Try:Again", ":Try", "Test:", ":", ""] {
            match split_token(token) {
                Err(CommanderError::MalformedCommandToken(got)) => assert_eq!(got, token),
                other => panic!("{token:?} gave {other:?}"),
            }
        }
    }
}
