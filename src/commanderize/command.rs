//! # Command Descriptors
//!
//! A [`Command`] is one registered record instance: the record's declared type
//! name plus a borrowed handle to the caller's value. It carries the three
//! per-record steps of an orchestration call:
//!
//! 1. [`Command::bind_flags`] walks the record's fields and registers one flag
//!    per public, non-excluded field into the shared [`FlagSet`].
//! 2. [`Command::apply`] copies parsed flag values back into those fields.
//! 3. [`Command::exec`] runs one of the record's public zero-argument methods,
//!    looked up case-insensitively.
//!
//! ## Flag names
//!
//! Without namespacing a field `Port` becomes `-port`. Two records with a
//! `port` field then collide and binding the second one fails with
//! `FlagRedefined`. With [`Options::namespaced`] the flag is `-server.port`.

use crate::config::Options;
use crate::error::{CommanderError, Result};
use crate::flags::{FlagBinding, FlagSet, ParsedArgs};
use crate::reflect::{Reflect, check_is_record};
use crate::value::FieldType;
use std::collections::HashMap;
use tracing::{debug, trace};

/// A registered record instance.
pub struct Command<'a> {
    name: &'static str,
    instance: &'a mut dyn Reflect,
    /// Lowercased method name to declared name.
    methods: HashMap<String, &'static str>,
    /// Flag name to field name, filled by `bind_flags`.
    bound: Vec<(String, &'static str, FieldType)>,
}

impl<'a> Command<'a> {
    /// Wraps a record. Fails with `NotARecord` for anything else.
    pub fn new(instance: &'a mut dyn Reflect) -> Result<Self> {
        check_is_record(&*instance)?;

        let mut methods = HashMap::new();
        for method in instance.methods().iter().filter(|m| m.is_dispatchable()) {
            methods.entry(method.name.to_lowercase()).or_insert(method.name);
        }

        let name = instance.type_name();
        debug!(command = name, methods = methods.len(), "created command");
        Ok(Self {
            name,
            instance,
            methods,
            bound: Vec::new(),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn instance(&self) -> &dyn Reflect {
        &*self.instance
    }

    /// Case-insensitive comparison against the record's type name.
    pub fn matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    /// Registers a flag for every public field not annotated `"-"`.
    ///
    /// Stops at the first field with an unsupported type. Flags registered
    /// before that field stay in `flags`.
    pub fn bind_flags(&mut self, options: &Options, flags: &mut FlagSet) -> Result<()> {
        for field in self.instance.fields() {
            if !field.public {
                trace!(command = self.name, field = field.name, "skipping private field");
                continue;
            }
            if field.is_excluded() {
                trace!(command = self.name, field = field.name, "skipping excluded field");
                continue;
            }

            let flag_name = if options.namespaced {
                format!("{}.{}", self.name, field.name).to_lowercase()
            } else {
                field.name.to_lowercase()
            };

            if !field.ty.is_supported() {
                return Err(CommanderError::UnsupportedFieldType {
                    field: field.name.to_string(),
                    type_name: field.ty.type_name(),
                });
            }
            let Some(default) = self.instance.field(field.name) else {
                return Err(CommanderError::UnsupportedFieldType {
                    field: field.name.to_string(),
                    type_name: field.ty.type_name(),
                });
            };

            flags.register(FlagBinding {
                name: flag_name.clone(),
                ty: field.ty,
                default,
                help: field.help().to_string(),
            })?;
            self.bound.push((flag_name, field.name, field.ty));
        }
        Ok(())
    }

    /// Writes parsed flag values into the bound fields.
    pub fn apply(&mut self, parsed: &ParsedArgs) {
        for (flag, field, ty) in &self.bound {
            if let Some(value) = parsed.value(flag, *ty)
                && !self.instance.set_field(field, value)
            {
                debug!(command = self.name, field, "field rejected parsed value");
            }
        }
    }

    /// Runs the public zero-argument method whose name matches
    /// case-insensitively.
    pub fn exec(&mut self, method: &str) -> Result<()> {
        let declared = self
            .methods
            .get(&method.to_lowercase())
            .copied()
            .ok_or_else(|| CommanderError::MethodNotFound(method.to_string()))?;

        debug!(command = self.name, method = declared, "dispatching");
        if self.instance.call(declared) {
            Ok(())
        } else {
            Err(CommanderError::MethodNotFound(method.to_string()))
        }
    }
}
