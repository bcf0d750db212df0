//! # Record Introspection
//!
//! Records describe themselves through [`Reflect`] instead of runtime
//! reflection. The table is static: field names, declared types, visibility
//! and annotation strings are fixed when the record is compiled, usually by
//! `#[derive(Record)]` and `#[behaviors]`.
//!
//! Values that are not records (numbers, strings, collections, boxed opaque
//! values) also implement [`Reflect`] so they can be handed to the engine and
//! rejected with a typed error by [`check_is_record`].
//!
//! ## Field annotations
//!
//! Each field may carry one annotation string, written `#[cmd = "..."]`:
//! - `"-"` ([`EXCLUDE`]) keeps the field out of flag binding,
//! - any other string is the flag's help text,
//! - no annotation means empty help text.

use crate::error::{CommanderError, Result};
use crate::value::{FieldType, Value};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Annotation value that excludes a field from flag binding.
pub const EXCLUDE: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Struct with named fields.
    Record,
    Primitive,
    Collection,
    Opaque,
}

/// Declarative description of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: &'static str,
    pub ty: FieldType,
    pub tag: Option<&'static str>,
    pub public: bool,
}

impl FieldInfo {
    pub fn is_excluded(&self) -> bool {
        self.tag == Some(EXCLUDE)
    }

    pub fn help(&self) -> &'static str {
        match self.tag {
            Some(EXCLUDE) | None => "",
            Some(tag) => tag,
        }
    }
}

/// A method declared on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: &'static str,
    pub public: bool,
    /// Arguments besides the receiver.
    pub arity: usize,
}

impl MethodInfo {
    pub fn is_dispatchable(&self) -> bool {
        self.public && self.arity == 0
    }
}

/// Self-description of a value handed to the engine.
pub trait Reflect {
    /// Declared type name, e.g. `Server`.
    fn type_name(&self) -> &'static str;

    fn kind(&self) -> TypeKind;

    /// Fields in declaration order. Empty for anything but records.
    fn fields(&self) -> &'static [FieldInfo] {
        &[]
    }

    /// Current value of a supported field.
    fn field(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Writes a supported field. Returns `false` if the field is unknown or
    /// `value` has the wrong type.
    fn set_field(&mut self, _name: &str, _value: Value) -> bool {
        false
    }

    fn methods(&self) -> &'static [MethodInfo] {
        &[]
    }

    /// Invokes the public zero-argument method with this exact declared name.
    /// Returns `false` if there is no such method.
    fn call(&mut self, _method: &str) -> bool {
        false
    }
}

/// Method table of a record, generated by `#[behaviors]` on its `impl` block.
///
/// A record without dispatchable methods can use the empty default:
/// `impl Behaviors for Config {}`.
///
/// A type has exactly one method table, so its methods cannot be split
/// across two `#[behaviors]` blocks:
///
/// ```compile_fail
/// use commanderize::{Record, behaviors};
///
/// #[derive(Record)]
/// pub struct Split {
///     pub n: u32,
/// }
///
/// #[behaviors]
/// impl Split {
///     pub fn first(&self) {}
/// }
///
/// #[behaviors]
/// impl Split {
///     pub fn second(&self) {}
/// }
/// ```
pub trait Behaviors {
    const METHODS: &'static [MethodInfo] = &[];

    fn call(&mut self, _method: &str) -> bool {
        false
    }
}

/// Fails with `NotARecord` unless `value` is a struct-like record.
pub fn check_is_record(value: &dyn Reflect) -> Result<()> {
    if value.kind() != TypeKind::Record {
        return Err(CommanderError::NotARecord {
            type_name: value.type_name(),
        });
    }
    Ok(())
}

macro_rules! reflect_leaf {
    ($kind:ident: $($ty:ty),+ $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_name(&self) -> &'static str {
                    stringify!($ty)
                }

                fn kind(&self) -> TypeKind {
                    TypeKind::$kind
                }
            }
        )+
    };
}

reflect_leaf!(Primitive: bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
reflect_leaf!(Primitive: String, Duration);
reflect_leaf!(Opaque: Box<dyn Any>);

impl<T> Reflect for Vec<T> {
    fn type_name(&self) -> &'static str {
        "Vec"
    }

    fn kind(&self) -> TypeKind {
        TypeKind::Collection
    }
}

impl<K, V> Reflect for HashMap<K, V> {
    fn type_name(&self) -> &'static str {
        "HashMap"
    }

    fn kind(&self) -> TypeKind {
        TypeKind::Collection
    }
}

impl<K, V> Reflect for BTreeMap<K, V> {
    fn type_name(&self) -> &'static str {
        "BTreeMap"
    }

    fn kind(&self) -> TypeKind {
        TypeKind::Collection
    }
}
