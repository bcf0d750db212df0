//! # Flag Values
//!
//! The fixed set of field types a record may bind to a flag, and the values
//! that travel between a record field and the flag registry.
//!
//! | Rust type   | [`FieldType`]          | flag syntax                  |
//! |-------------|------------------------|------------------------------|
//! | `bool`      | `FieldType::Bool`      | `-name`, `-name=false`       |
//! | `i32`/`i64` | `FieldType::I32`/`I64` | `-name=-42`                  |
//! | `u32`/`u64` | `FieldType::U32`/`U64` | `-name=42`                   |
//! | `f64`       | `FieldType::F64`       | `-name=10.5`                 |
//! | `String`    | `FieldType::Str`       | `-name=text`                 |
//! | `Duration`  | `FieldType::Duration`  | `-name=1h30m`, `-name=250ms` |
//!
//! Anything else is `FieldType::Unsupported` and fails binding at runtime.
//!
//! Durations use the interval syntax of Go's `time.ParseDuration`: a sequence
//! of decimal numbers, each with an optional fraction and a mandatory unit
//! (`ns`, `us`/`µs`, `ms`, `s`, `m`, `h`). The bare string `0` is also accepted.

use crate::error::InvalidDuration;
use std::fmt;
use std::time::Duration;

/// Declared type of a record field, as seen by the flag binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    I32,
    I64,
    U32,
    U64,
    F64,
    Str,
    Duration,
    /// Carries the declared type as written in the struct.
    Unsupported(&'static str),
}

impl FieldType {
    pub fn is_supported(&self) -> bool {
        !matches!(self, FieldType::Unsupported(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::I32 => "i32",
            FieldType::I64 => "i64",
            FieldType::U32 => "u32",
            FieldType::U64 => "u64",
            FieldType::F64 => "f64",
            FieldType::Str => "String",
            FieldType::Duration => "Duration",
            FieldType::Unsupported(name) => name,
        }
    }
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F64(f64),
    Str(String),
    Duration(Duration),
}

impl Value {
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Bool(_) => FieldType::Bool,
            Value::I32(_) => FieldType::I32,
            Value::I64(_) => FieldType::I64,
            Value::U32(_) => FieldType::U32,
            Value::U64(_) => FieldType::U64,
            Value::F64(_) => FieldType::F64,
            Value::Str(_) => FieldType::Str,
            Value::Duration(_) => FieldType::Duration,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
            Value::Duration(v) => write!(f, "{}", format_duration(*v)),
        }
    }
}

/// A Rust type that can back a flag.
///
/// Implemented for exactly the supported field types. Code generated by
/// `#[derive(Record)]` goes through this trait to read and write fields.
///
/// A field whose type is named like a supported one but is a different type
/// is rejected at compile time:
///
/// ```compile_fail
/// use commanderize::{Behaviors, Record};
///
/// mod other {
///     #[derive(Default)]
///     pub struct Duration;
/// }
///
/// #[derive(Record)]
/// pub struct Timer {
///     pub wait: other::Duration,
/// }
///
/// impl Behaviors for Timer {}
/// ```
pub trait FlagType: Sized {
    const TYPE: FieldType;

    fn to_value(&self) -> Value;

    /// Returns `None` when `value` holds a different type.
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! flag_type {
    ($ty:ty, $variant:ident) => {
        impl FlagType for $ty {
            const TYPE: FieldType = FieldType::$variant;

            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

flag_type!(bool, Bool);
flag_type!(i32, I32);
flag_type!(i64, I64);
flag_type!(u32, U32);
flag_type!(u64, U64);
flag_type!(f64, F64);
flag_type!(String, Str);
flag_type!(Duration, Duration);

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}

/// Parses an interval such as `5s`, `1h30m` or `1.5ms`.
pub fn parse_duration(input: &str) -> Result<Duration, InvalidDuration> {
    let invalid = || InvalidDuration(input.to_string());

    let s = input.strip_prefix('+').unwrap_or(input);
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    let mut rest = s;
    while !rest.is_empty() {
        let int_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (int_part, after_int) = rest.split_at(int_len);

        let (frac_part, after_num) = match after_int.strip_prefix('.') {
            Some(after_dot) => {
                let frac_len = after_dot
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(after_dot.len());
                after_dot.split_at(frac_len)
            }
            None => ("", after_int),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }

        let unit_len = after_num
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_num.len());
        let (unit, remaining) = after_num.split_at(unit_len);
        let scale = unit_nanos(unit).ok_or_else(invalid)?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(invalid)?;

        // Digits past nanosecond precision of the largest unit cannot matter.
        let frac_digits = &frac_part[..frac_part.len().min(18)];
        if !frac_digits.is_empty() {
            let frac: u128 = frac_digits.parse().map_err(|_| invalid())?;
            let denom = 10u128.pow(frac_digits.len() as u32);
            nanos = nanos
                .checked_add(frac * scale / denom)
                .ok_or_else(invalid)?;
        }

        total = total.checked_add(nanos).ok_or_else(invalid)?;
        rest = remaining;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| invalid())?;
    let subsec = u32::try_from(total % NANOS_PER_SEC).map_err(|_| invalid())?;
    Ok(Duration::new(secs, subsec))
}

/// Renders a duration the way [`parse_duration`] reads it, e.g. `1h2m3.5s`.
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_MICRO {
        return format!("{}ns", nanos);
    }
    if nanos < NANOS_PER_MILLI {
        return format!("{}µs", decimal(nanos, NANOS_PER_MICRO));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", decimal(nanos, NANOS_PER_MILLI));
    }

    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = decimal(
        u128::from(total_secs % 60) * NANOS_PER_SEC + u128::from(duration.subsec_nanos()),
        NANOS_PER_SEC,
    );

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

fn decimal(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let frac = value % unit;
    if frac == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let digits = format!("{:0width$}", frac, width = width);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}
