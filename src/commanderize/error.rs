use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommanderError {
    #[error("Type {type_name} is not a struct.")]
    NotARecord { type_name: &'static str },

    #[error("Unsupported type: {field} of type {type_name} cannot be parsed as flag.")]
    UnsupportedFieldType {
        field: String,
        type_name: &'static str,
    },

    #[error("Flag redefined: {0}")]
    FlagRedefined(String),

    #[error("Usage: <struct>:<method> (No command given.)")]
    MissingCommandArgument,

    #[error("Usage: <struct>:<method> (Got: {0})")]
    MalformedCommandToken(String),

    #[error("Command <{0}> not found.")]
    CommandNotFound(String),

    #[error("Method <{0}> not found.")]
    MethodNotFound(String),

    #[error(transparent)]
    Flags(#[from] clap::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Rejected duration flag value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid duration {0:?}")]
pub struct InvalidDuration(pub String);

pub type Result<T> = std::result::Result<T, CommanderError>;
