//! Error types.

use std::io;

use crate::parser::error::ParseError;

pub type Result<T> = core::result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::IoError(e.to_string())
    }
}

/// Crate-wide error type.
///
/// Problems found in analyzed scripts are not errors, they are reported
/// as [`Diagnostic`]s.
///
/// [`Diagnostic`]: crate::diagnostic::Diagnostic
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    IoError(String),

    #[cfg(feature = "yaml")]
    #[error("yaml deserialization error: {0}")]
    YamlDeserError(#[from] serde_yaml::Error),
    #[error("toml deserialization error: {0}")]
    TomlDeserError(#[from] toml::de::Error),

    #[error("parsing error: {0}")]
    ParsingError(#[from] ParseError),

    #[error("invalid value type: {0}")]
    InvalidValueType(String),
    #[error("invalid expression: {0}")]
    InvalidExpression(String),
    #[error("unsupported file format: {0}")]
    UnsupportedFileFormat(String),
}
