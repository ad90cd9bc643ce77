use std::path::PathBuf;
use thiserror::Error;

use super::record::RecordError;
use super::value::ValueError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("required config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error:{path}:{line}: {kind}")]
    Syntax {
        path: PathBuf,
        line: usize,
        kind: SyntaxErrorKind,
    },

    #[error("config target is not a valid record: {0}")]
    InvalidTarget(#[source] RecordError),

    #[error("error parsing config '{path}': required value {name} not present")]
    MissingField { path: PathBuf, name: String },

    #[error("error parsing config '{path}': field '{field}': {source}")]
    Field {
        path: PathBuf,
        field: String,
        source: ValueError,
    },

    #[error("'{0}' not set in .env or environment")]
    EnvNotSet(String),
}

/// Malformed-line conditions reported by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    /// A key followed by `#` or by the end of the line, with no `=`.
    #[error("unexpected identifier")]
    UnexpectedIdentifier,

    #[error("left side of assignment empty")]
    EmptyKey,
}
