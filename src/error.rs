use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The source could not be opened or read, or the destination could not be written.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read desktop entry data")]
    Read(#[source] io::Error),

    #[error("parse error on line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },

    #[error("unknown section: [{0}]")]
    UnknownSection(String),

    #[error("cannot convert {value:?} to {target}")]
    BadLexicalCast { value: String, target: &'static str },

    #[error("desktop file has no path to save to")]
    MissingPath,

    /// The key would not be read back as the same key.
    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    #[error("invalid section name: {0:?}")]
    InvalidSectionName(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(line: usize, kind: ParseErrorKind) -> Self {
        Self::Parse { line, kind }
    }
}

/// Grammar violations detected by the reader.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("section header must be a single `[name]`")]
    MalformedSectionHeader,
    #[error("entry appears before any section header")]
    EntryOutsideSection,
    #[error("missing `=` delimiter")]
    MissingDelimiter,
    #[error("key cannot be empty")]
    EmptyKey,
    #[error("key has a malformed locale suffix")]
    MalformedLocaleKey,
}
