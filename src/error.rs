use std::io;
use std::path::PathBuf;

/// Errors produced while parsing, editing or persisting configuration lines
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A single line was given text that spans several lines
    #[error("line must not contain a newline: {0:?}")]
    InvalidInput(String),
    /// `remove_prefix` was called with a prefix that is not in the text
    #[error("prefix {prefix:?} not found in {text:?}")]
    PrefixNotFound { text: String, prefix: String },
    /// `remove_suffix` was called with a suffix that is not in the text
    #[error("suffix {suffix:?} not found in {text:?}")]
    SuffixNotFound { text: String, suffix: String },
    /// The file was built from literal text and no filename was assigned
    #[error("no filename set")]
    MissingFilename,
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A Latin-1 file was given text it has no byte for
    #[error("{path}: {ch:?} can not be written as Latin-1")]
    Unencodable { path: PathBuf, ch: char },
    /// A `KEY=VALUE` argument without a recognizable operator
    #[error("no assignment found in {0:?}")]
    InvalidAssignment(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
