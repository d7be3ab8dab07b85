//! Error types for script lines

use std::fmt;

/// Result type alias for script parsing
pub type Result<T> = std::result::Result<T, Error>;

/// Problems with a single script line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Known command with missing, extra or non-integer arguments
    Parse(String),

    /// Command word not recognized
    UnknownCommand(String),

    /// Line is not valid UTF-8
    InvalidUtf8,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(command) => write!(f, "wrong arguments for '{}'", command),
            Error::UnknownCommand(command) => write!(f, "unknown command '{}'", command),
            Error::InvalidUtf8 => write!(f, "invalid UTF-8"),
        }
    }
}

impl std::error::Error for Error {}
