use core::fmt;

/// Result alias for `commune`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by community-detection entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input graph had no vertices.
    EmptyInput,

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "empty input provided"),
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
        }
    }
}

impl std::error::Error for Error {}
