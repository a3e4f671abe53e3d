//! Errors raised while resolving configuration

use std::io;
use std::path::PathBuf;
use std::result;

use thiserror::Error;

/// Every failure that aborts configuration resolution.
///
/// A config file that simply is not found during the search is not an error;
/// it shows up as an absent file source instead.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but its content is malformed
    #[error("failed to parse config file '{path}': {details}")]
    Parse {
        /// File that failed to parse
        path: PathBuf,
        /// Parser message
        details: String,
    },

    /// Filesystem access failed
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// Path being read or created
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// No home directory to search for a user-level config file
    #[error("cannot determine the home directory to search for a config file")]
    HomeDirUnavailable,

    /// Explicit config path with an extension no parser handles
    #[error("unsupported config file extension '.{extension}' for '{path}'")]
    UnsupportedFormat {
        /// File passed on the command line
        path: PathBuf,
        /// Extension as written (may be empty)
        extension: String,
    },

    /// Compiled defaults could not be serialized
    #[error("failed to serialize default configuration: {0}")]
    Serialize(String),

    /// A source value cannot be stored in a flag of that type
    #[error("invalid value {value:?} for flag '--{flag}': expected {expected}")]
    TypeMismatch {
        /// Flag long name
        flag: String,
        /// Offending value as found in the source
        value: String,
        /// Flag type
        expected: &'static str,
    },

    /// A field could not be decoded from the layered value set
    #[error("cannot decode config field '{field}': expected {expected}, got {actual}")]
    Decode {
        /// Config key
        field: String,
        /// What the field accepts
        expected: String,
        /// Offending value
        actual: String,
    },
}

/// A specialized `Result` for configuration resolution.
pub type Result<T> = result::Result<T, ConfigError>;

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConfigError::Io { path: path.into(), source }
    }

    pub fn parse(path: impl Into<PathBuf>, details: impl std::fmt::Display) -> Self {
        ConfigError::Parse { path: path.into(), details: details.to_string() }
    }
}
