// log-follow - util/error.rs
//
// Typed errors, one enum per concern, with context-preserving error chains.
// No string-based error propagation; every variant keeps its cause so
// diagnostic logging can print the full chain.

use std::fmt;
use std::io;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Source errors
// ---------------------------------------------------------------------------

/// Errors raised while positioning or reading a tailed file.
///
/// None of these are fatal: the worker owning the source logs them and the
/// source simply contributes no lines.
#[derive(Debug)]
pub enum SourceError {
    /// The file could not be opened (missing, permission denied, ...).
    Open { path: PathBuf, source: io::Error },

    /// The one-time catch-up scan over existing content failed.
    Scan { path: PathBuf, source: io::Error },

    /// Seeking to the catch-up position failed.
    Seek {
        path: PathBuf,
        offset: u64,
        source: io::Error,
    },

    /// Reading new records failed.
    Read {
        path: PathBuf,
        offset: u64,
        source: io::Error,
    },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "Cannot open '{}': {source}", path.display())
            }
            Self::Scan { path, source } => {
                write!(f, "Catch-up scan of '{}' failed: {source}", path.display())
            }
            Self::Seek {
                path,
                offset,
                source,
            } => write!(
                f,
                "Cannot seek '{}' to byte {offset}: {source}",
                path.display()
            ),
            Self::Read {
                path,
                offset,
                source,
            } => write!(
                f,
                "Read error on '{}' at byte {offset}: {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. }
            | Self::Scan { source, .. }
            | Self::Seek { source, .. }
            | Self::Read { source, .. } => Some(source),
        }
    }
}


// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}


// ---------------------------------------------------------------------------
// Environment errors
// ---------------------------------------------------------------------------

/// Errors resolving the list of sources to follow.
#[derive(Debug)]
pub enum EnvironmentError {
    /// The named environment is not defined in the configuration.
    UnknownEnvironment {
        name: String,
        available: Vec<String>,
    },

    /// The environment resolved to zero sources.
    NoSources { name: String },

    /// A `--source` argument was not of the form `TITLE=PATH`.
    InvalidSourceSpec { spec: String },
}

impl fmt::Display for EnvironmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEnvironment { name, available } => {
                if available.is_empty() {
                    write!(
                        f,
                        "Unknown environment '{name}': no environments are configured. \
                         Define [environments.{name}] in config.toml or pass --source TITLE=PATH."
                    )
                } else {
                    write!(
                        f,
                        "Unknown environment '{name}'. Available: {}",
                        available.join(", ")
                    )
                }
            }
            Self::NoSources { name } => {
                write!(f, "Environment '{name}' has no sources to follow")
            }
            Self::InvalidSourceSpec { spec } => {
                write!(f, "Invalid source '{spec}': expected TITLE=PATH")
            }
        }
    }
}

impl std::error::Error for EnvironmentError {}
