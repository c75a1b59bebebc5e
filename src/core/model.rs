// log-follow - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// =============================================================================
// Log source
// =============================================================================

/// Index of a source within the dashboard's ordered source list.
pub type SourceId = usize;

/// A followed log file: display title plus filesystem location.
///
/// Immutable once constructed; the title is what the panel header shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSource {
    /// Display label for the panel.
    pub title: String,
    /// Location of the append-only log file.
    pub path: PathBuf,
}

impl LogSource {
    pub fn new(title: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
        }
    }

    /// Parse a `TITLE=PATH` command-line source spec.
    ///
    /// The first `=` separates title from path, so paths may themselves
    /// contain `=`. Returns `None` when either half is empty.
    pub fn parse_spec(spec: &str) -> Option<Self> {
        let (title, path) = spec.split_once('=')?;
        let title = title.trim();
        let path = path.trim();
        if title.is_empty() || path.is_empty() {
            return None;
        }
        Some(Self::new(title, path))
    }
}

// =============================================================================
// Catch-up policy
// =============================================================================

/// How a freshly opened cursor is positioned near the end of its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchupPolicy {
    /// Scan every line ending once and start at the N-th line from the end.
    /// Files with N lines or fewer are delivered in full.
    Lines(usize),

    /// Seek to `max(0, size - N)` bytes. The first record delivered may be a
    /// fragment of a longer line; this is accepted, not corrected.
    Bytes(u64),
}

impl Default for CatchupPolicy {
    fn default() -> Self {
        Self::Lines(crate::util::constants::DEFAULT_CATCHUP_LINES)
    }
}

impl std::fmt::Display for CatchupPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lines(n) => write!(f, "last {n} lines"),
            Self::Bytes(n) => write!(f, "last {n} bytes"),
        }
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Normalised severity of a formatted line, used only for colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
    #[default]
    Unknown,
}

impl Severity {
    /// Map a raw level word (`ERROR`, `WARN`, ...) to a severity.
    pub fn from_level(level: &str) -> Self {
        match level {
            "FATAL" | "CRITICAL" | "CRIT" => Self::Critical,
            "ERROR" | "ERR" => Self::Error,
            "WARN" | "WARNING" => Self::Warning,
            "INFO" | "NOTICE" => Self::Info,
            "DEBUG" | "TRACE" | "VERBOSE" => Self::Debug,
            _ => Self::Unknown,
        }
    }
}

// =============================================================================
// Tail progress (worker -> render thread)
// =============================================================================

/// Messages sent from a source's worker thread to the render thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailProgress {
    /// Catch-up positioning finished; the cursor now reads from `offset`.
    Ready { source: SourceId, offset: u64 },

    /// One poll produced these formatted lines, in file order.
    /// Applied to the source's buffer as a single batch.
    NewLines {
        source: SourceId,
        lines: Vec<String>,
    },

    /// A non-fatal I/O problem. Reported once per failure episode.
    SourceError { source: SourceId, message: String },

    /// The worker exited (cancelled or its receiver went away).
    Stopped { source: SourceId },
}
