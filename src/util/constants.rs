// log-follow - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Every bound on a growing collection or a polling cadence lives here.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "log-follow";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "log-follow";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment selected when no target is given on the command line.
pub const DEFAULT_ENVIRONMENT: &str = "prod";

// =============================================================================
// Catch-up
// =============================================================================

/// Number of trailing lines re-delivered when a source is first opened
/// under the line-count catch-up policy.
pub const DEFAULT_CATCHUP_LINES: usize = 100;

/// Hard upper bound on the configurable line-count catch-up window.
pub const MAX_CATCHUP_LINES: usize = 100_000;

/// Byte budget for the byte-offset catch-up policy: the cursor is placed
/// this many bytes before the end of the file.
pub const DEFAULT_CATCHUP_BYTES: u64 = 2_048;

/// Hard upper bound on the configurable byte-offset catch-up window.
pub const MAX_CATCHUP_BYTES: u64 = 16 * 1_024 * 1_024; // 16 MiB

// =============================================================================
// Live tail
// =============================================================================

/// How often each worker polls its source for new lines (ms).
///
/// An empty poll costs one short read attempt, so this is set close to
/// the display refresh rate.
pub const TAIL_POLL_INTERVAL_MS: u64 = 16;

/// Minimum user-configurable poll interval (ms).
pub const MIN_TAIL_POLL_INTERVAL_MS: u64 = 5;

/// Maximum user-configurable poll interval (ms).
pub const MAX_TAIL_POLL_INTERVAL_MS: u64 = 10_000; // 10 s

/// How often the cancel flag is checked while a worker sleeps (ms).
pub const TAIL_CANCEL_CHECK_INTERVAL_MS: u64 = 10;

/// Maximum bytes of complete records consumed from one source in one poll.
/// The remainder is picked up by the next poll.
pub const MAX_TAIL_READ_BYTES_PER_POLL: usize = 512 * 1_024; // 512 KiB

/// Lower bound on the configurable per-poll read budget.
pub const MIN_TAIL_READ_BYTES_PER_POLL: usize = 4 * 1_024;

/// Upper bound on the configurable per-poll read budget.
pub const ABSOLUTE_MAX_TAIL_READ_BYTES_PER_POLL: usize = 16 * 1_024 * 1_024;

/// Longest record kept while waiting for its newline. A fragment that grows
/// past this is delivered as-is and the rest of the record starts a new line.
pub const MAX_RECORD_BYTES: usize = 1_024 * 1_024; // 1 MiB

/// First delay before re-trying to open a source that could not be opened.
pub const OPEN_RETRY_INITIAL_MS: u64 = 1_000;

/// Ceiling for the exponential open-retry backoff.
pub const OPEN_RETRY_MAX_MS: u64 = 30_000;

// =============================================================================
// Buffers
// =============================================================================

/// Default per-source line cap. Zero means unbounded retention.
pub const DEFAULT_MAX_LINES: usize = 0;

/// Hard upper bound on a configured per-source line cap.
pub const ABSOLUTE_MAX_LINES: usize = 5_000_000;

/// Maximum number of non-fatal warnings kept for display. Oldest are dropped.
pub const MAX_WARNINGS: usize = 100;

/// Maximum number of worker messages applied by the render thread per frame.
/// Remaining messages stay queued for the next frame.
pub const MAX_TAIL_MESSAGES_PER_FRAME: usize = 200;

// =============================================================================
// UI defaults
// =============================================================================

/// Default body font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 13.0;

/// Minimum user-configurable font size (points).
pub const MIN_FONT_SIZE: f32 = 8.0;

/// Maximum user-configurable font size (points).
pub const MAX_FONT_SIZE: f32 = 24.0;

/// Highest source index reachable with a single digit key.
pub const MAX_FOCUS_DIGIT: u8 = 9;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a log line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
