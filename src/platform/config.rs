// log-follow - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::model::{CatchupPolicy, LogSource};
use crate::util::constants;
use crate::util::error::{ConfigError, EnvironmentError};
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Resolved platform paths for log-follow configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/log-follow/ or %APPDATA%\log-follow\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            Self { config_dir }
        } else {
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml shape
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[tail]` section.
    pub tail: TailSection,
    /// `[ui]` section.
    pub ui: UiSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
    /// `[environments.<name>]` tables.
    pub environments: BTreeMap<String, EnvironmentSection>,
}

/// `[tail]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct TailSection {
    /// Poll interval per source in ms.
    pub poll_interval_ms: Option<u64>,
    /// "lines" or "bytes".
    pub catchup_mode: Option<String>,
    /// Trailing lines shown at startup (line mode).
    pub catchup_lines: Option<usize>,
    /// Trailing bytes shown at startup (byte mode).
    pub catchup_bytes: Option<u64>,
    /// Per-source line cap (0 = unbounded).
    pub max_lines: Option<usize>,
    /// Per-poll read budget in bytes.
    pub max_read_bytes_per_poll: Option<usize>,
}

/// `[ui]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Theme: "dark" or "light".
    pub theme: Option<String>,
    /// Body font size in points.
    pub font_size: Option<f32>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// `[environments.<name>]` table.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct EnvironmentSection {
    pub sources: Vec<LogSource>,
}

// =============================================================================
// Validated configuration
// =============================================================================

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Tail --
    pub poll_interval_ms: u64,
    pub catchup: CatchupPolicy,
    pub max_lines: usize,
    pub max_read_bytes_per_poll: usize,

    // -- UI --
    pub dark_mode: bool,
    pub font_size: f32,

    // -- Logging --
    pub log_level: Option<String>,

    // -- Environments --
    pub environments: BTreeMap<String, Vec<LogSource>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: constants::TAIL_POLL_INTERVAL_MS,
            catchup: CatchupPolicy::default(),
            max_lines: constants::DEFAULT_MAX_LINES,
            max_read_bytes_per_poll: constants::MAX_TAIL_READ_BYTES_PER_POLL,
            dark_mode: true,
            font_size: constants::DEFAULT_FONT_SIZE,
            log_level: None,
            environments: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Resolve the sources to follow.
    ///
    /// `extra` sources (from the command line) are appended to the named
    /// environment. When `extra` is non-empty an unknown environment name is
    /// not an error: the ad-hoc sources alone are followed.
    pub fn resolve_sources(
        &self,
        environment: &str,
        extra: &[LogSource],
    ) -> Result<Vec<LogSource>, EnvironmentError> {
        let mut sources = match self.environments.get(environment) {
            Some(list) => list.clone(),
            None if !extra.is_empty() => Vec::new(),
            None => {
                return Err(EnvironmentError::UnknownEnvironment {
                    name: environment.to_string(),
                    available: self.environments.keys().cloned().collect(),
                })
            }
        };
        sources.extend(extra.iter().cloned());

        if sources.is_empty() {
            return Err(EnvironmentError::NoSources {
                name: environment.to_string(),
            });
        }
        Ok(sources)
    }
}

/// Load and validate a config file.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// A missing file yields defaults with no warnings (first run).
/// An unreadable or unparseable file yields defaults with one warning.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(source) => {
            let err = ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            };
            return (AppConfig::default(), vec![format!("{err}. Using defaults.")]);
        }
    };

    match parse_config(&content, config_path) {
        Ok((config, warnings)) => {
            tracing::info!(path = %config_path.display(), "Loaded config.toml");
            (config, warnings)
        }
        Err(err) => (
            AppConfig::default(),
            vec![format!(
                "{err}. Using defaults. See config.example.toml for the expected format."
            )],
        ),
    }
}

/// Parse and validate config.toml content.
///
/// Each out-of-range field is reported and left at its default; the rest of
/// the file still applies.
pub fn parse_config(content: &str, path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let raw: RawConfig = toml::from_str(content).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut warnings: Vec<String> = Vec::new();
    let mut config = AppConfig::default();

    let mut out_of_range = |field: &str, value: String, expected: String, default: String| {
        let err = ConfigError::ValueOutOfRange {
            field: field.to_string(),
            value,
            expected,
        };
        warnings.push(format!("{err}. Using default ({default})."));
    };

    // -- Tail: poll_interval_ms --
    if let Some(ms) = raw.tail.poll_interval_ms {
        if (constants::MIN_TAIL_POLL_INTERVAL_MS..=constants::MAX_TAIL_POLL_INTERVAL_MS)
            .contains(&ms)
        {
            config.poll_interval_ms = ms;
        } else {
            out_of_range(
                "tail.poll_interval_ms",
                ms.to_string(),
                format!(
                    "{}-{}",
                    constants::MIN_TAIL_POLL_INTERVAL_MS,
                    constants::MAX_TAIL_POLL_INTERVAL_MS
                ),
                constants::TAIL_POLL_INTERVAL_MS.to_string(),
            );
        }
    }

    // -- Tail: catch-up window sizes --
    let mut catchup_lines = constants::DEFAULT_CATCHUP_LINES;
    if let Some(lines) = raw.tail.catchup_lines {
        if lines <= constants::MAX_CATCHUP_LINES {
            catchup_lines = lines;
        } else {
            out_of_range(
                "tail.catchup_lines",
                lines.to_string(),
                format!("0-{}", constants::MAX_CATCHUP_LINES),
                constants::DEFAULT_CATCHUP_LINES.to_string(),
            );
        }
    }

    let mut catchup_bytes = constants::DEFAULT_CATCHUP_BYTES;
    if let Some(bytes) = raw.tail.catchup_bytes {
        if bytes <= constants::MAX_CATCHUP_BYTES {
            catchup_bytes = bytes;
        } else {
            out_of_range(
                "tail.catchup_bytes",
                bytes.to_string(),
                format!("0-{}", constants::MAX_CATCHUP_BYTES),
                constants::DEFAULT_CATCHUP_BYTES.to_string(),
            );
        }
    }

    // -- Tail: catchup_mode --
    config.catchup = match raw.tail.catchup_mode.as_deref().map(str::to_lowercase) {
        None => CatchupPolicy::Lines(catchup_lines),
        Some(mode) if mode == "lines" => CatchupPolicy::Lines(catchup_lines),
        Some(mode) if mode == "bytes" => CatchupPolicy::Bytes(catchup_bytes),
        Some(other) => {
            out_of_range(
                "tail.catchup_mode",
                other,
                "\"lines\" or \"bytes\"".to_string(),
                "lines".to_string(),
            );
            CatchupPolicy::Lines(catchup_lines)
        }
    };

    // -- Tail: max_lines --
    if let Some(max) = raw.tail.max_lines {
        if max <= constants::ABSOLUTE_MAX_LINES {
            config.max_lines = max;
        } else {
            out_of_range(
                "tail.max_lines",
                max.to_string(),
                format!("0-{} (0 = unbounded)", constants::ABSOLUTE_MAX_LINES),
                constants::DEFAULT_MAX_LINES.to_string(),
            );
        }
    }

    // -- Tail: max_read_bytes_per_poll --
    if let Some(bytes) = raw.tail.max_read_bytes_per_poll {
        if (constants::MIN_TAIL_READ_BYTES_PER_POLL
            ..=constants::ABSOLUTE_MAX_TAIL_READ_BYTES_PER_POLL)
            .contains(&bytes)
        {
            config.max_read_bytes_per_poll = bytes;
        } else {
            out_of_range(
                "tail.max_read_bytes_per_poll",
                bytes.to_string(),
                format!(
                    "{}-{}",
                    constants::MIN_TAIL_READ_BYTES_PER_POLL,
                    constants::ABSOLUTE_MAX_TAIL_READ_BYTES_PER_POLL
                ),
                constants::MAX_TAIL_READ_BYTES_PER_POLL.to_string(),
            );
        }
    }

    // -- UI: theme --
    if let Some(ref theme) = raw.ui.theme {
        match theme.to_lowercase().as_str() {
            "dark" => config.dark_mode = true,
            "light" => config.dark_mode = false,
            other => out_of_range(
                "ui.theme",
                other.to_string(),
                "\"dark\" or \"light\"".to_string(),
                "dark".to_string(),
            ),
        }
    }

    // -- UI: font_size --
    if let Some(size) = raw.ui.font_size {
        if (constants::MIN_FONT_SIZE..=constants::MAX_FONT_SIZE).contains(&size) {
            config.font_size = size;
        } else {
            out_of_range(
                "ui.font_size",
                size.to_string(),
                format!("{}-{}", constants::MIN_FONT_SIZE, constants::MAX_FONT_SIZE),
                constants::DEFAULT_FONT_SIZE.to_string(),
            );
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            out_of_range(
                "logging.level",
                level.clone(),
                "error, warn, info, debug, trace".to_string(),
                constants::DEFAULT_LOG_LEVEL.to_string(),
            );
        }
    }

    // -- Environments --
    config.environments = raw
        .environments
        .into_iter()
        .map(|(name, section)| (name, section.sources))
        .collect();

    Ok((config, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[tail]
poll_interval_ms = 50
catchup_mode = "bytes"
catchup_bytes = 4096
max_lines = 10000

[ui]
theme = "light"

[logging]
level = "DEBUG"

[environments.prod]
sources = [
    { title = "FileWatcher", path = "//host/c$/Logs/FileWatcher.log" },
    { title = "LiveIngest", path = "//host/c$/Logs/LiveIngest.log" },
]

[environments.test]
sources = [{ title = "local", path = "test1.log" }]
"#;

    fn parse(content: &str) -> (AppConfig, Vec<String>) {
        parse_config(content, Path::new("config.toml")).unwrap()
    }

    #[test]
    fn test_parse_full_sample() {
        let (config, warnings) = parse(SAMPLE);
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.poll_interval_ms, 50);
        assert_eq!(config.catchup, CatchupPolicy::Bytes(4096));
        assert_eq!(config.max_lines, 10_000);
        assert!(!config.dark_mode);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.environments["prod"].len(), 2);
        assert_eq!(config.environments["prod"][1].title, "LiveIngest");
    }

    #[test]
    fn test_empty_config_is_default() {
        let (config, warnings) = parse("");
        assert!(warnings.is_empty());
        assert_eq!(config.catchup, CatchupPolicy::Lines(100));
        assert_eq!(config.poll_interval_ms, constants::TAIL_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_out_of_range_values_warn_and_fall_back() {
        let (config, warnings) = parse(
            r#"
[tail]
poll_interval_ms = 1
catchup_mode = "sideways"
catchup_lines = 25

[ui]
font_size = 100.0
"#,
        );
        assert_eq!(warnings.len(), 3, "{warnings:?}");
        assert_eq!(config.poll_interval_ms, constants::TAIL_POLL_INTERVAL_MS);
        assert_eq!(config.catchup, CatchupPolicy::Lines(25));
        assert_eq!(config.font_size, constants::DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let result = parse_config("[tail", Path::new("bad.toml"));
        assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let (config, warnings) = load_config(Path::new("/no/such/dir/config.toml"));
        assert!(warnings.is_empty());
        assert!(config.environments.is_empty());
    }

    #[test]
    fn test_resolve_sources() {
        let (config, _) = parse(SAMPLE);
        let extra = [LogSource::new("adhoc", "x.log")];

        assert_eq!(config.resolve_sources("prod", &[]).unwrap().len(), 2);
        let with_extra = config.resolve_sources("prod", &extra).unwrap();
        assert_eq!(with_extra.last().unwrap().title, "adhoc");

        // Unknown environment with ad-hoc sources: follow just those.
        assert_eq!(config.resolve_sources("dev", &extra).unwrap().len(), 1);

        match config.resolve_sources("dev", &[]) {
            Err(EnvironmentError::UnknownEnvironment { name, available }) => {
                assert_eq!(name, "dev");
                assert_eq!(available, vec!["prod".to_string(), "test".to_string()]);
            }
            other => panic!("expected UnknownEnvironment, got {other:?}"),
        }
    }

    #[test]
    fn test_environment_without_sources_is_an_error() {
        let (config, _) = parse("[environments.empty]\nsources = []\n");
        assert!(matches!(
            config.resolve_sources("empty", &[]),
            Err(EnvironmentError::NoSources { .. })
        ));
    }
}
