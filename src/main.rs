// log-follow - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation
// 3. Source resolution (named environment + ad-hoc --source entries)
// 4. eframe dashboard launch

mod gui;

// Re-export modules from the library crate so that `gui.rs` can keep using
// `crate::app::...`, `crate::core::...` etc.
pub use log_follow::app;
pub use log_follow::core;
pub use log_follow::platform;
pub use log_follow::ui;
pub use log_follow::util;

use crate::app::tail::TailConfig;
use crate::core::model::{CatchupPolicy, LogSource};
use crate::platform::config::AppConfig;
use crate::util::constants;
use crate::util::error::EnvironmentError;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// log-follow - watch several live log files side by side.
///
/// Press 1-9 to show one log full screen, 0 to return to the split view,
/// q to quit.
#[derive(Parser, Debug)]
#[command(name = "log-follow", version, about)]
struct Cli {
    /// Environment whose logs to follow, as named under [environments] in config.toml.
    #[arg(default_value = constants::DEFAULT_ENVIRONMENT)]
    target: String,

    /// Additional source to follow (repeatable).
    #[arg(short = 's', long = "source", value_name = "TITLE=PATH")]
    sources: Vec<String>,

    /// Config file to use instead of the platform default.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Start each source this many lines from its end.
    #[arg(long = "catchup-lines", conflicts_with = "catchup_bytes")]
    catchup_lines: Option<usize>,

    /// Start each source this many bytes from its end (first line may be partial).
    #[arg(long = "catchup-bytes")]
    catchup_bytes: Option<u64>,

    /// Poll interval per source, in milliseconds.
    #[arg(long = "poll-ms")]
    poll_ms: Option<u64>,

    /// Keep at most this many lines per source (0 = unbounded).
    #[arg(long = "max-lines")]
    max_lines: Option<usize>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

/// Environment sources plus any `--source TITLE=PATH` entries.
fn resolve_sources(cli: &Cli, config: &AppConfig) -> Result<Vec<LogSource>, EnvironmentError> {
    let extra = cli
        .sources
        .iter()
        .map(|spec| {
            LogSource::parse_spec(spec)
                .ok_or_else(|| EnvironmentError::InvalidSourceSpec { spec: spec.clone() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    config.resolve_sources(&cli.target, &extra)
}

/// Worker settings: CLI flags override config.toml values, then clamp.
fn build_tail_config(cli: &Cli, config: &AppConfig) -> TailConfig {
    let poll_ms = cli
        .poll_ms
        .unwrap_or(config.poll_interval_ms)
        .clamp(constants::MIN_TAIL_POLL_INTERVAL_MS, constants::MAX_TAIL_POLL_INTERVAL_MS);

    // Either catch-up flag picks its mode, whatever config.toml selected.
    let catchup = match (cli.catchup_lines, cli.catchup_bytes) {
        (_, Some(bytes)) => CatchupPolicy::Bytes(bytes.min(constants::MAX_CATCHUP_BYTES)),
        (Some(lines), None) => CatchupPolicy::Lines(lines.min(constants::MAX_CATCHUP_LINES)),
        (None, None) => config.catchup,
    };

    TailConfig {
        poll_interval: Duration::from_millis(poll_ms),
        catchup,
        max_read_bytes_per_poll: config.max_read_bytes_per_poll,
    }
}

/// Per-source line cap: `--max-lines` over config.toml, clamped.
fn effective_max_lines(cli: &Cli, config: &AppConfig) -> usize {
    cli.max_lines
        .unwrap_or(config.max_lines)
        .min(constants::ABSOLUTE_MAX_LINES)
}

fn main() {
    let cli = Cli::parse();

    // Config is read before logging starts so its [logging] level applies;
    // warnings are collected and emitted once the subscriber is up.
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| crate::platform::config::PlatformPaths::resolve().config_file());
    let (config, config_warnings) = crate::platform::config::load_config(&config_path);

    crate::util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        environment = %cli.target,
        "log-follow starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    let sources = match resolve_sources(&cli, &config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Cannot resolve sources");
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    let tail_config = build_tail_config(&cli, &config);
    let max_lines = effective_max_lines(&cli, &config);

    for source in &sources {
        tracing::info!(title = %source.title, path = %source.path.display(), "Following");
    }

    let mut state = crate::app::state::AppState::new(cli.target.clone(), sources, max_lines);
    state.dark_mode = config.dark_mode;
    state.font_size = config.font_size;
    for warning in config_warnings {
        state.push_warning(warning);
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(state.window_title())
            .with_inner_size(crate::ui::theme::WINDOW_SIZE)
            .with_min_inner_size(crate::ui::theme::MIN_WINDOW_SIZE),
        ..Default::default()
    };

    let dark_mode = config.dark_mode;
    let result = eframe::run_native(
        constants::APP_NAME,
        native_options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(if dark_mode {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            });
            Ok(Box::new(gui::LogFollowApp::new(state, &tail_config)))
        }),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch dashboard");
        eprintln!("Error: failed to launch log-follow: {e}");
        std::process::exit(1);
    }
}
