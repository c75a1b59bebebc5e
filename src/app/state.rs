// log-follow - app/state.rs
//
// Application state owned by the render thread: one entry per source
// (buffer, readiness, last error) plus the panel layout.
//
// Worker messages are applied here, on the render thread, so each batch of
// lines lands in its buffer atomically with respect to every reader.

use crate::core::buffer::LogBuffer;
use crate::core::layout::{LayoutMode, PanelLayout};
use crate::core::model::{LogSource, SourceId, TailProgress};
use crate::util::constants::MAX_WARNINGS;
use chrono::{DateTime, Local};

/// Render-side view of one followed source.
#[derive(Debug)]
pub struct SourceState {
    pub source: LogSource,
    pub buffer: LogBuffer,
    /// Catch-up has completed; until then the panel shows a loading hint.
    pub ready: bool,
    /// Most recent I/O problem, cleared when the source becomes ready again.
    pub last_error: Option<String>,
    /// Offset the cursor started reading from after catch-up.
    pub start_offset: Option<u64>,
    /// Wall-clock time the last batch of lines arrived.
    pub last_update: Option<DateTime<Local>>,
    /// Total lines received since startup (including evicted ones).
    pub lines_received: u64,
    /// The worker has exited.
    pub stopped: bool,
}

impl SourceState {
    fn new(source: LogSource, max_lines: usize) -> Self {
        Self {
            source,
            buffer: LogBuffer::with_max_lines(max_lines),
            ready: false,
            last_error: None,
            start_offset: None,
            last_update: None,
            lines_received: 0,
            stopped: false,
        }
    }
}

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    pub sources: Vec<SourceState>,
    pub layout: PanelLayout,

    /// Status message for the footer.
    pub status_message: String,

    /// Non-fatal warnings (config problems, source errors), capped at MAX_WARNINGS.
    pub warnings: Vec<String>,

    /// Name of the environment being followed, for the window title.
    pub environment: String,

    pub dark_mode: bool,
    pub font_size: f32,
}

impl AppState {
    /// State for `sources`, all panels visible, nothing loaded yet.
    pub fn new(environment: impl Into<String>, sources: Vec<LogSource>, max_lines: usize) -> Self {
        let count = sources.len();
        Self {
            sources: sources
                .into_iter()
                .map(|s| SourceState::new(s, max_lines))
                .collect(),
            layout: PanelLayout::new(count),
            status_message: format!("Loading {count} source(s)..."),
            warnings: Vec::new(),
            environment: environment.into(),
            dark_mode: true,
            font_size: crate::util::constants::DEFAULT_FONT_SIZE,
        }
    }

    /// Apply one worker message. Returns `true` if anything visible changed.
    pub fn apply_progress(&mut self, msg: TailProgress) -> bool {
        match msg {
            TailProgress::Ready { source, offset } => {
                let Some(s) = self.sources.get_mut(source) else {
                    return false;
                };
                s.ready = true;
                s.last_error = None;
                s.start_offset = Some(offset);
                tracing::info!(source = %s.source.title, offset, "Source ready");
                let pending = self.sources.iter().filter(|s| !s.ready).count();
                self.status_message = if pending == 0 {
                    format!("Following {} source(s).", self.sources.len())
                } else {
                    format!("Loading... {pending} source(s) pending.")
                };
                true
            }
            TailProgress::NewLines { source, lines } => {
                let Some(s) = self.sources.get_mut(source) else {
                    return false;
                };
                s.lines_received += lines.len() as u64;
                s.last_update = Some(Local::now());
                s.buffer.append(lines);
                true
            }
            TailProgress::SourceError { source, message } => {
                let title = self
                    .sources
                    .get(source)
                    .map(|s| s.source.title.clone())
                    .unwrap_or_else(|| format!("#{source}"));
                if let Some(s) = self.sources.get_mut(source) {
                    s.last_error = Some(message.clone());
                }
                self.push_warning(format!("{title}: {message}"));
                true
            }
            TailProgress::Stopped { source } => {
                if let Some(s) = self.sources.get_mut(source) {
                    s.stopped = true;
                }
                false
            }
        }
    }

    /// Record a non-fatal warning, dropping the oldest beyond MAX_WARNINGS.
    pub fn push_warning(&mut self, message: String) {
        if self.warnings.len() >= MAX_WARNINGS {
            self.warnings.remove(0);
        }
        self.warnings.push(message);
    }

    /// Forward a digit key to the layout. Returns `true` if the layout changed.
    pub fn handle_digit(&mut self, digit: u8) -> bool {
        let changed = self.layout.apply_digit(digit);
        if changed {
            self.status_message = match self.layout.mode() {
                LayoutMode::Split => "Split view.".to_string(),
                LayoutMode::Focused(i) => {
                    let title = self
                        .sources
                        .get(i)
                        .map(|s| s.source.title.as_str())
                        .unwrap_or("?");
                    format!("Focused on {title}.")
                }
            };
        }
        changed
    }

    pub fn is_visible(&self, source: SourceId) -> bool {
        self.layout.is_visible(source)
    }

    pub fn is_ready(&self, source: SourceId) -> bool {
        self.sources.get(source).is_some_and(|s| s.ready)
    }

    /// Lines not yet painted for `source`; advances its watermark.
    pub fn drain_unrendered(&mut self, source: SourceId) -> Vec<String> {
        self.sources
            .get_mut(source)
            .map(|s| s.buffer.drain_unrendered())
            .unwrap_or_default()
    }

    /// Every retained line for `source`, for a full repaint.
    pub fn replay_all(&mut self, source: SourceId) -> Vec<String> {
        self.sources
            .get_mut(source)
            .map(|s| s.buffer.replay_all())
            .unwrap_or_default()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Window title: application name plus the followed environment.
    pub fn window_title(&self) -> String {
        format!("{} - {}", crate::util::constants::APP_NAME, self.environment)
    }
}
