// log-follow - ui/panels/log_panel.rs
//
// One column per source: title bar plus a virtual-scrolling list of
// wrapped rows pinned to the newest line.
//
// Lines are wrapped to the panel's character width once, when they are
// painted, and cached as rows. Each frame only the unrendered tail of the
// source's buffer is wrapped and appended. When the width in characters
// changes (window resize, split <-> focus) the cached rows are stale, so the
// view is cleared and every retained line is replayed at the new width.
//
// Rendering uses `ScrollArea::show_rows`, so only on-screen rows cost
// anything regardless of how much history is retained.

use crate::app::state::{AppState, SourceState};
use crate::core::formatter::severity_of;
use crate::core::model::{Severity, SourceId};
use crate::ui::theme;
use std::collections::VecDeque;

/// One wrapped display row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaintedRow {
    pub text: String,
    pub severity: Severity,
}

/// Rows already painted for one panel.
#[derive(Debug, Default)]
pub struct PanelView {
    rows: VecDeque<PaintedRow>,
    /// Number of rows each painted line occupies, oldest first.
    line_rows: VecDeque<usize>,
    /// Width the rows were wrapped at; `None` before the first paint.
    columns: Option<usize>,
    /// Number of full replays performed (resize-driven repaints).
    replays: u64,
}

impl PanelView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the painted rows up to date with the source's buffer.
    ///
    /// Appends only unrendered lines while the width is unchanged; replays
    /// the whole buffer when it changed.
    pub fn sync(&mut self, state: &mut AppState, source: SourceId, columns: usize) {
        let columns = columns.max(1);

        if self.columns != Some(columns) {
            let all = state.replay_all(source);
            if self.columns.is_some() {
                tracing::debug!(
                    source,
                    columns,
                    lines = all.len(),
                    "Panel width changed; replaying"
                );
                self.replays += 1;
            }
            self.rows.clear();
            self.line_rows.clear();
            self.columns = Some(columns);
            self.push_lines(&all);
        } else {
            let fresh = state.drain_unrendered(source);
            self.push_lines(&fresh);
        }

        let retained = state.sources.get(source).map_or(0, |s| s.buffer.len());
        self.trim_to(retained);
    }

    fn push_lines(&mut self, lines: &[String]) {
        let columns = self.columns.unwrap_or(usize::MAX);
        for line in lines {
            let severity = severity_of(line);
            let wrapped = wrap_line(line, columns);
            self.line_rows.push_back(wrapped.len());
            self.rows
                .extend(wrapped.into_iter().map(|text| PaintedRow { text, severity }));
        }
    }

    /// Drop the oldest painted lines until at most `max_lines` remain.
    /// Keeps the view in step with buffer eviction.
    fn trim_to(&mut self, max_lines: usize) {
        while self.line_rows.len() > max_lines {
            let Some(n) = self.line_rows.pop_front() else {
                break;
            };
            self.rows.drain(..n.min(self.rows.len()));
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn line_count(&self) -> usize {
        self.line_rows.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = &PaintedRow> + '_ {
        self.rows.iter()
    }

    pub fn replays(&self) -> u64 {
        self.replays
    }
}

/// Split `line` into rows of at most `columns` characters.
///
/// An empty line still occupies one (empty) row.
pub fn wrap_line(line: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    if line.is_empty() {
        return vec![String::new()];
    }

    let mut rows = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;
    for ch in line.chars() {
        if count == columns {
            rows.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    rows.push(current);
    rows
}

/// Hover text for a panel title: path, start position and eviction count.
pub fn title_tooltip(src: &SourceState) -> String {
    let mut text = src.source.path.display().to_string();
    if let Some(offset) = src.start_offset {
        text.push_str(&format!("\nFollowing from byte {offset}"));
    }
    let evicted = src.buffer.evicted();
    if evicted > 0 {
        text.push_str(&format!("\n{evicted} older lines dropped"));
    }
    text
}

/// Render the panel for `source` into `ui`.
pub fn render(ui: &mut egui::Ui, state: &mut AppState, source: SourceId, view: &mut PanelView) {
    let dark = state.dark_mode;
    let font_size = state.font_size;
    let font_id = egui::FontId::monospace(font_size);

    let Some(src) = state.sources.get(source) else {
        return;
    };

    // ---- Title bar -----------------------------------------------------------
    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(format!("[{}] {}", source + 1, src.source.title))
                .strong()
                .color(theme::TITLE_COLOUR),
        );
        if !src.ready {
            ui.spinner();
            ui.label(egui::RichText::new("loading\u{2026}").color(theme::muted_colour(dark)));
        } else if let Some(t) = src.last_update {
            ui.label(
                egui::RichText::new(format!("updated {}", t.format("%H:%M:%S")))
                    .color(theme::muted_colour(dark)),
            );
        }
    })
    .response
    .on_hover_text(title_tooltip(src));

    if !src.ready && src.last_error.is_some() {
        ui.label(
            egui::RichText::new(format!("Waiting for {}", src.source.path.display()))
                .italics()
                .color(theme::muted_colour(dark)),
        );
    }
    ui.separator();

    // ---- Rows ----------------------------------------------------------------
    let glyph_width = ui.fonts(|f| f.glyph_width(&font_id, 'M')).max(1.0);
    let row_height = ui.fonts(|f| f.row_height(&font_id));
    let usable = (ui.available_width() - theme::SCROLLBAR_ALLOWANCE).max(glyph_width);
    let columns = (usable / glyph_width).floor() as usize;

    view.sync(state, source, columns);

    egui::ScrollArea::vertical()
        .id_salt(("log_panel", source))
        .auto_shrink([false; 2])
        .stick_to_bottom(true)
        .show_rows(ui, row_height, view.rows.len(), |ui, row_range| {
            for idx in row_range {
                let Some(row) = view.rows.get(idx) else {
                    continue;
                };
                ui.add(
                    egui::Label::new(
                        egui::RichText::new(&row.text)
                            .font(font_id.clone())
                            .color(theme::severity_colour(row.severity, dark)),
                    )
                    .extend(),
                );
            }
        });
}
