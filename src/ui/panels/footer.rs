// log-follow - ui/panels/footer.rs
//
// Bottom bar: key bindings, current layout mode, status message, and a
// warning badge listing recent non-fatal problems on hover.

use crate::app::state::AppState;
use crate::core::layout::LayoutMode;
use crate::ui::theme;

/// Number of most recent warnings listed in the badge tooltip.
const WARNING_TOOLTIP_LINES: usize = 10;

/// Text describing the current layout mode.
pub fn mode_label(state: &AppState) -> String {
    match state.layout.mode() {
        LayoutMode::Split => format!("Split ({} panels)", state.source_count()),
        LayoutMode::Focused(i) => {
            let title = state
                .sources
                .get(i)
                .map(|s| s.source.title.as_str())
                .unwrap_or("?");
            format!("Focused: {title}")
        }
    }
}

/// Key binding hints, adjusted to the number of sources.
pub fn key_hints(source_count: usize) -> String {
    match source_count.min(crate::util::constants::MAX_FOCUS_DIGIT as usize) {
        0 => "q Quit".to_string(),
        1 => "q Quit   0 Split   1 Focus".to_string(),
        n => format!("q Quit   0 Split   1-{n} Focus"),
    }
}

/// Render the footer bar.
pub fn render(ui: &mut egui::Ui, state: &AppState) {
    let muted = theme::muted_colour(state.dark_mode);
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(key_hints(state.source_count())).monospace().color(muted));
        ui.separator();
        ui.label(mode_label(state));
        ui.separator();
        ui.label(&state.status_message);

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if !state.warnings.is_empty() {
                let recent: Vec<&str> = state
                    .warnings
                    .iter()
                    .rev()
                    .take(WARNING_TOOLTIP_LINES)
                    .map(String::as_str)
                    .collect();
                ui.label(
                    egui::RichText::new(format!("\u{26a0} {}", state.warnings.len()))
                        .color(theme::WARNING_BADGE),
                )
                .on_hover_text(recent.join("\n"));
            }
            let total: u64 = state.sources.iter().map(|s| s.lines_received).sum();
            ui.label(egui::RichText::new(format!("{total} lines")).color(muted));
        });
    });
}
