// log-follow - gui.rs
//
// Top-level eframe::App implementation.
// Applies worker messages, routes key presses to the layout, and paints one
// column per visible source.

use crate::app::state::AppState;
use crate::app::tail::{TailConfig, TailManager};
use crate::ui::panels::{footer, log_panel};
use crate::util::constants::{MAX_FOCUS_DIGIT, MAX_TAIL_MESSAGES_PER_FRAME};
use std::time::Duration;

/// Digit keys in value order: index == digit.
const DIGIT_KEYS: [egui::Key; MAX_FOCUS_DIGIT as usize + 1] = [
    egui::Key::Num0,
    egui::Key::Num1,
    egui::Key::Num2,
    egui::Key::Num3,
    egui::Key::Num4,
    egui::Key::Num5,
    egui::Key::Num6,
    egui::Key::Num7,
    egui::Key::Num8,
    egui::Key::Num9,
];

/// The log-follow dashboard.
pub struct LogFollowApp {
    pub state: AppState,
    pub tail_manager: TailManager,
    /// Painted rows per source, index-aligned with `state.sources`.
    views: Vec<log_panel::PanelView>,
    repaint_interval: Duration,
}

impl LogFollowApp {
    /// Create the dashboard and start one tail worker per source.
    pub fn new(state: AppState, tail_config: &TailConfig) -> Self {
        let sources: Vec<_> = state.sources.iter().map(|s| s.source.clone()).collect();
        let mut tail_manager = TailManager::new();
        tail_manager.start(&sources, tail_config);

        Self {
            views: sources.iter().map(|_| log_panel::PanelView::new()).collect(),
            state,
            tail_manager,
            repaint_interval: tail_config.poll_interval,
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (digits, quit) = ctx.input(|i| {
            let digits: Vec<u8> = DIGIT_KEYS
                .iter()
                .enumerate()
                .filter(|(_, key)| i.key_pressed(**key))
                .map(|(digit, _)| digit as u8)
                .collect();
            (digits, i.key_pressed(egui::Key::Q))
        });

        for digit in digits {
            self.state.handle_digit(digit);
        }
        if quit {
            tracing::info!("Quit requested");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

impl eframe::App for LogFollowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply queued worker messages (bounded per frame).
        let messages = self.tail_manager.poll_progress(MAX_TAIL_MESSAGES_PER_FRAME);
        let backlog = messages.len() == MAX_TAIL_MESSAGES_PER_FRAME;
        for msg in messages {
            self.state.apply_progress(msg);
        }

        self.handle_keys(ctx);

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            footer::render(ui, &self.state);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let visible: Vec<usize> = self.state.layout.visible_indices().collect();
            if visible.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("No sources configured.");
                });
                return;
            }

            let state = &mut self.state;
            let views = &mut self.views;
            ui.columns(visible.len(), |columns| {
                for (column, &source) in columns.iter_mut().zip(&visible) {
                    if let Some(view) = views.get_mut(source) {
                        log_panel::render(column, state, source, view);
                    }
                }
            });
        });

        // Keep ticking at the poll cadence so new lines appear promptly;
        // immediately if messages are still queued.
        if backlog {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(self.repaint_interval);
        }
    }

    /// Stop every worker before the window (and process) goes away.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.tail_manager.stop();
    }
}
