// log-follow - ui/theme.rs
//
// Colour scheme, severity colour mapping, and layout constants.
// No dependencies on app state or business logic.

use crate::core::model::Severity;
use egui::Color32;

/// Text colour for a formatted line of the given severity.
pub fn severity_colour(severity: Severity, dark_mode: bool) -> Color32 {
    match severity {
        Severity::Critical => Color32::from_rgb(239, 68, 68), // Red 500
        Severity::Error => Color32::from_rgb(220, 38, 38),    // Red 600
        Severity::Warning => Color32::from_rgb(217, 119, 6),  // Amber 600
        Severity::Debug => Color32::from_rgb(107, 114, 128),  // Gray 500
        Severity::Info | Severity::Unknown => row_text_colour(dark_mode),
    }
}

/// Default foreground for log rows.
pub fn row_text_colour(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(229, 231, 235) // Gray 200
    } else {
        Color32::from_rgb(17, 24, 39) // Gray 900
    }
}

/// Secondary text (loading hints, timestamps, key hints).
pub fn muted_colour(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(156, 163, 175) // Gray 400
    } else {
        Color32::from_rgb(75, 85, 99) // Gray 600
    }
}

/// Panel title accent.
pub const TITLE_COLOUR: Color32 = Color32::from_rgb(56, 189, 248); // Sky 400

/// Warning badge in the footer.
pub const WARNING_BADGE: Color32 = Color32::from_rgb(217, 119, 6); // Amber 600

/// Horizontal space reserved for a panel's vertical scrollbar when working
/// out how many characters fit on a row.
pub const SCROLLBAR_ALLOWANCE: f32 = 16.0;

/// Initial window size.
pub const WINDOW_SIZE: [f32; 2] = [1400.0, 800.0];

/// Minimum window size.
pub const MIN_WINDOW_SIZE: [f32; 2] = [480.0, 240.0];
