// log-follow - core/formatter.rs
//
// Line normalisation: rewrites a raw log record into the compact display
// form used by the dashboard panels.
//
// Record grammar:
//   YYYY-MM-DD HH:MM:SS,mmm [thread] LEVEL dotted.logger.Class - message
//
// where `thread` is numeric or the literal `.NET TP Worker`. Matching
// records become
//   DD/MM HH:MM:SS,mmm Class LEVEL - message
//
// Anything else (stack-trace lines, blank lines, other formats) is passed
// through unchanged. The transform is pure and total.

use crate::core::model::Severity;
use regex::Regex;
use std::sync::OnceLock;

/// Raw record pattern. Anchored at the start only; the message runs to the
/// end of the line.
const RECORD_PATTERN: &str = concat!(
    r"^(?P<year>\d{4})-(?P<month>\d{2})-(?P<day>\d{2}) ",
    r"(?P<time>\d{2}:\d{2}:\d{2},\d{3}) ",
    r"\[(?:\d+|\.NET TP Worker)\] ",
    r"(?P<level>[A-Z]+) ",
    r"(?:[a-zA-Z0-9]+\.)+(?P<class>[a-zA-Z0-9]+) - ",
    r"(?P<message>.+)",
);

/// Pattern of an already-formatted line, used to recover its level.
const FORMATTED_PATTERN: &str =
    r"^\d{2}/\d{2} \d{2}:\d{2}:\d{2},\d{3} [a-zA-Z0-9]+ (?P<level>[A-Z]+) - ";

fn record_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(RECORD_PATTERN).expect("record pattern is a valid regex"))
}

fn formatted_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(FORMATTED_PATTERN).expect("formatted pattern is a valid regex"))
}

/// Normalise one raw log line for display.
///
/// Returns `"<day>/<month> <time> <class> <level> - <message>"` when the line
/// matches the record grammar, with trailing line terminators removed.
/// Returns the input unchanged otherwise.
pub fn format_line(raw: &str) -> String {
    let Some(caps) = record_regex().captures(raw) else {
        return raw.to_string();
    };

    // All named groups are mandatory in the pattern, so indexing by name
    // cannot fail once the pattern has matched.
    let formatted = format!(
        "{}/{} {} {} {} - {}",
        &caps["day"],
        &caps["month"],
        &caps["time"],
        &caps["class"],
        &caps["level"],
        &caps["message"],
    );
    formatted.trim_end_matches(['\r', '\n']).to_string()
}

/// Severity of a line produced by [`format_line`].
///
/// Pass-through lines (no recognisable level) are `Severity::Unknown`.
pub fn severity_of(formatted: &str) -> Severity {
    formatted_regex()
        .captures(formatted)
        .and_then(|caps| caps.name("level"))
        .map(|m| Severity::from_level(m.as_str()))
        .unwrap_or_default()
}
