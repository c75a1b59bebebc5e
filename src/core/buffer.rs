// log-follow - core/buffer.rs
//
// Per-source ordered store of formatted lines plus a render watermark.
//
// Lines are kept in arrival order, which is file order. The watermark
// (`rendered_count`) records how many of the retained lines the display has
// already painted, so each paint tick only needs the unrendered tail.
//
// Retention is unbounded unless a line cap is configured, in which case the
// oldest lines are evicted first and the watermark is shifted down by the
// number of evicted lines it had already covered.
//
// Concurrency: the buffer is owned by the render thread and only mutated
// there (worker batches arrive over a channel), so a whole batch is always
// applied before any reader can observe it.

use std::collections::VecDeque;

/// Append-only line store for one source.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    lines: VecDeque<String>,
    /// Number of retained lines already handed to the display.
    rendered_count: usize,
    /// Maximum retained lines; 0 means unbounded.
    max_lines: usize,
    /// Total lines evicted over the buffer's lifetime.
    evicted: u64,
}

impl LogBuffer {
    /// An unbounded buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer that keeps at most `max_lines` lines (0 = unbounded).
    pub fn with_max_lines(max_lines: usize) -> Self {
        Self {
            max_lines,
            ..Self::default()
        }
    }

    /// Append a batch of lines in order.
    ///
    /// When a cap is configured and exceeded, the oldest lines are evicted.
    pub fn append<I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.lines.extend(lines);

        if self.max_lines > 0 && self.lines.len() > self.max_lines {
            let excess = self.lines.len() - self.max_lines;
            self.lines.drain(..excess);
            self.rendered_count = self.rendered_count.saturating_sub(excess);
            self.evicted += excess as u64;
        }
    }

    /// Lines appended since the previous drain, advancing the watermark to
    /// the end of the buffer.
    ///
    /// A second call with no append in between returns an empty vector.
    pub fn drain_unrendered(&mut self) -> Vec<String> {
        let fresh: Vec<String> = self.lines.range(self.rendered_count..).cloned().collect();
        self.rendered_count = self.lines.len();
        fresh
    }

    /// Every retained line, oldest first. Does not move the watermark.
    pub fn full_contents(&self) -> impl ExactSizeIterator<Item = &String> + '_ {
        self.lines.iter()
    }

    /// Every retained line for a full repaint (e.g. after a resize), marking
    /// all of them as rendered so the next drain does not repeat them.
    pub fn replay_all(&mut self) -> Vec<String> {
        self.rendered_count = self.lines.len();
        self.lines.iter().cloned().collect()
    }

    /// Number of retained lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of retained lines already handed to the display.
    pub fn rendered_count(&self) -> usize {
        self.rendered_count
    }

    /// Total number of lines dropped by the line cap.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_drain_returns_only_new_lines() {
        let mut buf = LogBuffer::new();
        buf.append(lines(&["a", "b"]));
        assert_eq!(buf.drain_unrendered(), lines(&["a", "b"]));

        buf.append(lines(&["c"]));
        assert_eq!(buf.drain_unrendered(), lines(&["c"]));
    }

    #[test]
    fn test_second_drain_without_append_is_empty() {
        let mut buf = LogBuffer::new();
        buf.append(lines(&["a", "b", "c"]));
        let _ = buf.drain_unrendered();
        assert!(buf.drain_unrendered().is_empty());
        assert_eq!(buf.rendered_count(), buf.len());
    }

    #[test]
    fn test_full_contents_keeps_watermark() {
        let mut buf = LogBuffer::new();
        buf.append(lines(&["a", "b"]));
        let all: Vec<_> = buf.full_contents().cloned().collect();
        assert_eq!(all, lines(&["a", "b"]));
        assert_eq!(buf.rendered_count(), 0);
    }

    #[test]
    fn test_replay_all_marks_everything_rendered() {
        let mut buf = LogBuffer::new();
        buf.append(lines(&["a", "b"]));
        let _ = buf.drain_unrendered();
        buf.append(lines(&["c"]));

        assert_eq!(buf.replay_all(), lines(&["a", "b", "c"]));
        assert!(buf.drain_unrendered().is_empty());
    }

    #[test]
    fn test_cap_evicts_oldest_first() {
        let mut buf = LogBuffer::with_max_lines(3);
        buf.append(lines(&["1", "2"]));
        let _ = buf.drain_unrendered();
        buf.append(lines(&["3", "4", "5"]));

        let all: Vec<_> = buf.full_contents().cloned().collect();
        assert_eq!(all, lines(&["3", "4", "5"]));
        assert_eq!(buf.evicted(), 2);
        assert!(buf.rendered_count() <= buf.len());
        // "1" and "2" were rendered and evicted; the unrendered tail survives.
        assert_eq!(buf.drain_unrendered(), lines(&["3", "4", "5"]));
    }

    #[test]
    fn test_cap_larger_batch_than_cap() {
        let mut buf = LogBuffer::with_max_lines(2);
        buf.append(lines(&["1", "2", "3", "4"]));
        assert_eq!(buf.drain_unrendered(), lines(&["3", "4"]));
        assert_eq!(buf.rendered_count(), 2);
    }

    #[test]
    fn test_watermark_never_exceeds_len() {
        let mut buf = LogBuffer::with_max_lines(1);
        for i in 0..10 {
            buf.append(vec![i.to_string()]);
            if i % 3 == 0 {
                let _ = buf.drain_unrendered();
            }
            assert!(buf.rendered_count() <= buf.len());
        }
    }
}
