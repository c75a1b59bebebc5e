// log-follow - app/cursor.rs
//
// Read cursor over one growing log file.
//
// A cursor owns exactly one open handle and a byte offset that only moves
// forward. It starts not-ready; `catch_up` opens the file and positions the
// offset near the end according to the catch-up policy. Each
// `read_new_lines` call then returns the complete records appended since the
// previous call, formatted for display.
//
// Partial records: a trailing fragment without a newline (the writer is
// mid-line) is held in `pending` and completed by later polls, so each byte
// is read from disk once. `byte_offset` stays at the last complete record
// boundary until the newline arrives. No line is delivered twice and no
// fragment is delivered on its own, except a record longer than
// MAX_RECORD_BYTES, which is delivered in pieces of that size.
//
// Known limitation: truncation and rotation are not handled. A file that
// shrinks below the offset yields nothing until it grows past it again.

use crate::core::formatter::format_line;
use crate::core::model::{CatchupPolicy, LogSource};
use crate::util::constants::{MAX_RECORD_BYTES, MAX_TAIL_READ_BYTES_PER_POLL};
use crate::util::error::SourceError;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};

/// Incremental reader for a single [`LogSource`].
#[derive(Debug)]
pub struct SourceCursor {
    source: LogSource,
    policy: CatchupPolicy,
    /// `None` until catch-up positioning has completed.
    reader: Option<BufReader<File>>,
    /// Offset of the first byte not yet delivered. Never decreases.
    byte_offset: u64,
    /// Bytes of an unterminated record already read past `byte_offset`.
    pending: Vec<u8>,
    /// Upper bound on bytes consumed by one `read_new_lines` call.
    max_read_bytes: usize,
    /// Upper bound on `pending` before the record is delivered split.
    max_record_bytes: usize,
}

impl SourceCursor {
    /// Create a not-ready cursor. No I/O happens until [`catch_up`](Self::catch_up).
    pub fn new(source: LogSource, policy: CatchupPolicy) -> Self {
        Self {
            source,
            policy,
            reader: None,
            byte_offset: 0,
            pending: Vec::new(),
            max_read_bytes: MAX_TAIL_READ_BYTES_PER_POLL,
            max_record_bytes: MAX_RECORD_BYTES,
        }
    }

    /// Override the per-poll read budget (clamped to at least one byte).
    pub fn with_read_budget(mut self, max_read_bytes: usize) -> Self {
        self.max_read_bytes = max_read_bytes.max(1);
        self
    }

    /// Override the longest record held while waiting for its newline.
    pub fn with_max_record_bytes(mut self, max_record_bytes: usize) -> Self {
        self.max_record_bytes = max_record_bytes.max(1);
        self
    }

    /// `true` once catch-up positioning has completed.
    pub fn is_ready(&self) -> bool {
        self.reader.is_some()
    }

    /// Offset of the next byte to be delivered.
    pub fn byte_offset(&self) -> u64 {
        self.byte_offset
    }

    /// Open the file and position the cursor per the catch-up policy.
    ///
    /// Returns the starting offset. On error the cursor stays not-ready and
    /// the call may be retried. Calling this on a ready cursor is a no-op.
    pub fn catch_up(&mut self) -> Result<u64, SourceError> {
        if self.is_ready() {
            return Ok(self.byte_offset);
        }

        let path = &self.source.path;
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.clone(),
            source,
        })?;
        let mut reader = BufReader::new(file);

        let start = match self.policy {
            CatchupPolicy::Lines(n) => {
                line_catchup_offset(&mut reader, n).map_err(|source| SourceError::Scan {
                    path: path.clone(),
                    source,
                })?
            }
            CatchupPolicy::Bytes(n) => {
                let size = reader
                    .get_ref()
                    .metadata()
                    .map_err(|source| SourceError::Scan {
                        path: path.clone(),
                        source,
                    })?
                    .len();
                size.saturating_sub(n)
            }
        };

        reader
            .seek(SeekFrom::Start(start))
            .map_err(|source| SourceError::Seek {
                path: path.clone(),
                offset: start,
                source,
            })?;

        tracing::info!(
            source = %self.source.title,
            path = %path.display(),
            policy = %self.policy,
            offset = start,
            "Cursor positioned"
        );

        self.byte_offset = start;
        self.reader = Some(reader);
        Ok(start)
    }

    /// Read every complete record appended since the last call, formatted.
    ///
    /// A not-ready cursor returns an empty vector. Reading stops at end of
    /// file or once the per-poll byte budget is spent; remaining data is
    /// picked up by the next call. An unterminated tail is kept for the next
    /// call rather than re-read.
    pub fn read_new_lines(&mut self) -> Result<Vec<String>, SourceError> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(Vec::new());
        };

        let mut lines = Vec::new();
        let mut consumed = 0usize;
        let mut failure = None;

        while consumed < self.max_read_bytes {
            // Both bounds are positive: `pending` is flushed on reaching
            // `max_record_bytes` and the loop guard keeps budget in hand.
            let room = (self.max_record_bytes - self.pending.len())
                .min(self.max_read_bytes - consumed);

            // Whatever read_until consumes lands in `pending`, even on error,
            // so the reader position is always byte_offset + pending.len().
            let n = match reader
                .by_ref()
                .take(room as u64)
                .read_until(b'\n', &mut self.pending)
            {
                Ok(n) => n,
                Err(source) => {
                    failure = Some(source);
                    break;
                }
            };

            if n == 0 {
                break;
            }
            consumed += n;

            if self.pending.last() == Some(&b'\n') {
                lines.push(take_record(&mut self.pending, &mut self.byte_offset));
            } else if self.pending.len() >= self.max_record_bytes {
                tracing::warn!(
                    source = %self.source.title,
                    offset = self.byte_offset,
                    max_record_bytes = self.max_record_bytes,
                    "Unterminated record exceeds the record limit; delivering it split"
                );
                lines.push(take_record(&mut self.pending, &mut self.byte_offset));
            }
        }

        if let Some(source) = failure {
            if lines.is_empty() {
                return Err(SourceError::Read {
                    path: self.source.path.clone(),
                    offset: self.byte_offset,
                    source,
                });
            }
            tracing::debug!(
                source = %self.source.title,
                error = %source,
                "Read interrupted; returning lines read so far"
            );
        }

        Ok(lines)
    }
}

/// Deliver the bytes in `pending` as one formatted line and advance the offset.
fn take_record(pending: &mut Vec<u8>, byte_offset: &mut u64) -> String {
    *byte_offset += pending.len() as u64;
    let line = format_line(strip_terminator(&String::from_utf8_lossy(pending)));
    pending.clear();
    line
}

/// Remove one trailing `\n` or `\r\n`.
fn strip_terminator(text: &str) -> &str {
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.strip_suffix('\r').unwrap_or(text)
}

/// Scan `reader` from the start and return the offset at which the last
/// `keep` lines begin, or 0 if the file has `keep` lines or fewer.
///
/// Only the last `keep + 1` line-end offsets are retained during the scan.
/// A trailing unterminated fragment counts as a line.
fn line_catchup_offset<R: BufRead + Seek>(reader: &mut R, keep: usize) -> std::io::Result<u64> {
    reader.seek(SeekFrom::Start(0))?;

    let mut ends: VecDeque<u64> = VecDeque::with_capacity(keep.saturating_add(1).min(4_096));
    let mut total_lines = 0usize;
    let mut position = 0u64;
    let mut scratch = Vec::new();

    loop {
        scratch.clear();
        let n = reader.read_until(b'\n', &mut scratch)?;
        if n == 0 {
            break;
        }
        position += n as u64;
        total_lines += 1;
        if ends.len() == keep.saturating_add(1) {
            ends.pop_front();
        }
        ends.push_back(position);
    }

    if total_lines > keep {
        // The oldest retained end is where the `keep`-th-from-last line starts.
        Ok(ends.front().copied().unwrap_or(0))
    } else {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn numbered(count: usize) -> String {
        (1..=count).map(|i| format!("line {i}\n")).collect()
    }

    #[test]
    fn test_line_catchup_offset_keeps_last_lines() {
        let content = numbered(10);
        let mut cur = Cursor::new(content.clone().into_bytes());
        let offset = line_catchup_offset(&mut cur, 3).unwrap() as usize;
        assert_eq!(&content[offset..], "line 8\nline 9\nline 10\n");
    }

    #[test]
    fn test_line_catchup_offset_small_file_starts_at_zero() {
        let mut cur = Cursor::new(numbered(3).into_bytes());
        assert_eq!(line_catchup_offset(&mut cur, 3).unwrap(), 0);
        let mut cur = Cursor::new(Vec::new());
        assert_eq!(line_catchup_offset(&mut cur, 100).unwrap(), 0);
    }

    #[test]
    fn test_line_catchup_zero_lines_starts_at_end() {
        let content = numbered(5);
        let mut cur = Cursor::new(content.clone().into_bytes());
        assert_eq!(
            line_catchup_offset(&mut cur, 0).unwrap(),
            content.len() as u64
        );
    }

    #[test]
    fn test_not_ready_cursor_reads_nothing() {
        let mut cursor = SourceCursor::new(
            LogSource::new("x", "/definitely/not/here.log"),
            CatchupPolicy::default(),
        );
        assert!(!cursor.is_ready());
        assert!(cursor.read_new_lines().unwrap().is_empty());
        assert!(matches!(cursor.catch_up(), Err(SourceError::Open { .. })));
        assert!(!cursor.is_ready());
        assert!(cursor.read_new_lines().unwrap().is_empty());
    }

    #[test]
    fn test_partial_line_is_deferred() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "first\nsec").unwrap();
        file.flush().unwrap();

        let mut cursor = SourceCursor::new(
            LogSource::new("t", file.path()),
            CatchupPolicy::Lines(100),
        );
        cursor.catch_up().unwrap();
        assert_eq!(cursor.read_new_lines().unwrap(), vec!["first".to_string()]);
        assert_eq!(cursor.byte_offset(), 6);
        assert!(cursor.read_new_lines().unwrap().is_empty());

        write!(file, "ond\r\n").unwrap();
        file.flush().unwrap();
        assert_eq!(cursor.read_new_lines().unwrap(), vec!["second".to_string()]);
        assert!(cursor.read_new_lines().unwrap().is_empty());
    }

    #[test]
    fn test_fragment_is_carried_not_reread() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "first\nsec").unwrap();
        file.flush().unwrap();

        let mut cursor = SourceCursor::new(
            LogSource::new("t", file.path()),
            CatchupPolicy::Lines(100),
        );
        cursor.catch_up().unwrap();
        assert_eq!(cursor.read_new_lines().unwrap(), vec!["first".to_string()]);

        // Bytes already read stay as read: scribbling over the fragment on
        // disk must not change the record that is eventually delivered.
        file.seek(SeekFrom::Start(6)).unwrap();
        write!(file, "XYZ").unwrap();
        file.seek(SeekFrom::End(0)).unwrap();
        write!(file, "ond\n").unwrap();
        file.flush().unwrap();

        assert_eq!(cursor.read_new_lines().unwrap(), vec!["second".to_string()]);
        assert_eq!(cursor.byte_offset(), 13);
    }

    #[test]
    fn test_overlong_unterminated_record_is_split() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "0123456789abcdefXY").unwrap();
        file.flush().unwrap();

        let mut cursor = SourceCursor::new(
            LogSource::new("t", file.path()),
            CatchupPolicy::Lines(100),
        )
        .with_max_record_bytes(8);
        cursor.catch_up().unwrap();

        assert_eq!(
            cursor.read_new_lines().unwrap(),
            vec!["01234567".to_string(), "89abcdef".to_string()]
        );
        assert_eq!(cursor.byte_offset(), 16);

        write!(file, "Z\n").unwrap();
        file.flush().unwrap();
        assert_eq!(cursor.read_new_lines().unwrap(), vec!["XYZ".to_string()]);
    }

    #[test]
    fn test_read_budget_splits_large_backlog() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", numbered(20)).unwrap();
        file.flush().unwrap();

        let mut cursor = SourceCursor::new(
            LogSource::new("t", file.path()),
            CatchupPolicy::Lines(100),
        )
        .with_read_budget(16);
        cursor.catch_up().unwrap();

        let mut all = Vec::new();
        let mut polls = 0;
        loop {
            let batch = cursor.read_new_lines().unwrap();
            if batch.is_empty() {
                break;
            }
            polls += 1;
            all.extend(batch);
        }
        assert!(polls > 1);
        let expected: Vec<String> = (1..=20).map(|i| format!("line {i}")).collect();
        assert_eq!(all, expected);
    }

    #[test]
    fn test_byte_catchup_seeks_from_end() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "aaaa\nbbbb\ncccc\n").unwrap();
        file.flush().unwrap();

        let mut cursor = SourceCursor::new(LogSource::new("t", file.path()), CatchupPolicy::Bytes(7));
        assert_eq!(cursor.catch_up().unwrap(), 8);
        // The first record is a fragment of "bbbb"; this is accepted.
        assert_eq!(
            cursor.read_new_lines().unwrap(),
            vec!["b".to_string(), "cccc".to_string()]
        );
    }

    #[test]
    fn test_catch_up_is_idempotent_once_ready() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", numbered(5)).unwrap();
        file.flush().unwrap();

        let mut cursor = SourceCursor::new(LogSource::new("t", file.path()), CatchupPolicy::Lines(2));
        let first = cursor.catch_up().unwrap();
        let _ = cursor.read_new_lines().unwrap();
        let again = cursor.catch_up().unwrap();
        assert!(again >= first);
        assert_eq!(again, cursor.byte_offset());
    }
}
