// log-follow - app/tail.rs
//
// Live tail: one background worker per source polls its cursor for newly
// appended lines and streams them to the render thread.
//
// Architecture:
//   - `TailManager` lives on the render thread; `run_source_worker` runs on a
//     dedicated thread per source. Each worker exclusively owns its
//     `SourceCursor`, so a cursor is never read by two threads at once.
//   - Every worker shares one mpsc sender; the render thread drains the
//     receiver once per frame. A poll's lines travel as one
//     `TailProgress::NewLines` message, so a batch is applied whole.
//   - Each worker has its own `Arc<AtomicBool>` cancel flag. Stopping sets the
//     flag and joins the thread; the cursor (and its file handle) is dropped
//     by the worker on exit, never while a read is in flight.
//
// Failure handling:
//   - An unopenable source is reported once, then retried with exponential
//     backoff (OPEN_RETRY_INITIAL_MS doubling up to OPEN_RETRY_MAX_MS).
//     Until it opens, the source contributes nothing.
//   - Read errors are reported once per failure episode and polling continues.
//   - Sleeps are split into TAIL_CANCEL_CHECK_INTERVAL_MS slices so a stop
//     request is honoured promptly.

use crate::app::cursor::SourceCursor;
use crate::core::model::{CatchupPolicy, LogSource, SourceId, TailProgress};
use crate::util::constants::{
    MAX_TAIL_READ_BYTES_PER_POLL, OPEN_RETRY_INITIAL_MS, OPEN_RETRY_MAX_MS,
    TAIL_CANCEL_CHECK_INTERVAL_MS, TAIL_POLL_INTERVAL_MS,
};
use crate::util::logging::preview;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use std::time::Duration;

// =============================================================================
// Configuration
// =============================================================================

/// Settings shared by every source worker.
#[derive(Debug, Clone, PartialEq)]
pub struct TailConfig {
    /// Delay between polls of one source.
    pub poll_interval: Duration,
    /// How each cursor is positioned when its file is first opened.
    pub catchup: CatchupPolicy,
    /// Maximum bytes of complete records consumed per poll.
    pub max_read_bytes_per_poll: usize,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(TAIL_POLL_INTERVAL_MS),
            catchup: CatchupPolicy::default(),
            max_read_bytes_per_poll: MAX_TAIL_READ_BYTES_PER_POLL,
        }
    }
}

// =============================================================================
// TailManager
// =============================================================================

struct Worker {
    source: SourceId,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

/// Owns the per-source worker threads and the channel they report on.
pub struct TailManager {
    /// Channel receiver the render thread polls each frame.
    progress_rx: Option<mpsc::Receiver<TailProgress>>,
    workers: Vec<Worker>,
}

impl TailManager {
    pub fn new() -> Self {
        Self {
            progress_rx: None,
            workers: Vec::new(),
        }
    }

    /// Start one worker per source. `SourceId`s are indices into `sources`.
    ///
    /// Any workers from a previous call are stopped first.
    pub fn start(&mut self, sources: &[LogSource], config: &TailConfig) {
        self.stop();

        let (tx, rx) = mpsc::channel();
        self.progress_rx = Some(rx);

        for (id, source) in sources.iter().enumerate() {
            let cancel = Arc::new(AtomicBool::new(false));
            let worker_cancel = Arc::clone(&cancel);
            let worker_tx = tx.clone();
            let worker_source = source.clone();
            let worker_config = config.clone();

            let spawned = std::thread::Builder::new()
                .name(format!("tail-{id}"))
                .spawn(move || {
                    run_source_worker(id, worker_source, worker_config, worker_tx, worker_cancel);
                });

            match spawned {
                Ok(handle) => self.workers.push(Worker {
                    source: id,
                    cancel,
                    handle: Some(handle),
                }),
                Err(e) => {
                    tracing::error!(
                        source = %source.title,
                        error = %e,
                        "Failed to spawn tail worker"
                    );
                    let _ = tx.send(TailProgress::SourceError {
                        source: id,
                        message: format!("Cannot start worker: {e}"),
                    });
                }
            }
        }

        tracing::info!(
            sources = sources.len(),
            workers = self.workers.len(),
            poll_ms = config.poll_interval.as_millis() as u64,
            catchup = %config.catchup,
            "Live tail started"
        );
    }

    /// Stop a single source's worker and wait for it to exit.
    pub fn stop_source(&mut self, source: SourceId) {
        if let Some(pos) = self.workers.iter().position(|w| w.source == source) {
            let mut worker = self.workers.remove(pos);
            worker.cancel.store(true, Ordering::SeqCst);
            join_worker(&mut worker);
        }
    }

    /// Stop every worker and wait for them to exit.
    ///
    /// All flags are raised before any join so workers wind down in parallel.
    pub fn stop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        for worker in &self.workers {
            worker.cancel.store(true, Ordering::SeqCst);
        }
        for worker in &mut self.workers {
            join_worker(worker);
        }
        let count = self.workers.len();
        self.workers.clear();
        tracing::info!(workers = count, "Live tail stopped");
    }

    /// `true` while at least one worker is running.
    pub fn is_active(&self) -> bool {
        !self.workers.is_empty()
    }

    /// Drain up to `max` queued messages without blocking.
    pub fn poll_progress(&self, max: usize) -> Vec<TailProgress> {
        let mut messages = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while messages.len() < max {
                match rx.try_recv() {
                    Ok(msg) => messages.push(msg),
                    Err(_) => break,
                }
            }
        }
        messages
    }
}

impl Default for TailManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TailManager {
    fn drop(&mut self) {
        self.stop();
    }
}

fn join_worker(worker: &mut Worker) {
    if let Some(handle) = worker.handle.take() {
        if handle.join().is_err() {
            tracing::error!(source = worker.source, "Tail worker panicked");
        }
    }
}

// =============================================================================
// Background worker
// =============================================================================

/// Sleep for `total`, waking every TAIL_CANCEL_CHECK_INTERVAL_MS to check the
/// cancel flag. Returns `false` if cancelled.
fn sleep_unless_cancelled(total: Duration, cancel: &AtomicBool) -> bool {
    let slice = Duration::from_millis(TAIL_CANCEL_CHECK_INTERVAL_MS);
    let mut remaining = total;
    while !remaining.is_zero() {
        if cancel.load(Ordering::SeqCst) {
            return false;
        }
        let step = remaining.min(slice);
        std::thread::sleep(step);
        remaining -= step;
    }
    !cancel.load(Ordering::SeqCst)
}

/// Worker body for one source: catch up (with retry), then poll forever.
fn run_source_worker(
    id: SourceId,
    source: LogSource,
    config: TailConfig,
    tx: mpsc::Sender<TailProgress>,
    cancel: Arc<AtomicBool>,
) {
    macro_rules! send {
        ($msg:expr) => {
            if tx.send($msg).is_err() {
                // Render thread has gone away; nothing left to report to.
                return;
            }
        };
    }

    let title = source.title.clone();
    let mut cursor =
        SourceCursor::new(source, config.catchup).with_read_budget(config.max_read_bytes_per_poll);

    // -------------------------------------------------------------------------
    // 1. Catch-up positioning, retried with backoff until it succeeds.
    // -------------------------------------------------------------------------
    let mut backoff = Duration::from_millis(OPEN_RETRY_INITIAL_MS);
    let max_backoff = Duration::from_millis(OPEN_RETRY_MAX_MS);
    let mut open_error_reported = false;

    loop {
        if cancel.load(Ordering::SeqCst) {
            send!(TailProgress::Stopped { source: id });
            return;
        }
        match cursor.catch_up() {
            Ok(offset) => {
                send!(TailProgress::Ready { source: id, offset });
                break;
            }
            Err(e) => {
                if open_error_reported {
                    tracing::debug!(source = %title, error = %e, "Tail: still cannot open");
                } else {
                    tracing::warn!(source = %title, error = %e, "Tail: source not available");
                    send!(TailProgress::SourceError {
                        source: id,
                        message: e.to_string(),
                    });
                    open_error_reported = true;
                }
                if !sleep_unless_cancelled(backoff, &cancel) {
                    send!(TailProgress::Stopped { source: id });
                    return;
                }
                backoff = (backoff * 2).min(max_backoff);
            }
        }
    }

    // -------------------------------------------------------------------------
    // 2. Recurring polls.
    // -------------------------------------------------------------------------
    let mut read_error_reported = false;

    loop {
        match cursor.read_new_lines() {
            Ok(lines) => {
                read_error_reported = false;
                if !lines.is_empty() {
                    tracing::debug!(
                        source = %title,
                        count = lines.len(),
                        offset = cursor.byte_offset(),
                        first = preview(&lines[0]),
                        "Tail: new lines"
                    );
                    send!(TailProgress::NewLines { source: id, lines });
                }
            }
            Err(e) => {
                if !read_error_reported {
                    tracing::warn!(source = %title, error = %e, "Tail: read error");
                    send!(TailProgress::SourceError {
                        source: id,
                        message: e.to_string(),
                    });
                    read_error_reported = true;
                }
            }
        }

        if !sleep_unless_cancelled(config.poll_interval, &cancel) {
            send!(TailProgress::Stopped { source: id });
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Instant;
    use tempfile::NamedTempFile;

    fn fast_config() -> TailConfig {
        TailConfig {
            poll_interval: Duration::from_millis(5),
            ..TailConfig::default()
        }
    }

    /// Collect messages until `done` returns true or the timeout expires.
    fn collect_until(
        manager: &TailManager,
        timeout: Duration,
        mut done: impl FnMut(&[TailProgress]) -> bool,
    ) -> Vec<TailProgress> {
        let deadline = Instant::now() + timeout;
        let mut all = Vec::new();
        while Instant::now() < deadline {
            all.extend(manager.poll_progress(usize::MAX));
            if done(&all) {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        all
    }

    #[test]
    fn test_sleep_unless_cancelled_returns_false_when_cancelled() {
        let cancel = AtomicBool::new(true);
        assert!(!sleep_unless_cancelled(Duration::from_secs(5), &cancel));
        let cancel = AtomicBool::new(false);
        assert!(sleep_unless_cancelled(Duration::from_millis(1), &cancel));
    }

    #[test]
    fn test_worker_reports_ready_and_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "hello").unwrap();
        file.flush().unwrap();

        let mut manager = TailManager::new();
        manager.start(&[LogSource::new("one", file.path())], &fast_config());
        assert!(manager.is_active());

        let msgs = collect_until(&manager, Duration::from_secs(5), |m| {
            m.iter().any(|x| matches!(x, TailProgress::NewLines { .. }))
        });
        assert!(msgs.contains(&TailProgress::Ready { source: 0, offset: 0 }));
        assert!(msgs.contains(&TailProgress::NewLines {
            source: 0,
            lines: vec!["hello".to_string()],
        }));

        manager.stop();
        assert!(!manager.is_active());
    }

    #[test]
    fn test_missing_source_reports_error_once_and_keeps_others_running() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "ok").unwrap();
        file.flush().unwrap();

        let sources = [
            LogSource::new("missing", "/no/such/dir/missing.log"),
            LogSource::new("present", file.path()),
        ];
        let mut manager = TailManager::new();
        manager.start(&sources, &fast_config());

        let msgs = collect_until(&manager, Duration::from_secs(5), |m| {
            m.iter()
                .any(|x| matches!(x, TailProgress::NewLines { source: 1, .. }))
        });
        let errors = msgs
            .iter()
            .filter(|m| matches!(m, TailProgress::SourceError { source: 0, .. }))
            .count();
        assert_eq!(errors, 1);
        assert!(!msgs
            .iter()
            .any(|m| matches!(m, TailProgress::Ready { source: 0, .. })));

        manager.stop_source(0);
        assert!(manager.is_active());
        manager.stop();
    }

    #[test]
    fn test_stop_emits_stopped() {
        let file = NamedTempFile::new().unwrap();
        let mut manager = TailManager::new();
        manager.start(&[LogSource::new("one", file.path())], &fast_config());
        let _ = collect_until(&manager, Duration::from_secs(5), |m| {
            m.iter().any(|x| matches!(x, TailProgress::Ready { .. }))
        });
        manager.stop();
        let rest = manager.poll_progress(usize::MAX);
        assert!(rest.contains(&TailProgress::Stopped { source: 0 }));
    }
}
