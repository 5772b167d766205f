//! Progress events for long-running import phases.
//!
//! Phases: `parse`, `chunk`, `upload`.

use std::sync::Arc;
use std::time::Instant;

/// One step of progress within a phase.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Phase of the operation: "parse", "chunk", "upload"
    pub phase: String,

    /// Units done so far (verses, chapters, batches)
    pub current: u64,

    /// Total expected work, when known
    pub total: Option<u64>,

    /// Percentage complete (0.0 - 100.0)
    pub percentage: Option<f64>,

    pub message: String,

    /// Seconds since the reporter was created
    pub elapsed_secs: Option<f64>,
}

impl ProgressEvent {
    pub fn new(
        phase: impl Into<String>,
        current: u64,
        total: Option<u64>,
        message: impl Into<String>,
    ) -> Self {
        let percentage = total.map(|t| {
            if t > 0 {
                (current as f64 / t as f64) * 100.0
            } else {
                0.0
            }
        });

        Self {
            phase: phase.into(),
            current,
            total,
            percentage,
            message: message.into(),
            elapsed_secs: None,
        }
    }

    pub fn with_elapsed(mut self, elapsed_secs: f64) -> Self {
        self.elapsed_secs = Some(elapsed_secs);
        self
    }

    /// Format as a single user-facing line, e.g. `[upload] 3/10 (30%) - ...`.
    pub fn format_simple(&self) -> String {
        let progress = match self.total {
            Some(total) => format!("{}/{}", self.current, total),
            None => format!("{}", self.current),
        };
        let pct = match self.percentage {
            Some(p) => format!(" ({:.0}%)", p),
            None => String::new(),
        };
        format!("[{}] {}{} - {}", self.phase, progress, pct, self.message)
    }
}

pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Emits progress events through an optional callback.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    start_time: Arc<Instant>,
}

impl ProgressReporter {
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            start_time: Arc::new(Instant::now()),
        }
    }

    /// A reporter that drops every event.
    pub fn noop() -> Self {
        Self {
            callback: None,
            start_time: Arc::new(Instant::now()),
        }
    }

    pub fn emit(&self, event: ProgressEvent) {
        if let Some(callback) = &self.callback {
            let elapsed = self.start_time.elapsed().as_secs_f64();
            let event = event.with_elapsed(elapsed);

            tracing::debug!(
                phase = %event.phase,
                current = event.current,
                total = ?event.total,
                message = %event.message,
                elapsed_secs = elapsed,
                "Progress event"
            );

            callback(event);
        }
    }

    pub fn parse(&self, verses: u64, source: &str) {
        self.emit(ProgressEvent::new(
            "parse",
            verses,
            None,
            format!("read {}", source),
        ));
    }

    pub fn chunk(&self, chapters: u64, total: Option<u64>, chunks_created: usize) {
        self.emit(ProgressEvent::new(
            "chunk",
            chapters,
            total,
            format!("{} chunks created", chunks_created),
        ));
    }

    pub fn upload(&self, batch: u64, total: u64, imported: usize, failed: usize) {
        self.emit(ProgressEvent::new(
            "upload",
            batch,
            Some(total),
            format!("{} imported, {} failed", imported, failed),
        ));
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::noop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_progress_event_format() {
        let event = ProgressEvent::new("upload", 5, Some(10), "5 imported, 0 failed");
        let formatted = event.format_simple();
        assert_eq!(formatted, "[upload] 5/10 (50%) - 5 imported, 0 failed");
    }

    #[test]
    fn test_progress_event_without_total() {
        let event = ProgressEvent::new("parse", 31102, None, "read kjv.csv");
        assert_eq!(event.format_simple(), "[parse] 31102 - read kjv.csv");
    }

    #[test]
    fn test_progress_reporter_emit() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();

        let reporter = ProgressReporter::new(Arc::new(move |event| {
            events_clone.lock().unwrap().push(event);
        }));
        reporter.chunk(3, Some(10), 12);

        let captured = events.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].phase, "chunk");
        assert_eq!(captured[0].current, 3);
        assert!(captured[0].elapsed_secs.is_some());
    }

    #[test]
    fn test_noop_reporter() {
        ProgressReporter::noop().upload(1, 1, 10, 0);
    }
}
