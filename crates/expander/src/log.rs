//! Append-only log shared between the selection state and the supervisor.

use crate::types::{LogLevel, LogLine};
use parking_lot::Mutex;
use std::sync::Arc;

/// Callback invoked with every line as it is appended.
pub type LogObserver = dyn Fn(&LogLine) + Send + Sync;

/// Ordered sequence of whole log lines.
///
/// Cloning yields another handle to the same buffer. Each line is stored
/// under one lock acquisition, so lines from concurrent writers never
/// interleave.
#[derive(Clone, Default)]
pub struct LogBuffer {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    lines: Mutex<Vec<LogLine>>,
    observer: Option<Box<LogObserver>>,
    // Serializes store + notify so observers see lines in buffer order
    notify: Mutex<()>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer that forwards every appended line to `observer`.
    ///
    /// The observer runs after the line is stored, in buffer order, so it may
    /// read the buffer (`len`, `snapshot`, `texts`). It must not append to the
    /// same buffer: appends are serialized while it runs, so that deadlocks.
    pub fn with_observer<F>(observer: F) -> Self
    where
        F: Fn(&LogLine) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                lines: Mutex::new(Vec::new()),
                observer: Some(Box::new(observer)),
                notify: Mutex::new(()),
            }),
        }
    }

    pub fn push(&self, line: LogLine) {
        match &self.inner.observer {
            Some(observer) => {
                let _order = self.inner.notify.lock();
                self.inner.lines.lock().push(line.clone());
                observer(&line);
            }
            None => self.inner.lines.lock().push(line),
        }
    }

    pub fn append(&self, level: LogLevel, text: impl Into<String>) {
        self.push(LogLine::new(level, text));
    }

    pub fn clear(&self) {
        self.inner.lines.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lines.lock().is_empty()
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Vec<LogLine> {
        self.inner.lines.lock().clone()
    }

    /// Text of every line at `level`, in order.
    pub fn texts(&self, level: LogLevel) -> Vec<String> {
        self.inner
            .lines
            .lock()
            .iter()
            .filter(|line| line.level == level)
            .map(|line| line.text.clone())
            .collect()
    }
}

impl std::fmt::Debug for LogBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogBuffer")
            .field("lines", &self.len())
            .finish()
    }
}
