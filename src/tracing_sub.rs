//! Tracing output for the dashboard.
//!
//! The engine logs overlay open/close, dismissal reasons, portal lifecycle,
//! focus restoration and debounce firings. While the terminal is in the
//! alternate screen those lines must not reach stderr, so the subscriber
//! writes into the global [`LogHandle`](crate::log_buffer::LogHandle) and the
//! dashboard's log pane shows its tail on every `LogTailDue`. Before a buffer
//! is registered (tests, early startup) output goes to stderr.

use std::io::{self, Write};

use tracing::Level;

use crate::log_buffer::{LogHandle, LogWriter, global_log};

/// Per-event writer picked by [`LogSink`].
pub struct SinkWriter {
    inner: SinkTarget,
}

enum SinkTarget {
    Tail(LogWriter),
    Stderr(io::Stderr),
}

impl SinkWriter {
    fn to_log(handle: &LogHandle) -> Self {
        SinkWriter {
            inner: SinkTarget::Tail(handle.writer()),
        }
    }

    fn to_stderr() -> Self {
        SinkWriter {
            inner: SinkTarget::Stderr(io::stderr()),
        }
    }
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            SinkTarget::Tail(w) => w.write(buf),
            SinkTarget::Stderr(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            SinkTarget::Tail(w) => w.flush(),
            SinkTarget::Stderr(s) => s.flush(),
        }
    }
}

/// `MakeWriter` that resolves the log-tail buffer per event, so a buffer
/// registered after the subscriber was installed still receives lines.
#[derive(Clone, Debug, Default)]
pub struct LogSink {
    fixed: Option<LogHandle>,
}

impl LogSink {
    /// Sink bound to `handle` instead of the global buffer.
    pub fn with_handle(handle: LogHandle) -> Self {
        Self {
            fixed: Some(handle),
        }
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogSink {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        match self.fixed.clone().or_else(global_log) {
            Some(handle) => SinkWriter::to_log(&handle),
            None => SinkWriter::to_stderr(),
        }
    }
}

/// Install the global subscriber. Lines are plain text with no ANSI codes
/// or timestamps, as they are drawn inside the log pane. Later calls are
/// no-ops.
pub fn init_with_level(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(LogSink::default())
        .with_target(false)
        .with_thread_names(false)
        .with_ansi(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_land_in_the_log_tail() {
        let log = LogHandle::new(16);
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_writer(LogSink::with_handle(log.clone()))
            .with_target(false)
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(overlay = "search", "overlay opened");
            tracing::trace!("filtered out");
        });
        let tail = log.tail(4);
        assert_eq!(tail.len(), 1);
        assert!(tail[0].contains("overlay opened"), "{tail:?}");
        assert!(tail[0].contains("search"), "{tail:?}");
    }
}
