use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

/// A single captured log entry.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: log::Level,
    pub target: String,
    pub message: String,
    pub timestamp: Instant,
}

/// Ring buffer of captured warnings and errors.
#[derive(Debug)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    max_capacity: usize,
}

impl LogBuffer {
    fn new(max_capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_capacity.min(1024)),
            max_capacity,
        }
    }

    pub fn entries(&self) -> &VecDeque<LogEntry> {
        &self.entries
    }

    /// Number of captured entries at `level` or more severe.
    pub fn count_at_least(&self, level: log::Level) -> usize {
        self.entries.iter().filter(|e| e.level <= level).count()
    }

    fn push(&mut self, entry: LogEntry) {
        if self.max_capacity == 0 {
            return;
        }
        if self.entries.len() >= self.max_capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }
}

/// Shared handle to the capture buffer.
pub type LogHandle = Arc<Mutex<LogBuffer>>;

/// Logger that forwards to `env_logger` and keeps warnings and errors for
/// the end-of-session summary.
struct LogCapture {
    inner: env_logger::Logger,
    buffer: LogHandle,
}

impl log::Log for LogCapture {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.inner.enabled(record.metadata()) {
            return;
        }
        self.inner.log(record);

        if record.level() <= log::Level::Warn {
            self.buffer.lock().push(LogEntry {
                level: record.level(),
                target: record.target().to_owned(),
                message: format!("{}", record.args()),
                timestamp: Instant::now(),
            });
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Installs the capturing logger.
///
/// `RUST_LOG` wins over `default_filter`. Fails if a logger is already set.
pub fn install(default_filter: &str, capacity: usize) -> Result<LogHandle, log::SetLoggerError> {
    let buffer = Arc::new(Mutex::new(LogBuffer::new(capacity)));
    let inner =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
            .format_timestamp_millis()
            .build();
    let max_level = inner.filter();

    log::set_boxed_logger(Box::new(LogCapture {
        inner,
        buffer: Arc::clone(&buffer),
    }))?;
    log::set_max_level(max_level);
    Ok(buffer)
}
