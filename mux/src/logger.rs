//! Bridge from the [`log`] facade onto an event stream.
//!
//! [`StreamLogger`] implements [`log::Log`] by forwarding each enabled
//! record into a stream as a [`LogMessage`] event. The consuming end can be
//! subscribed to a [`Multiplexer`](crate::mux::Multiplexer) like any other
//! source, so a host drains its own log output as one more event stream
//! instead of interleaving writes to stderr.
//!
//! Logging must never stall or crash the thread that logs: records are
//! forwarded with a non-blocking send and quietly dropped when a bounded
//! stream is full or the consuming side is gone.

use log::{Level, Metadata, Record};

use crate::stream::{Producer, Stream, stream};

/// A captured log record, carried over a stream as an ordinary event.
#[derive(Debug)]
pub struct LogMessage {
    pub level: Level,
    pub message: String,
}

/// A [`log::Log`] backend that forwards records into a stream.
///
/// Records above `max_level` are filtered out before formatting. The rest
/// are formatted once and sent with [`Producer::try_send`], so the logging
/// path never blocks and never panics.
pub struct StreamLogger {
    producer: Producer<LogMessage>,
    max_level: Level,
}

impl StreamLogger {
    /// Creates a logger forwarding onto an existing producer.
    ///
    /// Pair with [`stream_with_capacity`](crate::stream::stream_with_capacity)
    /// to cap how many unread records can pile up; overflow is shed, not
    /// buffered.
    pub fn new(producer: Producer<LogMessage>, max_level: Level) -> Self {
        StreamLogger {
            producer,
            max_level,
        }
    }

    /// Creates a logger on a fresh unbounded stream, returning both ends.
    pub fn with_stream(max_level: Level) -> (Self, Stream<LogMessage>) {
        let (producer, events) = stream();
        (Self::new(producer, max_level), events)
    }
}

impl log::Log for StreamLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = self.producer.try_send(LogMessage {
                level: record.metadata().level(),
                message: format!("{}", record.args()),
            });
        }
    }

    fn flush(&self) {}
}
