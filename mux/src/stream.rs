//! Single-producer event streams.
//!
//! A stream is created by [`stream()`] or [`stream_with_capacity()`], which
//! return its two ends as a pair: a [`Producer`] for the thread generating
//! events and a [`Stream`] to subscribe to a
//! [`Multiplexer`](crate::mux::Multiplexer). Events arrive on the consuming
//! side in the order they were sent.
//!
//! # Buffering
//!
//! - [`stream()`] is unbounded: `send` never blocks. A producer that outruns
//!   its consumer grows the buffer without limit; that tradeoff is accepted
//!   here, pick a capacity when it is not.
//! - [`stream_with_capacity(n)`](stream_with_capacity) keeps at most `n`
//!   events in flight: `send` blocks while the buffer is full, which slows an
//!   over-eager producer down to its consumer's pace. Capacity 0 is a
//!   rendezvous handoff where every `send` waits for the consuming side to
//!   take the event.
//!
//! # Closure
//!
//! A stream closes when its producer is done: explicitly via
//! [`Producer::close`], which consumes the handle so closing twice does not
//! compile, or implicitly when the producer drops. Closure is one-way and is
//! observed on the consuming side only after every buffered event has been
//! delivered, so no event is lost to a close.
//!
//! # Example
//!
//! ```rust,ignore
//! use conflux::stream;
//!
//! let (producer, events) = stream::<String>();
//!
//! std::thread::spawn(move || {
//!     producer.send("first".to_string());
//!     producer.send("second".to_string());
//!     producer.close();
//! });
//!
//! // Subscribe `events` to a Multiplexer to consume them.
//! ```

use crossbeam::channel::{bounded, unbounded, Receiver, Sender};

use crate::event::Event;

/// Creates an unbounded stream.
///
/// The producer never blocks; a producer that outruns its consumer grows the
/// buffer without limit.
pub fn stream<E: Event>() -> (Producer<E>, Stream<E>) {
    let (sender, receiver) = unbounded();
    (Producer { sender }, Stream { receiver })
}

/// Creates a bounded stream holding at most `capacity` events in flight.
///
/// `send` blocks while the buffer is full. A capacity of 0 turns every send
/// into a rendezvous with the consuming side.
pub fn stream_with_capacity<E: Event>(capacity: usize) -> (Producer<E>, Stream<E>) {
    let (sender, receiver) = bounded(capacity);
    (Producer { sender }, Stream { receiver })
}

/// The producing end of a stream.
///
/// Each stream has exactly one producer. The handle is not clonable: one
/// thread owns the sending side, which is what makes per-stream ordering
/// meaningful.
pub struct Producer<E: Event> {
    sender: Sender<E>,
}

impl<E: Event> Producer<E> {
    /// Sends an event, blocking while a bounded stream is full.
    ///
    /// # Panics
    ///
    /// Panics if the stream is closed because the consuming side was dropped.
    /// Writing into a stream nobody can ever read is a wiring error, and it
    /// fails loudly in the producing thread.
    pub fn send(&self, event: E) {
        if self.sender.send(event).is_err() {
            panic!("send on a closed stream: the consuming side was dropped");
        }
    }

    /// Attempts to send without blocking.
    ///
    /// Returns `false` when the event was not accepted, either because a
    /// bounded stream is full or because the consuming side was dropped. The
    /// event is discarded in that case.
    pub fn try_send(&self, event: E) -> bool {
        self.sender.try_send(event).is_ok()
    }

    /// Closes the stream, consuming the producer.
    ///
    /// Buffered events are still delivered; the consuming side observes the
    /// closure only after draining them. Dropping the producer has the same
    /// effect; `close` exists to make the handoff explicit at the end of a
    /// producing thread.
    pub fn close(self) {
        drop(self);
    }
}

/// The consuming end of a stream, ready to subscribe to a
/// [`Multiplexer`](crate::mux::Multiplexer).
///
/// Events are not read from a stream directly: a stream that should be
/// drained on its own is a one-stream multiplexer.
#[derive(Debug)]
pub struct Stream<E: Event> {
    receiver: Receiver<E>,
}

impl<E: Event> Stream<E> {
    /// Returns the number of events currently buffered.
    #[inline]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if no events are currently buffered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// The underlying channel receiver, for the multiplexer to select over.
    #[inline]
    pub(crate) fn receiver(&self) -> &Receiver<E> {
        &self.receiver
    }
}
