//! Fan-in multiplexer over a fixed set of event streams.
//!
//! This module provides [`Multiplexer`], which merges N subscribed streams
//! into a single sequence of `(SourceId, event)` pairs that one consumer can
//! drain without knowing or caring which producer is fastest.
//!
//! # Merge discipline
//!
//! - **Per-source order**: events from any one stream come out in the order
//!   they were sent
//! - **Fair tie-break**: when several streams are ready at once, the winner
//!   is picked uniformly at random, so no ready stream is starved
//! - **Exactly once**: every event sent on a subscribed stream is delivered
//!   exactly once; closure never discards buffered events
//!
//! # Lifecycle
//!
//! The subscription set is fixed at construction, and the multiplexer walks
//! a one-way state machine from there:
//!
//! - [`State::Running`]: at least one stream is open. A stream that closes
//!   is drained to its last buffered event and then retired from the
//!   rotation; the remaining streams are unaffected.
//! - [`State::Drained`]: every stream has closed and drained.
//!   [`try_next()`](Multiplexer::try_next) reports this as
//!   [`Polled::Closed`], repeatably.
//! - [`State::Terminated`]: [`next()`](Multiplexer::next) has returned the
//!   terminal `None`, exactly once. Any call after that is a programmer
//!   error and panics.
//!
//! # Example
//!
//! ```rust,ignore
//! use conflux::{stream, Multiplexer};
//!
//! let (sms, sms_events) = stream::<String>();
//! let (email, email_events) = stream::<String>();
//!
//! std::thread::spawn(move || {
//!     sms.send("sms: meeting moved to 10:00".to_string());
//!     sms.close();
//! });
//! std::thread::spawn(move || {
//!     email.send("email: quarterly report attached".to_string());
//!     email.close();
//! });
//!
//! let mut mux = Multiplexer::new(vec![sms_events, email_events]).unwrap();
//! while let Some((source, message)) = mux.next() {
//!     println!("{source}: {message}");
//! }
//! ```

use std::fmt;

use crossbeam::channel::Select;
use fixedbitset::FixedBitSet;
use log::debug;

use crate::event::{Event, SourceId};
use crate::stream::Stream;

/// Lifecycle of a multiplexer. Transitions are one-way:
/// `Running` -> `Drained` -> `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// At least one subscribed stream has not closed yet.
    Running,
    /// Every stream has closed and every buffered event has been delivered;
    /// the terminal signal has not been returned by `next` yet.
    Drained,
    /// `next` returned the terminal signal. Any further call is a bug.
    Terminated,
}

/// Outcome of a non-blocking poll via [`Multiplexer::try_next`].
#[derive(Debug, PartialEq)]
pub enum Polled<E: Event> {
    /// An event was available, tagged with the stream it arrived on.
    Ready(SourceId, E),
    /// No event is available right now, but at least one stream is open.
    Empty,
    /// Every stream has closed and drained. Polling again returns `Closed`
    /// again; the terminal signal itself belongs to [`Multiplexer::next`].
    Closed,
}

/// An error indicating a multiplexer was asked to merge zero streams.
///
/// A multiplexer over nothing would block forever on its first `next`, so
/// the empty subscription set is refused at construction.
#[derive(Debug, Clone)]
pub struct SubscribeError;

impl fmt::Display for SubscribeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "cannot multiplex an empty set of streams")
    }
}

/// Merges a fixed set of event streams into one consumable sequence.
///
/// Each delivered event is tagged with the [`SourceId`] of the stream it
/// arrived on: the first stream in the subscription vector is source 0, the
/// second source 1, and so on. Streams cannot be added or removed after
/// construction.
///
/// # Consuming
///
/// [`next()`](Self::next) blocks until an event or the terminal signal;
/// [`try_next()`](Self::try_next) returns [`Polled::Empty`] instead of
/// waiting, for callers that interleave the drain with other work.
///
/// # Liveness
///
/// The multiplexer trusts every producer to eventually close its stream. A
/// producer that stays open and silent parks `next` indefinitely; nothing
/// here detects that.
#[derive(Debug)]
pub struct Multiplexer<E: Event> {
    /// Subscribed streams, indexed by source id. Fixed for the lifetime.
    streams: Vec<Stream<E>>,
    /// One bit per stream, set while the stream has not been observed closed.
    open: FixedBitSet,
    /// Lifecycle state. `Terminated` makes any further call panic.
    state: State,
}

impl<E: Event> Multiplexer<E> {
    /// Creates a multiplexer over the given streams.
    ///
    /// Subscription order assigns the source ids: `streams[i]` becomes
    /// source `i`.
    ///
    /// # Errors
    ///
    /// Returns [`SubscribeError`] if `streams` is empty.
    pub fn new(streams: Vec<Stream<E>>) -> Result<Self, SubscribeError> {
        if streams.is_empty() {
            return Err(SubscribeError);
        }
        let mut open = FixedBitSet::with_capacity(streams.len());
        open.insert_range(..);
        Ok(Multiplexer {
            streams,
            open,
            state: State::Running,
        })
    }

    /// Waits for the next event from any open stream.
    ///
    /// Blocks until one of the subscribed streams has an event and delivers
    /// it tagged with the [`SourceId`] it arrived on. When several streams
    /// are ready, the winner is picked uniformly at random. A stream
    /// observed closed is retired along the way without returning.
    ///
    /// Returns `None` exactly once, after every stream has closed and every
    /// buffered event has been delivered. The terminal signal moves the
    /// multiplexer to [`State::Terminated`].
    ///
    /// # Panics
    ///
    /// Panics if called again after the terminal `None`.
    pub fn next(&mut self) -> Option<(SourceId, E)> {
        assert!(
            self.state != State::Terminated,
            "next() called after the multiplexer delivered its terminal signal"
        );
        loop {
            if self.open.is_clear() {
                self.mark_drained();
                self.state = State::Terminated;
                return None;
            }

            let mut select = Select::new();
            let mut slots = Vec::with_capacity(self.open_count());
            for slot in self.open.ones() {
                select.recv(self.streams[slot].receiver());
                slots.push(slot);
            }

            let op = select.select();
            let slot = slots[op.index()];
            match op.recv(self.streams[slot].receiver()) {
                Ok(event) => return Some((SourceId::new(slot), event)),
                // Closed and fully drained: retire the slot and re-select.
                Err(_) => self.retire(slot),
            }
        }
    }

    /// Polls for an event without blocking.
    ///
    /// Returns [`Polled::Ready`] when an event is available right now,
    /// [`Polled::Empty`] when delivery would have to wait, and
    /// [`Polled::Closed`] once every stream has closed and drained.
    ///
    /// `Closed` does not consume the terminal signal: it can be returned any
    /// number of times, and a later [`next()`](Self::next) still gets its
    /// one `None`. Poll loops are free to stop on `Closed` without racing
    /// the blocking path.
    ///
    /// # Panics
    ///
    /// Panics if called after [`next()`](Self::next) returned the terminal
    /// `None`.
    pub fn try_next(&mut self) -> Polled<E> {
        assert!(
            self.state != State::Terminated,
            "try_next() called after the multiplexer delivered its terminal signal"
        );
        loop {
            if self.open.is_clear() {
                self.mark_drained();
                return Polled::Closed;
            }

            let mut select = Select::new();
            let mut slots = Vec::with_capacity(self.open_count());
            for slot in self.open.ones() {
                select.recv(self.streams[slot].receiver());
                slots.push(slot);
            }

            let op = match select.try_select() {
                Ok(op) => op,
                Err(_) => return Polled::Empty,
            };
            let slot = slots[op.index()];
            match op.recv(self.streams[slot].receiver()) {
                Ok(event) => return Polled::Ready(SourceId::new(slot), event),
                // Closed and fully drained: retire the slot and re-select,
                // other streams may still be ready.
                Err(_) => self.retire(slot),
            }
        }
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Number of subscribed streams, open or closed.
    #[inline]
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Number of streams that have not been observed closed yet.
    #[inline]
    pub fn open_count(&self) -> usize {
        self.open.count_ones(..)
    }

    /// Drops a closed and drained stream from the rotation.
    fn retire(&mut self, slot: usize) {
        self.open.set(slot, false);
        debug!("Stream closed after draining: {}", SourceId::new(slot));
    }

    /// Records the transition into `Drained` the first time every stream is
    /// observed closed.
    fn mark_drained(&mut self) {
        if self.state == State::Running {
            self.state = State::Drained;
            debug!("All {} streams closed and drained", self.streams.len());
        }
    }
}
