//! Single-consumer dispatch loop over a multiplexer.
//!
//! [`Consumer`] owns a [`Multiplexer`] and drains it to the terminal signal,
//! routing every event to the handler registered for its source, or to a
//! catch-all fallback for sources without one. Handlers run on the calling
//! thread, one at a time, in delivery order; shared state like a
//! [`CounterStore`](crate::counter::CounterStore) is captured by the
//! closures themselves.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use conflux::{stream, Consumer, CounterStore, Multiplexer, SourceId};
//!
//! let (sms, sms_events) = stream::<String>();
//! // ... spawn producers, close streams ...
//!
//! let store = Arc::new(CounterStore::new());
//! let counts = Arc::clone(&store);
//!
//! let mux = Multiplexer::new(vec![sms_events]).unwrap();
//! let delivered = Consumer::new(mux, |source, _| println!("unrouted {source}"))
//!     .on(SourceId::new(0), move |message: String| {
//!         println!("{message}");
//!         counts.increment("sms");
//!     })
//!     .run();
//! ```

use crate::event::{Event, SourceId};
use crate::mux::Multiplexer;

type Handler<E> = Box<dyn FnMut(E)>;
type Fallback<E> = Box<dyn FnMut(SourceId, E)>;

/// Drains a multiplexer to its terminal signal, dispatching by source.
///
/// Built in builder style: construct with the fallback, register per-source
/// handlers with [`on()`](Self::on), then [`run()`](Self::run) to consume
/// the multiplexer. The consumer holds no state of its own beyond the
/// routing table; everything the handlers accumulate lives in their
/// captures.
pub struct Consumer<E: Event> {
    mux: Multiplexer<E>,
    /// Per-source handlers, indexed by subscription slot.
    handlers: Vec<Option<Handler<E>>>,
    /// Catch-all for sources with no dedicated handler.
    fallback: Fallback<E>,
}

impl<E: Event> Consumer<E> {
    /// Creates a consumer over `mux` with a catch-all fallback.
    ///
    /// The fallback receives every event whose source has no handler
    /// registered via [`on()`](Self::on), tagged with its [`SourceId`].
    pub fn new<F>(mux: Multiplexer<E>, fallback: F) -> Self
    where
        F: FnMut(SourceId, E) + 'static,
    {
        let handlers = (0..mux.stream_count()).map(|_| None).collect();
        Consumer {
            mux,
            handlers,
            fallback: Box::new(fallback),
        }
    }

    /// Registers the handler for one source. The last registration wins.
    ///
    /// # Panics
    ///
    /// Panics if `source` does not name a stream the multiplexer merges.
    /// Routing a source that cannot exist is a wiring error.
    pub fn on<H>(mut self, source: SourceId, handler: H) -> Self
    where
        H: FnMut(E) + 'static,
    {
        assert!(
            source.index() < self.handlers.len(),
            "no subscribed stream for {}: the multiplexer merges {} streams",
            source,
            self.handlers.len()
        );
        self.handlers[source.index()] = Some(Box::new(handler));
        self
    }

    /// Drains the multiplexer to the terminal signal.
    ///
    /// Every delivered event is dispatched to its source's handler or the
    /// fallback, in delivery order. Returns the total number of events
    /// dispatched.
    pub fn run(mut self) -> u64 {
        let mut delivered = 0;
        while let Some((source, event)) = self.mux.next() {
            match self.handlers[source.index()].as_mut() {
                Some(handler) => handler(event),
                None => (self.fallback)(source, event),
            }
            delivered += 1;
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::counter::CounterStore;
    use crate::stream::stream;

    // ==================== Routing ====================

    #[test]
    fn dispatches_by_source() {
        let (a, a_events) = stream::<&str>();
        let (b, b_events) = stream::<&str>();
        a.send("a1");
        b.send("b1");
        a.close();
        b.close();

        let mux = Multiplexer::new(vec![a_events, b_events]).unwrap();
        let from_a = Rc::new(RefCell::new(Vec::new()));
        let from_b = Rc::new(RefCell::new(Vec::new()));

        let sink_a = Rc::clone(&from_a);
        let sink_b = Rc::clone(&from_b);
        let delivered = Consumer::new(mux, |source, event| {
            panic!("unrouted {source}: {event}");
        })
        .on(SourceId::new(0), move |event| {
            sink_a.borrow_mut().push(event);
        })
        .on(SourceId::new(1), move |event| {
            sink_b.borrow_mut().push(event);
        })
        .run();

        assert_eq!(delivered, 2);
        assert_eq!(*from_a.borrow(), ["a1"]);
        assert_eq!(*from_b.borrow(), ["b1"]);
    }

    #[test]
    fn fallback_handles_unrouted_sources() {
        let (a, a_events) = stream::<u32>();
        let (b, b_events) = stream::<u32>();
        a.send(1);
        b.send(2);
        a.close();
        b.close();

        let mux = Multiplexer::new(vec![a_events, b_events]).unwrap();
        let routed = Rc::new(RefCell::new(Vec::new()));
        let spilled = Rc::new(RefCell::new(Vec::new()));

        let routed_sink = Rc::clone(&routed);
        let spilled_sink = Rc::clone(&spilled);
        let delivered = Consumer::new(mux, move |source, event| {
            spilled_sink.borrow_mut().push((source, event));
        })
        .on(SourceId::new(0), move |event| {
            routed_sink.borrow_mut().push(event);
        })
        .run();

        assert_eq!(delivered, 2);
        assert_eq!(*routed.borrow(), [1]);
        assert_eq!(*spilled.borrow(), [(SourceId::new(1), 2)]);
    }

    #[test]
    fn later_registration_wins() {
        let (producer, events) = stream::<u32>();
        producer.send(1);
        producer.close();

        let mux = Multiplexer::new(vec![events]).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let delivered = Consumer::new(mux, |_, _| {})
            .on(SourceId::new(0), |_| panic!("replaced handler must not run"))
            .on(SourceId::new(0), move |event| {
                sink.borrow_mut().push(event);
            })
            .run();

        assert_eq!(delivered, 1);
        assert_eq!(*seen.borrow(), [1]);
    }

    #[test]
    #[should_panic(expected = "no subscribed stream for source#5")]
    fn registering_an_unknown_source_panics() {
        let (_producer, events) = stream::<u32>();
        let mux = Multiplexer::new(vec![events]).unwrap();

        let _ = Consumer::new(mux, |_, _| {}).on(SourceId::new(5), |_| {}); // Should panic
    }

    // ==================== Draining ====================

    #[test]
    fn run_over_closed_streams_returns_zero() {
        let (producer, events) = stream::<u32>();
        producer.close();

        let mux = Multiplexer::new(vec![events]).unwrap();

        let delivered = Consumer::new(mux, |_, _| {}).run();

        assert_eq!(delivered, 0);
    }

    #[test]
    fn handlers_record_into_a_shared_counter() {
        let (sms, sms_events) = stream::<String>();
        let (email, email_events) = stream::<String>();

        let producers = [
            thread::spawn(move || {
                for n in 0..3 {
                    sms.send(format!("sms {n}"));
                }
            }),
            thread::spawn(move || {
                for n in 0..2 {
                    email.send(format!("email {n}"));
                }
            }),
        ];

        let mux = Multiplexer::new(vec![sms_events, email_events]).unwrap();
        let store = Arc::new(CounterStore::new());
        let sms_counts = Arc::clone(&store);
        let email_counts = Arc::clone(&store);

        let delivered = Consumer::new(mux, |source, _: String| panic!("unrouted {source}"))
            .on(SourceId::new(0), move |_| sms_counts.increment("sms"))
            .on(SourceId::new(1), move |_| email_counts.increment("email"))
            .run();

        assert_eq!(delivered, 5);
        assert_eq!(store.get("sms"), 3);
        assert_eq!(store.get("email"), 2);
        for handle in producers {
            handle.join().unwrap();
        }
    }
}
