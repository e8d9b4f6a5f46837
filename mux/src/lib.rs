//! Fan-in event multiplexing over producer streams, with a synchronized
//! counter store for the consuming side.
//!
//! `conflux` merges N independently-produced event streams into one sequence
//! that a single consumer drains, and pairs that with a keyed counter store
//! that any number of threads can update without losing a count. Producers
//! never talk to each other and never share the consumer's state; everything
//! crosses on streams, and the one shared structure sits behind one lock.
//!
//! # The pieces
//!
//! - [`stream()`] / [`stream_with_capacity()`] build a single-producer
//!   stream and hand back its [`Producer`] and [`Stream`] ends
//! - [`Multiplexer`] merges subscribed streams into `(SourceId, event)`
//!   pairs, preserving per-source order and breaking ties fairly
//! - [`Consumer`] drains a multiplexer to its terminal signal, dispatching
//!   each event by the source it arrived on
//! - [`CounterStore`] counts named things under a single exclusive lock
//! - [`StreamLogger`] turns the process's own `log` output into one more
//!   event stream
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::thread;
//!
//! use conflux::{Consumer, CounterStore, Multiplexer, SourceId, stream};
//!
//! let (sms, sms_events) = stream::<String>();
//! let (email, email_events) = stream::<String>();
//!
//! thread::spawn(move || {
//!     sms.send("sms: meeting moved to 10:00".to_string());
//!     sms.close();
//! });
//! thread::spawn(move || {
//!     email.send("email: quarterly report attached".to_string());
//!     email.close();
//! });
//!
//! let store = Arc::new(CounterStore::new());
//! let sms_counts = Arc::clone(&store);
//! let email_counts = Arc::clone(&store);
//!
//! let mux = Multiplexer::new(vec![sms_events, email_events]).unwrap();
//! let delivered = Consumer::new(mux, |source, message: String| {
//!     println!("unrouted {source}: {message}");
//! })
//! .on(SourceId::new(0), move |message| {
//!     println!("{message}");
//!     sms_counts.increment("sms");
//! })
//! .on(SourceId::new(1), move |message| {
//!     println!("{message}");
//!     email_counts.increment("email");
//! })
//! .run();
//!
//! assert_eq!(delivered, 2);
//! assert_eq!(store.get("sms"), 1);
//! assert_eq!(store.get("email"), 1);
//! ```

pub mod consumer;
pub mod counter;
pub mod event;
pub mod logger;
pub mod mux;
pub mod stream;

pub use consumer::Consumer;
pub use counter::CounterStore;
pub use event::{Event, SourceId};
pub use logger::{LogMessage, StreamLogger};
pub use mux::{Multiplexer, Polled, State, SubscribeError};
pub use stream::{Producer, Stream, stream, stream_with_capacity};
