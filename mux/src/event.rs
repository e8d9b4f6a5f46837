//! Event payloads and source identities.
//!
//! Anything that travels over a stream is an [`Event`]: a payload that can be
//! handed off to another thread and outlive the call that produced it. Once
//! sent, a payload is owned by exactly one side at a time, so no synchronization
//! is needed on the payload itself.
//!
//! Every stream subscribed to a multiplexer is tagged with a [`SourceId`]: the
//! zero-based slot of the stream in subscription order. Merged events carry the
//! id of the stream they arrived on, which is what consumers route on.

/// Marker trait for event payload types.
///
/// Events must be:
/// - `'static`: No borrowed data
/// - `Send`: Ownership transfers across the producer/consumer thread boundary
///
/// There is nothing to implement: the blanket impl covers every eligible type,
/// so plain payloads like `String` or `u64` work directly.
pub trait Event: 'static + Send {}

impl<T: 'static + Send> Event for T {}

/// A source identifier. This names one subscribed stream within a multiplexer.
///
/// Ids are assigned from the subscription order passed to
/// [`Multiplexer::new`](crate::mux::Multiplexer::new): the first stream is
/// source 0, the second source 1, and so on. Ids are only meaningful relative
/// to the multiplexer that assigned them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(usize);

impl SourceId {
    /// Create a new source identifier from a subscription slot.
    #[inline]
    pub const fn new(slot: usize) -> Self {
        SourceId(slot)
    }

    /// Get the raw subscription slot.
    #[inline]
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "source#{}", self.0)
    }
}
