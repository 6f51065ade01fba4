//! overflow policies for the concurrent ring buffer.
//!
//! the policy is a type parameter of [`RingBuffer`](crate::RingBuffer), so
//! the full-buffer branch is resolved at compile time - a `Reject` buffer
//! carries no eviction code at all, and the two policies can never be mixed
//! up at a call site.
//!
//! - [`Reject`]: a push into a full buffer returns `false` and changes
//!   nothing. new data is the casualty.
//! - [`Overwrite`]: a push into a full buffer evicts the oldest element to
//!   make room and returns `true`. old data is the casualty.
//!
//! which one is right depends on what the buffer carries: order flow must
//! never be silently dropped on the floor by the transport (`Reject`, let
//! the caller decide), while for a last-value market-data image the newest
//! tick is worth strictly more than the oldest (`Overwrite`).

mod sealed {
    pub trait Sealed {}
}

/// full-buffer behavior selector for [`RingBuffer`](crate::RingBuffer).
///
/// sealed: [`Reject`] and [`Overwrite`] are the only implementations.
pub trait OverflowPolicy: sealed::Sealed {
    /// whether a push into a full buffer evicts the oldest element
    /// instead of failing.
    const EVICT_OLDEST: bool;
}

/// reject pushes into a full buffer.
///
/// the push returns `false` and the buffer is untouched; the caller keeps
/// the value and chooses its own retry, drop, or backpressure policy.
pub struct Reject;

impl sealed::Sealed for Reject {}

impl OverflowPolicy for Reject {
    const EVICT_OLDEST: bool = false;
}

/// overwrite the oldest element when the buffer is full.
///
/// the push advances the read index by one slot (evicting the oldest
/// element) and then stores the new value. the push itself always returns
/// `true`; eviction is arbitrated by compare-and-swap, so it is lock-free
/// but an individual push has no bounded retry count under contention.
pub struct Overwrite;

impl sealed::Sealed for Overwrite {}

impl OverflowPolicy for Overwrite {
    const EVICT_OLDEST: bool = true;
}
