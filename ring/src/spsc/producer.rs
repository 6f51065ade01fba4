//! producer handle for the SPSC ring buffer.

use super::shared::Shared;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// producer handle: the single writer of the buffer's tail index.
///
/// there is exactly one producer per buffer - the handle is not `Clone`,
/// and [`push`](Producer::push) takes `&mut self`, so the single-writer
/// invariant the wait-free protocol rests on is enforced by the type
/// system rather than by convention.
///
/// # example
///
/// ```
/// use tape_ring::spsc;
///
/// let (mut tx, _rx) = spsc::ring_buffer::<u64>(8);
///
/// assert!(tx.push(1));
/// assert!(tx.push(2));
/// ```
pub struct Producer<T> {
    pub(super) shared: Arc<Shared<T>>,
    /// cached consumer index; refreshed from the shared head only when the
    /// cached copy says the buffer is full.
    pub(super) cached_head: usize,
}

impl<T: Copy> Producer<T> {
    /// store one element, returning `true` iff it was stored.
    ///
    /// wait-free: a bounded number of steps regardless of what the
    /// consumer is doing. when the buffer is full the element is simply
    /// dropped and the drop counter incremented, so the producer never
    /// stalls and the backpressure stays observable.
    ///
    /// # example
    ///
    /// ```
    /// use tape_ring::spsc;
    ///
    /// let (mut tx, _rx) = spsc::ring_buffer::<u64>(4);
    ///
    /// // capacity 4 holds 3 elements
    /// assert!(tx.push(1));
    /// assert!(tx.push(2));
    /// assert!(tx.push(3));
    ///
    /// assert!(!tx.push(4));
    /// assert_eq!(tx.drop_count(), 1);
    /// ```
    pub fn push(&mut self, value: T) -> bool {
        let mask = self.shared.slots.mask();
        let tail = self.shared.tail.load(Ordering::Relaxed);
        let next_tail = (tail + 1) & mask;

        // double-check pattern - only reload the remote index when the
        // cached copy says full
        if next_tail == self.cached_head {
            self.cached_head = self.shared.head.load(Ordering::Acquire);
            if next_tail == self.cached_head {
                self.shared.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            }
        }

        // safety: we are the only writer of tail, and the slot at tail is
        // outside the consumer's readable window until the store below
        unsafe { self.shared.slots.write(tail, value) };

        // release pairs with the consumer's acquire load of tail: the slot
        // write above is visible before the new tail is
        self.shared.tail.store(next_tail, Ordering::Release);
        true
    }

    /// number of pushes refused because the buffer was full.
    ///
    /// incremented exactly once per failed push, never by a successful
    /// one; relaxed read of a monotonic counter.
    #[inline]
    pub fn drop_count(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// whether the buffer currently holds no elements (relaxed snapshot).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shared.head.load(Ordering::Relaxed) == self.shared.tail.load(Ordering::Relaxed)
    }

    /// number of slots (a power of two); the buffer holds at most one
    /// less than this.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.slots.capacity()
    }
}

impl<T> core::fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Producer")
            .field("capacity", &self.shared.slots.capacity())
            .field(
                "drop_count",
                &self.shared.dropped.load(Ordering::Relaxed),
            )
            .finish_non_exhaustive()
    }
}
