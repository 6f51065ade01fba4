//! consumer handle for the SPSC ring buffer.

use super::shared::Shared;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// consumer handle: the single writer of the buffer's head index.
///
/// there is exactly one consumer per buffer - the handle is not `Clone`,
/// and [`pop`](Consumer::pop) takes `&mut self`, mirroring the producer
/// side's single-writer enforcement.
///
/// # example
///
/// ```
/// use tape_ring::spsc;
///
/// let (mut tx, mut rx) = spsc::ring_buffer::<u64>(8);
///
/// tx.push(42);
/// assert_eq!(rx.pop(), Some(42));
/// assert_eq!(rx.pop(), None);
/// ```
pub struct Consumer<T> {
    pub(super) shared: Arc<Shared<T>>,
    /// cached producer index; refreshed from the shared tail only when the
    /// cached copy says the buffer is empty.
    pub(super) cached_tail: usize,
}

impl<T: Copy> Consumer<T> {
    /// remove and return the oldest element, or `None` if the buffer is
    /// empty.
    ///
    /// wait-free: a bounded number of steps regardless of what the
    /// producer is doing.
    pub fn pop(&mut self) -> Option<T> {
        let mask = self.shared.slots.mask();
        let head = self.shared.head.load(Ordering::Relaxed);

        // double-check pattern - only reload the remote index when the
        // cached copy says empty
        if head == self.cached_tail {
            self.cached_tail = self.shared.tail.load(Ordering::Acquire);
            if head == self.cached_tail {
                return None;
            }
        }

        // safety: head is strictly behind the acquired tail, so the slot
        // has been written and published, and the producer cannot reuse it
        // until the store below frees it
        let value = unsafe { self.shared.slots.read(head) };

        // release pairs with the producer's acquire load of head: the slot
        // is free for reuse only once the read above is done
        self.shared.head.store((head + 1) & mask, Ordering::Release);
        Some(value)
    }

    /// copy the oldest element without removing it, or `None` if the
    /// buffer is empty.
    ///
    /// # example
    ///
    /// ```
    /// use tape_ring::spsc;
    ///
    /// let (mut tx, mut rx) = spsc::ring_buffer::<u64>(8);
    /// tx.push(7);
    ///
    /// assert_eq!(rx.peek(), Some(7));
    /// assert_eq!(rx.peek(), Some(7)); // still there
    /// assert_eq!(rx.pop(), Some(7));
    /// assert_eq!(rx.peek(), None);
    /// ```
    pub fn peek(&mut self) -> Option<T> {
        let head = self.shared.head.load(Ordering::Relaxed);

        if head == self.cached_tail {
            self.cached_tail = self.shared.tail.load(Ordering::Acquire);
            if head == self.cached_tail {
                return None;
            }
        }

        // safety: same window argument as pop; head is not advanced, so
        // the slot stays unavailable to the producer
        Some(unsafe { self.shared.slots.read(head) })
    }

    /// number of elements waiting to be popped (relaxed snapshot).
    #[inline]
    pub fn pending(&self) -> usize {
        let tail = self.shared.tail.load(Ordering::Relaxed);
        let head = self.shared.head.load(Ordering::Relaxed);
        tail.wrapping_sub(head) & self.shared.slots.mask()
    }

    /// whether the buffer currently holds no elements (relaxed snapshot).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shared.head.load(Ordering::Relaxed) == self.shared.tail.load(Ordering::Relaxed)
    }

    /// number of pushes the producer has had refused because the buffer
    /// was full (relaxed read of the monotonic counter).
    #[inline]
    pub fn drop_count(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

impl<T> core::fmt::Debug for Consumer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Consumer")
            .field("capacity", &self.shared.slots.capacity())
            .field(
                "drop_count",
                &self.shared.dropped.load(Ordering::Relaxed),
            )
            .finish_non_exhaustive()
    }
}
