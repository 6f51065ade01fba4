//! concurrent ring buffer with a configurable overflow policy.
//!
//! a bounded lock-free queue for fixed-size, copy-by-value payloads, safe
//! under overlapping producers and consumers. nothing in it ever blocks or
//! sleeps: a full or empty buffer is reported through the return value and
//! the caller brings its own retry/backoff loop (see
//! [`wait_backoff`](tape_cpu::wait_backoff)).
//!
//! # protocol
//!
//! two monotonically advancing indices, each wrapped to the power-of-two
//! capacity with a bitmask: `tail` is the next slot to write, `head` the
//! next to read. one slot always stays unoccupied so `head == tail` means
//! empty and `next(tail) == head` means full - a buffer of capacity `C`
//! holds at most `C - 1` elements.
//!
//! every store that advances an index hands the crossed slot to the other
//! side, so it is a release store; every load of an index that decides
//! whether a slot is accessible is an acquire load. that pairing is what
//! makes the element write inside a slot visible before the index that
//! publishes it, with no full barrier anywhere.
//!
//! - `pop` commits by compare-and-swap: it copies the element at `head`
//!   speculatively, then publishes the read by advancing `head` from the
//!   observed value. a failed CAS means another consumer took the slot;
//!   the copy is discarded and the whole read-then-CAS retried. two
//!   consumers can never both return the same slot.
//! - `push` under [`Overwrite`](crate::Overwrite) makes room in a full
//!   buffer the same way: CAS `head` forward one slot, re-reading on
//!   failure, until the advance lands or the buffer is observed non-full.
//!   eviction races are therefore arbitrated by the same CAS that
//!   arbitrates pops - an eviction and a pop never both claim a slot, and
//!   every failed attempt means some other context advanced `head`, which
//!   is global progress. lock-free, not wait-free: one caller's latency is
//!   unbounded under adversarial contention.
//! - `push` publishes `tail` by compare-and-swap as well: the slot is
//!   written first, then the advance is CASed with release ordering. with
//!   a single producer the CAS never fails and this is exactly a release
//!   store. with producers racing the same slot, indices never tear and a
//!   successful push advances `tail` by exactly one, but the value in a
//!   contended slot is decided by whichever write lands last - confined to
//!   values, never memory safety, because payloads are `Copy`. pipelines
//!   that cannot tolerate that keep one producer per buffer.
//!
//! # example
//!
//! ```
//! use tape_ring::{Overwrite, RingBuffer};
//!
//! // capacity 4 holds 3 elements; the policy decides what a 4th push does
//! let rb: RingBuffer<u64> = RingBuffer::new(4);
//! assert!(rb.push(1));
//! assert!(rb.push(2));
//! assert!(rb.push(3));
//! assert!(!rb.push(4)); // Reject (the default): full, value not stored
//!
//! let rb: RingBuffer<u64, Overwrite> = RingBuffer::new(4);
//! rb.push(1);
//! rb.push(2);
//! rb.push(3);
//! assert!(rb.push(4)); // Overwrite: evicts 1
//! assert_eq!(rb.pop(), Some(2));
//! ```

use crate::policy::{OverflowPolicy, Reject};
use crate::slots::SlotArray;
use core::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use tape_cpu::CachePadded;

/// bounded lock-free ring buffer for overlapping producers and consumers.
///
/// # type parameters
///
/// * `T` - element type; `Copy` because slots are duplicated on read and
///   abandoned on eviction, which must be semantically safe
/// * `P` - overflow policy, [`Reject`] by default
///
/// capacity must be a power of two and at least 2; one slot is reserved to
/// distinguish empty from full, so usable capacity is `capacity - 1`.
pub struct RingBuffer<T, P: OverflowPolicy = Reject> {
    /// slot storage; its own heap allocation, so index traffic never lands
    /// on an element's cache line.
    slots: SlotArray<T>,

    /// next slot to write, padded onto its own cache line.
    tail: CachePadded<AtomicUsize>,

    /// next slot to read, padded onto its own cache line.
    head: CachePadded<AtomicUsize>,

    _policy: PhantomData<P>,
}

impl<T: Copy, P: OverflowPolicy> RingBuffer<T, P> {
    /// create a buffer with the given capacity.
    ///
    /// # panics
    ///
    /// panics if `capacity` is not a power of 2 or is less than 2.
    ///
    /// # example
    ///
    /// ```
    /// use tape_ring::RingBuffer;
    ///
    /// let rb: RingBuffer<u64> = RingBuffer::new(4096);
    /// assert_eq!(rb.capacity(), 4096);
    /// assert_eq!(rb.usable_capacity(), 4095);
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: SlotArray::new(capacity),
            tail: CachePadded::new(AtomicUsize::new(0)),
            head: CachePadded::new(AtomicUsize::new(0)),
            _policy: PhantomData,
        }
    }

    /// store one element, returning `true` iff it was stored.
    ///
    /// a full buffer behaves per the policy: [`Reject`] returns `false`
    /// and changes nothing; [`Overwrite`](crate::Overwrite) evicts the
    /// oldest element and returns `true`. either way the operation is
    /// atomic from the caller's view - one whole element stored, or
    /// nothing.
    pub fn push(&self, value: T) -> bool {
        let mask = self.slots.mask();
        let mut tail = self.tail.load(Ordering::Relaxed);

        loop {
            let next_tail = (tail + 1) & mask;
            let mut head = self.head.load(Ordering::Acquire);

            if next_tail == head {
                if !P::EVICT_OLDEST {
                    return false;
                }

                // make room: advance head one slot past the oldest element.
                // a failed CAS means some other context moved head; retry
                // from its value unless the buffer is no longer full.
                let mut next_head = (head + 1) & mask;
                while let Err(current) = self.head.compare_exchange(
                    head,
                    next_head,
                    Ordering::Release,
                    Ordering::Acquire,
                ) {
                    head = current;
                    if next_tail != head {
                        break;
                    }
                    next_head = (head + 1) & mask;
                }
            }

            // safety: the fullness check puts the slot at tail outside the
            // readable [head, tail) window, so no consumer reads it; racing
            // producers targeting the same slot are confined to values by
            // T: Copy (see module docs)
            unsafe { self.slots.write(tail, value) };

            // publish: release makes the slot write above visible before
            // the new tail. single producer: this CAS cannot fail.
            match self.tail.compare_exchange(
                tail,
                next_tail,
                Ordering::Release,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(current) => tail = current,
            }
        }
    }

    /// remove and return the oldest element, or `None` if the buffer is
    /// empty.
    ///
    /// the element is copied out speculatively and committed by advancing
    /// `head` with compare-and-swap, so each stored element is returned by
    /// exactly one caller - never duplicated, never lost.
    pub fn pop(&self) -> Option<T> {
        let mask = self.slots.mask();
        let mut head = self.head.load(Ordering::Acquire);

        loop {
            if head == self.tail.load(Ordering::Acquire) {
                return None;
            }

            // safety: head < tail in the wraparound sense, so the slot has
            // been written and published; the copy is speculative and only
            // the CAS below commits it
            let value = unsafe { self.slots.read(head) };
            let next_head = (head + 1) & mask;

            match self.head.compare_exchange(
                head,
                next_head,
                Ordering::Release,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(value),
                Err(current) => head = current,
            }
        }
    }

    /// copy the oldest element without removing it.
    ///
    /// # panics
    ///
    /// calling this on an empty buffer is a contract violation and panics;
    /// it is not a recoverable condition. check [`is_empty`](Self::is_empty)
    /// first when emptiness is expected.
    pub fn front(&self) -> T {
        assert!(!self.is_empty(), "front() called on an empty ring buffer");
        let head = self.head.load(Ordering::Relaxed);
        // safety: asserted non-empty, so the slot at head is written
        unsafe { self.slots.read(head) }
    }

    /// number of stored elements.
    ///
    /// a relaxed snapshot of both indices: under concurrent mutation the
    /// result may already be stale, but it is always in
    /// `[0, capacity - 1]`.
    #[inline]
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Relaxed);
        tail.wrapping_sub(head) & self.slots.mask()
    }

    /// whether the buffer holds no elements.
    ///
    /// same snapshot semantics as [`len`](Self::len): `is_empty()` is
    /// `true` exactly when `len()` would be 0.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Relaxed) == self.tail.load(Ordering::Relaxed)
    }

    /// number of slots (a power of two).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// maximum number of elements the buffer can hold at once:
    /// `capacity() - 1`.
    #[inline]
    pub fn usable_capacity(&self) -> usize {
        self.slots.capacity() - 1
    }
}

impl<T: Copy, P: OverflowPolicy> core::fmt::Debug for RingBuffer<T, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Overwrite;
    use std::sync::Arc;
    use std::thread;
    use tape_cpu::wait_backoff;

    #[test]
    fn test_basic_push_pop() {
        let rb: RingBuffer<i32> = RingBuffer::new(4);

        assert!(rb.push(10));
        assert!(rb.push(20));
        assert_eq!(rb.len(), 2);

        assert_eq!(rb.pop(), Some(10));
        assert_eq!(rb.pop(), Some(20));
        assert!(rb.is_empty());
        assert_eq!(rb.pop(), None);
    }

    #[test]
    fn test_reject_policy() {
        // capacity 4 holds 3 elements; the 4th push must fail
        let rb: RingBuffer<i32> = RingBuffer::new(4);

        assert!(rb.push(1));
        assert!(rb.push(2));
        assert!(rb.push(3));
        assert!(!rb.push(4));
        assert_eq!(rb.len(), 3);
    }

    #[test]
    fn test_reject_leaves_contents_unchanged() {
        let rb: RingBuffer<i32> = RingBuffer::new(4);

        rb.push(1);
        rb.push(2);
        rb.push(3);
        assert!(!rb.push(4));

        // the failed push stored nothing and moved nothing
        assert_eq!(rb.pop(), Some(1));
        assert_eq!(rb.pop(), Some(2));
        assert_eq!(rb.pop(), Some(3));
        assert_eq!(rb.pop(), None);
    }

    #[test]
    fn test_overwrite_policy() {
        let rb: RingBuffer<i32, Overwrite> = RingBuffer::new(4);

        rb.push(1);
        rb.push(2);
        rb.push(3);
        // buffer is now full (3 elements)

        // evicts 1, stores 4, still full
        assert!(rb.push(4));
        assert_eq!(rb.len(), 3);

        assert_eq!(rb.pop(), Some(2));
        assert_eq!(rb.len(), 2);
    }

    #[test]
    fn test_overwrite_keeps_newest_window() {
        let rb: RingBuffer<u64, Overwrite> = RingBuffer::new(4);

        // push well past capacity; the buffer should always hold the
        // newest 3 values
        for i in 0..100u64 {
            assert!(rb.push(i));
        }
        assert_eq!(rb.len(), 3);

        assert_eq!(rb.pop(), Some(97));
        assert_eq!(rb.pop(), Some(98));
        assert_eq!(rb.pop(), Some(99));
        assert_eq!(rb.pop(), None);
    }

    #[test]
    fn test_capacity_16_fills_to_15() {
        let rb: RingBuffer<i32> = RingBuffer::new(16);
        assert!(rb.is_empty());

        for i in 0..15 {
            assert!(rb.push(i));
        }
        assert_eq!(rb.len(), 15);
        assert!(!rb.is_empty());
    }

    #[test]
    fn test_front_does_not_consume() {
        let rb: RingBuffer<i32> = RingBuffer::new(4);

        rb.push(1);
        rb.push(2);

        assert_eq!(rb.front(), 1);
        assert_eq!(rb.front(), 1);
        assert_eq!(rb.len(), 2);

        assert_eq!(rb.pop(), Some(1));
        assert_eq!(rb.front(), 2);
    }

    #[test]
    #[should_panic(expected = "empty ring buffer")]
    fn test_front_on_empty_panics() {
        let rb: RingBuffer<i32> = RingBuffer::new(4);
        let _ = rb.front();
    }

    #[test]
    #[should_panic(expected = "power of 2")]
    fn test_non_power_of_two_capacity() {
        let _: RingBuffer<i32> = RingBuffer::new(100);
    }

    #[test]
    fn test_empty_iff_len_zero() {
        let rb: RingBuffer<i32> = RingBuffer::new(8);

        assert!(rb.is_empty() == (rb.len() == 0));

        for i in 0..7 {
            rb.push(i);
            assert!(rb.is_empty() == (rb.len() == 0));
        }
        while rb.pop().is_some() {
            assert!(rb.is_empty() == (rb.len() == 0));
        }
        assert!(rb.is_empty());
        assert_eq!(rb.len(), 0);
    }

    #[test]
    fn test_wrap_around() {
        let rb: RingBuffer<u64> = RingBuffer::new(4);

        // cycle the indices through the mask several times
        for round in 0..10u64 {
            for i in 0..3 {
                assert!(rb.push(round * 3 + i));
            }
            for i in 0..3 {
                assert_eq!(rb.pop(), Some(round * 3 + i));
            }
        }
        assert!(rb.is_empty());
    }

    #[test]
    fn test_usable_capacity() {
        let rb: RingBuffer<i32> = RingBuffer::new(8);
        assert_eq!(rb.capacity(), 8);
        assert_eq!(rb.usable_capacity(), 7);
    }

    #[test]
    fn test_debug() {
        let rb: RingBuffer<i32> = RingBuffer::new(8);
        rb.push(1);
        let debug = format!("{:?}", rb);
        assert!(debug.contains("RingBuffer"));
        assert!(debug.contains("len: 1"));
    }

    // one producer thread, one consumer thread, a million sequential
    // integers: every value must arrive exactly once, in order, no matter
    // how the two threads are scheduled
    #[test]
    fn test_threaded_stress() {
        const COUNT: u64 = 1_000_000;

        let rb: Arc<RingBuffer<u64>> = Arc::new(RingBuffer::new(4096));

        let producer = {
            let rb = Arc::clone(&rb);
            thread::spawn(move || {
                for i in 0..COUNT {
                    let mut iter = 0u32;
                    while !rb.push(i) {
                        wait_backoff(&mut iter);
                    }
                }
            })
        };

        let consumer = {
            let rb = Arc::clone(&rb);
            thread::spawn(move || {
                let mut results = Vec::with_capacity(COUNT as usize);
                while results.len() < COUNT as usize {
                    let mut iter = 0u32;
                    loop {
                        if let Some(v) = rb.pop() {
                            results.push(v);
                            break;
                        }
                        wait_backoff(&mut iter);
                    }
                }
                results
            })
        };

        producer.join().unwrap();
        let results = consumer.join().unwrap();

        assert_eq!(results.len(), COUNT as usize);
        for (i, v) in results.iter().enumerate() {
            assert_eq!(*v, i as u64, "out of order at index {}", i);
        }
    }

    // two consumers draining one producer: the CAS commit on head must
    // hand each element to exactly one of them
    #[test]
    fn test_two_consumers_exactly_once() {
        const COUNT: u64 = 100_000;

        let rb: Arc<RingBuffer<u64>> = Arc::new(RingBuffer::new(256));
        let taken = Arc::new(std::sync::atomic::AtomicU64::new(0));

        let producer = {
            let rb = Arc::clone(&rb);
            thread::spawn(move || {
                for i in 0..COUNT {
                    let mut iter = 0u32;
                    while !rb.push(i) {
                        wait_backoff(&mut iter);
                    }
                }
            })
        };

        let mut consumers = Vec::new();
        for _ in 0..2 {
            let rb = Arc::clone(&rb);
            let taken = Arc::clone(&taken);
            consumers.push(thread::spawn(move || {
                let mut seen = Vec::new();
                let mut iter = 0u32;
                while taken.load(Ordering::Relaxed) < COUNT {
                    if let Some(v) = rb.pop() {
                        seen.push(v);
                        taken.fetch_add(1, Ordering::Relaxed);
                        iter = 0;
                    } else {
                        wait_backoff(&mut iter);
                    }
                }
                seen
            }));
        }

        producer.join().unwrap();
        let mut all: Vec<u64> = consumers
            .into_iter()
            .flat_map(|c| c.join().unwrap())
            .collect();

        // exactly once: the union is a permutation of the input
        assert_eq!(all.len(), COUNT as usize);
        all.sort_unstable();
        for (i, v) in all.iter().enumerate() {
            assert_eq!(*v, i as u64, "lost or duplicated value near {}", i);
        }
    }
}
