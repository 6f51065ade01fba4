//! state shared between the SPSC producer and consumer handles.

use crate::slots::SlotArray;
use std::sync::atomic::{AtomicU64, AtomicUsize};
use tape_cpu::CachePadded;

/// shared state behind the producer/consumer handle pair.
///
/// each index has exactly one writer: `tail` belongs to the producer,
/// `head` to the consumer. the owner publishes with release and the other
/// side observes with acquire - that single-writer handshake is the whole
/// protocol, and why no compare-and-swap appears anywhere in this variant.
/// all three counters sit on their own cache lines so producer-side and
/// consumer-side traffic never invalidate each other.
pub(super) struct Shared<T> {
    /// slot storage (its own heap allocation).
    pub(super) slots: SlotArray<T>,
    /// next slot to write; written only by the producer.
    pub(super) tail: CachePadded<AtomicUsize>,
    /// next slot to read; written only by the consumer.
    pub(super) head: CachePadded<AtomicUsize>,
    /// pushes refused because the buffer was full; written only by the
    /// producer, monotonically increasing.
    pub(super) dropped: CachePadded<AtomicU64>,
}

impl<T> Shared<T> {
    pub(super) fn new(capacity: usize) -> Self {
        Self {
            slots: SlotArray::new(capacity),
            tail: CachePadded::new(AtomicUsize::new(0)),
            head: CachePadded::new(AtomicUsize::new(0)),
            dropped: CachePadded::new(AtomicU64::new(0)),
        }
    }
}
