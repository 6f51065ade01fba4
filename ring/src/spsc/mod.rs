//! single producer single consumer (SPSC) ring buffer.
//!
//! the restricted concurrency case: exactly one thread of control pushes
//! and exactly one pops, never more. that partition gives each index a
//! single writer, which is what lets this variant avoid compare-and-swap
//! entirely - push and pop are wait-free, completing in a bounded number
//! of steps no matter what the other side is doing.
//!
//! on overflow the producer does not block, evict, or retry: the new
//! element is dropped and an atomic counter incremented, so a market-data
//! feed handler never stalls and the backpressure is still observable
//! ([`Producer::drop_count`]).
//!
//! construction returns a `(Producer, Consumer)` handle pair; neither is
//! `Clone` and both operate through `&mut self`, so "exactly one producer
//! and one consumer" is enforced by the type system, not by convention.
//!
//! # example
//!
//! ```
//! use tape_ring::spsc;
//!
//! let (mut tx, mut rx) = spsc::ring_buffer::<u64>(1024);
//!
//! // producer side
//! std::thread::spawn(move || {
//!     for i in 0..100 {
//!         while !tx.push(i) {
//!             std::hint::spin_loop(); // caller-chosen backoff
//!         }
//!     }
//! });
//!
//! // consumer side
//! let mut received = 0;
//! while received < 100 {
//!     if let Some(v) = rx.pop() {
//!         assert_eq!(v, received);
//!         received += 1;
//!     }
//! }
//! ```

mod consumer;
mod producer;
mod shared;

pub use consumer::Consumer;
pub use producer::Producer;

use shared::Shared;
use std::sync::Arc;

/// create an SPSC ring buffer with the given capacity, returning the
/// producer and consumer handles.
///
/// the capacity must be a power of 2 and at least 2; the buffer holds at
/// most `capacity - 1` elements at once.
///
/// # panics
///
/// panics if `capacity` is not a power of 2 or is less than 2.
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
/// ```
pub fn ring_buffer<T: Copy>(capacity: usize) -> (Producer<T>, Consumer<T>) {
    let shared = Arc::new(Shared::new(capacity));

    let producer = Producer {
        shared: Arc::clone(&shared),
        cached_head: 0,
    };

    let consumer = Consumer {
        shared,
        cached_tail: 0,
    };

    (producer, consumer)
}
