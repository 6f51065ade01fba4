//! bounded lock-free ring buffers for latency-sensitive pipelines.
//!
//! fixed-capacity circular buffers for passing fixed-size, copy-by-value
//! elements between threads without locks, built for paths (market data in,
//! orders out) where predictable tail latency matters more than
//! flexibility.
//!
//! # buffer types
//!
//! - [`RingBuffer`]: tolerant of overlapping producers and consumers;
//!   lock-free, with the full-buffer behavior chosen at compile time by an
//!   [`OverflowPolicy`] ([`Reject`] or [`Overwrite`])
//! - [`spsc`]: exactly one producer and one consumer; wait-free push/pop
//!   with no compare-and-swap, counting dropped pushes instead of blocking
//!   or evicting
//!
//! # design
//!
//! - pre-allocated power-of-two slot arrays, index wrap by bitmask
//! - release/acquire index handoff: an element is visible before the index
//!   that publishes it
//! - cache-line padding on every independently-written counter
//!   (no false sharing between producer and consumer traffic)
//! - nothing ever blocks, sleeps, or yields inside the primitives; callers
//!   poll, with [`wait_backoff`] as the off-the-shelf poll-loop aid
//! - elements must be `Copy` - buffers duplicate and abandon slots freely,
//!   so payloads owning resources are rejected at compile time
//!
//! # example
//!
//! ```
//! use tape_ring::RingBuffer;
//!
//! let rb: RingBuffer<u64> = RingBuffer::new(1024);
//!
//! assert!(rb.push(42));
//! assert_eq!(rb.len(), 1);
//! assert_eq!(rb.front(), 42);
//! assert_eq!(rb.pop(), Some(42));
//! assert!(rb.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod concurrent;
pub mod policy;
pub mod slots;
pub mod spsc;

pub use concurrent::RingBuffer;
pub use policy::{OverflowPolicy, Overwrite, Reject};

// re-export the cpu-level pieces callers need alongside the buffers:
// padding for their own shared state, backoff for their poll loops
pub use tape_cpu::{wait_backoff, CachePadded, CACHE_LINE_SIZE};
