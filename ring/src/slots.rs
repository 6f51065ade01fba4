//! pre-allocated slot storage shared by both ring buffer variants.
//!
//! a fixed circular array with power-of-two capacity, so a position maps to
//! a slot with a bitwise AND instead of a modulo. the storage itself does no
//! synchronization: the buffers built on top of it decide which slots are
//! readable through their index protocols, and the raw accessors here are
//! unsafe for exactly that reason.
//!
//! # design
//!
//! - one allocation up front, nothing in the hot path
//! - `UnsafeCell<MaybeUninit<T>>` slots: interior mutability plus
//!   uninitialized storage (a slot holds no element until first written)
//! - capacity is a power of two and at least 2 - one slot always stays
//!   unoccupied so the owning buffer can tell "empty" from "full"
//!
//! # safety
//!
//! callers of [`SlotArray::write`] and [`SlotArray::read`] must guarantee:
//! - no two contexts access the same slot at the same time
//! - reads only target slots that have been written
//!
//! # example
//!
//! ```
//! use tape_ring::slots::SlotArray;
//!
//! let slots: SlotArray<u64> = SlotArray::new(8);
//! assert_eq!(slots.capacity(), 8);
//!
//! unsafe {
//!     slots.write(3, 42);
//!     assert_eq!(slots.read(3), 42);
//! }
//! ```

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;

/// check if a number is a power of 2.
#[inline]
const fn is_power_of_two(n: usize) -> bool {
    n != 0 && (n & (n - 1)) == 0
}

/// fixed-capacity circular slot storage.
///
/// positions wrap with `position & mask`; the mask is computed once at
/// construction. elements are stored by value and copied out by value -
/// the buffers built on this restrict themselves to `Copy` payloads, so a
/// slot can be duplicated or abandoned without any cleanup.
pub struct SlotArray<T> {
    /// pre-allocated slots, uninitialized until first written.
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,

    /// bitmask for index wrapping: `position & mask == position % capacity`
    mask: usize,

    /// number of slots (always a power of 2, at least 2)
    capacity: usize,
}

impl<T> SlotArray<T> {
    /// allocate storage with the given number of slots.
    ///
    /// # panics
    ///
    /// panics if `capacity` is not a power of 2, or is less than 2 (one
    /// slot is reserved to distinguish empty from full, so a one-slot
    /// array could never hold anything).
    ///
    /// # example
    ///
    /// ```
    /// use tape_ring::slots::SlotArray;
    ///
    /// let slots: SlotArray<u64> = SlotArray::new(1024);
    /// assert_eq!(slots.capacity(), 1024);
    /// assert_eq!(slots.mask(), 1023);
    /// ```
    ///
    /// ```should_panic
    /// use tape_ring::slots::SlotArray;
    ///
    /// // this will panic - 100 is not a power of 2
    /// let _: SlotArray<u64> = SlotArray::new(100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        assert!(
            is_power_of_two(capacity),
            "slot array capacity must be a power of 2, got {}",
            capacity
        );
        assert!(
            capacity >= 2,
            "slot array capacity must be at least 2, got {}",
            capacity
        );

        let mut slots = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            slots.push(UnsafeCell::new(MaybeUninit::uninit()));
        }

        Self {
            slots: slots.into_boxed_slice(),
            mask: capacity - 1,
            capacity,
        }
    }

    /// number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// bitmask for wrapping positions into slot indices.
    #[inline]
    pub fn mask(&self) -> usize {
        self.mask
    }

    /// wrap a position to a slot index.
    ///
    /// # example
    ///
    /// ```
    /// use tape_ring::slots::SlotArray;
    ///
    /// let slots: SlotArray<u64> = SlotArray::new(8);
    /// assert_eq!(slots.index(0), 0);
    /// assert_eq!(slots.index(7), 7);
    /// assert_eq!(slots.index(8), 0); // wraps around
    /// assert_eq!(slots.index(9), 1);
    /// ```
    #[inline(always)]
    pub fn index(&self, position: usize) -> usize {
        position & self.mask
    }

    /// store a value in the slot at `position` (wrapped).
    ///
    /// overwrites whatever the slot held; nothing is dropped (the buffers
    /// on top only carry `Copy` payloads).
    ///
    /// # safety
    ///
    /// the caller must ensure no other context reads or writes this slot
    /// concurrently. the buffers guarantee this through their index
    /// protocols: a slot is written only while it is outside the readable
    /// window.
    #[inline(always)]
    pub unsafe fn write(&self, position: usize, value: T) {
        let idx = self.index(position);
        // safety: idx is always < capacity due to mask
        unsafe { (*self.slots.get_unchecked(idx).get()).write(value) };
    }

    /// copy the value out of the slot at `position` (wrapped).
    ///
    /// # safety
    ///
    /// the caller must ensure the slot has been written, and that no
    /// context writes it while this read is in flight.
    #[inline(always)]
    pub unsafe fn read(&self, position: usize) -> T
    where
        T: Copy,
    {
        let idx = self.index(position);
        // safety: idx is always < capacity due to mask; initialization is
        // the caller's contract
        unsafe { (*self.slots.get_unchecked(idx).get()).assume_init() }
    }
}

// safety: SlotArray is Send if T is Send - can be transferred between threads
unsafe impl<T: Send> Send for SlotArray<T> {}

// safety: SlotArray is Sync if T is Send - the buffers built on it mediate
// all concurrent slot access through their atomic index protocols
unsafe impl<T: Send> Sync for SlotArray<T> {}

impl<T> core::fmt::Debug for SlotArray<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SlotArray")
            .field("capacity", &self.capacity)
            .field("mask", &self.mask)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let slots: SlotArray<u64> = SlotArray::new(1024);
        assert_eq!(slots.capacity(), 1024);
        assert_eq!(slots.mask(), 1023);
    }

    #[test]
    #[should_panic(expected = "power of 2")]
    fn test_new_non_power_of_2() {
        let _: SlotArray<u64> = SlotArray::new(100);
    }

    #[test]
    #[should_panic(expected = "power of 2")]
    fn test_new_zero() {
        let _: SlotArray<u64> = SlotArray::new(0);
    }

    #[test]
    #[should_panic(expected = "at least 2")]
    fn test_new_one_slot() {
        let _: SlotArray<u64> = SlotArray::new(1);
    }

    #[test]
    fn test_index_wraps() {
        let slots: SlotArray<u64> = SlotArray::new(8);

        assert_eq!(slots.index(0), 0);
        assert_eq!(slots.index(7), 7);
        assert_eq!(slots.index(8), 0);
        assert_eq!(slots.index(15), 7);
        assert_eq!(slots.index(16), 0);
    }

    #[test]
    fn test_write_and_read() {
        let slots: SlotArray<u64> = SlotArray::new(8);

        unsafe {
            slots.write(0, 100);
            slots.write(1, 200);
            slots.write(7, 700);

            assert_eq!(slots.read(0), 100);
            assert_eq!(slots.read(1), 200);
            assert_eq!(slots.read(7), 700);
        }
    }

    #[test]
    fn test_wrapped_write_aliases_slot() {
        let slots: SlotArray<u64> = SlotArray::new(4);

        unsafe {
            slots.write(1, 10);
            // position 5 wraps to slot 1
            slots.write(5, 50);
            assert_eq!(slots.read(1), 50);
            assert_eq!(slots.read(5), 50);
        }
    }

    #[test]
    fn test_debug() {
        let slots: SlotArray<u64> = SlotArray::new(8);
        let debug = format!("{:?}", slots);
        assert!(debug.contains("SlotArray"));
        assert!(debug.contains("capacity: 8"));
    }
}
