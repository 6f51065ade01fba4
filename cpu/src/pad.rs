// cache-line padding
//
// cache coherence works at cache-line granularity: two counters that live on
// the same line invalidate each other's cached copies on every write, even
// though no data is actually shared ("false sharing")
//
// CachePadded<T> forces 64-byte alignment and rounds the size up to a
// multiple of 64, so adjacent instances always occupy distinct lines

use core::fmt;
use core::ops::{Deref, DerefMut};

pub const CACHE_LINE_SIZE: usize = 64;

// value aligned to its own cache line
//
// layout guarantees:
// - alignment 64, value at offset 0
// - size is a multiple of 64
#[repr(C, align(64))]
pub struct CachePadded<T> {
    value: T,
}

impl<T> CachePadded<T> {
    #[inline]
    pub const fn new(value: T) -> Self {
        Self { value }
    }

    #[inline]
    pub fn into_inner(self) -> T {
        self.value
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T> Deref for CachePadded<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for CachePadded<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Default> Default for CachePadded<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone> Clone for CachePadded<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T: Copy> Copy for CachePadded<T> {}

impl<T: fmt::Debug> fmt::Debug for CachePadded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachePadded")
            .field("value", &self.value)
            .finish()
    }
}
