//! Generic growable array with an explicit doubling policy.
//!
//! [`Buffer`] owns a single contiguous allocation. When a push would exceed
//! the current capacity the allocation is replaced by one holding
//! `max(2 * capacity + 1, required)` slots, so a sequence of `N` pushes costs
//! `O(N)` in total. Growth moves the elements; the borrow checker already
//! forbids holding a reference across a push.
//!
//! Allocation failure is fatal (`handle_alloc_error`), and any capacity
//! computation that would overflow panics before an allocation is sized.

use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::slice;

/// Contiguous owned storage with amortized O(1) append.
pub struct Buffer<T> {
    ptr: NonNull<T>,
    len: usize,
    cap: usize,
    _marker: PhantomData<T>,
}

// The buffer owns its elements exactly like `Vec<T>` does.
unsafe impl<T: Send> Send for Buffer<T> {}
unsafe impl<T: Sync> Sync for Buffer<T> {}

#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

impl<T> Buffer<T> {
    /// Create an empty buffer. Nothing is allocated until the first push.
    pub const fn new() -> Self {
        Buffer {
            ptr: NonNull::dangling(),
            len: 0,
            cap: 0,
            _marker: PhantomData,
        }
    }

    /// Create a buffer with room for exactly `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut buffer = Self::new();
        if capacity > 0 {
            buffer.reallocate(capacity);
        }
        buffer
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of allocated slots.
    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append `value`, growing the allocation if it is full.
    pub fn push(&mut self, value: T) {
        if self.len == self.cap {
            let required = match self.len.checked_add(1) {
                Some(required) => required,
                None => capacity_overflow(),
            };
            self.grow(required);
        }

        // SAFETY: `len < cap` after growth, so the slot is allocated and unused.
        unsafe {
            self.ptr.as_ptr().add(self.len).write(value);
        }
        self.len += 1;
    }

    /// Drop every element and release the allocation.
    ///
    /// Afterwards `len() == 0` and `capacity() == 0`; the buffer can be reused.
    pub fn free(&mut self) {
        self.drop_elements();
        self.release();
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are initialized; a dangling pointer is
        // valid for an empty slice.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, and `&mut self` guarantees uniqueness.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Capacity after growth: `max(2 * cap + 1, required)`.
    fn next_capacity(&self, required: usize) -> usize {
        let doubled = match self.cap.checked_mul(2).and_then(|c| c.checked_add(1)) {
            Some(doubled) => doubled,
            None => capacity_overflow(),
        };
        doubled.max(required)
    }

    fn grow(&mut self, required: usize) {
        let new_cap = self.next_capacity(required);
        self.reallocate(new_cap);
    }

    fn reallocate(&mut self, new_cap: usize) {
        debug_assert!(new_cap > self.cap);

        if mem::size_of::<T>() == 0 {
            self.cap = new_cap;
            return;
        }

        let new_layout = match Layout::array::<T>(new_cap) {
            Ok(layout) => layout,
            Err(_) => capacity_overflow(),
        };

        let raw = if self.cap == 0 {
            // SAFETY: `T` is not zero-sized and `new_cap > 0`, so the layout
            // has a non-zero size.
            unsafe { alloc::alloc(new_layout) }
        } else {
            let old_layout = match Layout::array::<T>(self.cap) {
                Ok(layout) => layout,
                Err(_) => capacity_overflow(),
            };
            // SAFETY: `ptr` was allocated with `old_layout` by this buffer and
            // the new size was validated by `Layout::array`.
            unsafe { alloc::realloc(self.ptr.as_ptr().cast::<u8>(), old_layout, new_layout.size()) }
        };

        self.ptr = match NonNull::new(raw.cast::<T>()) {
            Some(ptr) => ptr,
            None => alloc::handle_alloc_error(new_layout),
        };
        self.cap = new_cap;
    }

    fn drop_elements(&mut self) {
        let len = self.len;
        // Reset first so a panicking destructor cannot cause a double drop.
        self.len = 0;
        // SAFETY: the first `len` slots were initialized and are now
        // unreachable through the buffer.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), len));
        }
    }

    fn release(&mut self) {
        if self.cap != 0 && mem::size_of::<T>() != 0 {
            if let Ok(layout) = Layout::array::<T>(self.cap) {
                // SAFETY: the allocation was made with exactly this layout.
                unsafe { alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout) };
            }
        }
        self.ptr = NonNull::dangling();
        self.cap = 0;
    }
}

impl<T> Drop for Buffer<T> {
    fn drop(&mut self) {
        self.free();
    }
}

impl<T> Default for Buffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for Buffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for Buffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Clone> Clone for Buffer<T> {
    fn clone(&self) -> Self {
        let mut copy = Buffer::with_capacity(self.len);
        copy.extend(self.iter().cloned());
        copy
    }
}

impl<T> Extend<T> for Buffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> FromIterator<T> for Buffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut buffer = Buffer::new();
        buffer.extend(iter);
        buffer
    }
}

impl<'a, T> IntoIterator for &'a Buffer<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
