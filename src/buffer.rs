//! Heap buffers whose ownership is handed to the caller.
//!
//! An [`OwnedBuffer`] holds exactly one allocation of exactly `len` elements.
//! Inside Rust it behaves like a boxed slice and frees itself on drop. At the
//! C boundary [`OwnedBuffer::into_raw_parts`] gives the allocation away and
//! [`OwnedBuffer::from_raw_parts`] takes it back so it can be dropped.

use std::ops::Deref;
use std::ptr;
use std::str::Utf8Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedBuffer<T> {
    data: Box<[T]>,
}

impl<T> OwnedBuffer<T> {
    /// A zero-length buffer. Its pointer is dangling but non-null, so it can
    /// cross the boundary and come back like any other buffer.
    pub fn empty() -> Self {
        Self { data: Vec::new().into_boxed_slice() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data.into_vec()
    }

    /// Release ownership of the allocation. The pair must eventually be passed
    /// to [`OwnedBuffer::from_raw_parts`] exactly once.
    pub fn into_raw_parts(self) -> (*mut T, usize) {
        let len = self.data.len();
        let ptr = Box::into_raw(self.data) as *mut T;
        (ptr, len)
    }

    /// Reclaim an allocation produced by [`OwnedBuffer::into_raw_parts`].
    ///
    /// # Safety
    /// `ptr` and `len` must come from a single `into_raw_parts` call on an
    /// `OwnedBuffer<T>` and must not have been reclaimed before.
    pub unsafe fn from_raw_parts(ptr: *mut T, len: usize) -> Self {
        let data = unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len)) };
        Self { data }
    }
}

impl<T> Default for OwnedBuffer<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Vec<T>> for OwnedBuffer<T> {
    fn from(items: Vec<T>) -> Self {
        Self { data: items.into_boxed_slice() }
    }
}

impl<T> Deref for OwnedBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> AsRef<[T]> for OwnedBuffer<T> {
    fn as_ref(&self) -> &[T] {
        &self.data
    }
}

impl OwnedBuffer<u8> {
    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(&self.data)
    }
}
