use crate::raw::RawMemory;
use std::{fmt, iter::FusedIterator, ptr, slice};

/// Owning iterator over values of a [`Vector`](super::Vector).
///
/// Values not yielded are dropped together with the iterator.
pub struct IntoIter<T> {
    data: RawMemory<T>,
    /// Slots `[start, end)` hold values not yet yielded.
    start: usize,
    end: usize,
}

impl<T> IntoIter<T> {
    /// First `len` slots of `data` must be initialized.
    pub(super) fn new(data: RawMemory<T>, len: usize) -> Self {
        Self {
            data,
            start: 0,
            end: len,
        }
    }

    pub fn as_slice(&self) -> &[T] {
        // This is safe since [start, end) are initialized.
        unsafe { slice::from_raw_parts(self.data.offset(self.start), self.end - self.start) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        // This is safe since start < end and the slot is read out only once.
        let value = unsafe { self.data.slot(self.start).read() };
        self.start += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // This is safe since the slot was initialized and is now past end.
        Some(unsafe { self.data.slot(self.end).read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        // This is safe since [start, end) are initialized and never read again.
        unsafe {
            let rest = ptr::slice_from_raw_parts_mut(self.data.offset(self.start), self.end - self.start);
            self.start = self.end;
            ptr::drop_in_place(rest);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}
