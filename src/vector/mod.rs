//! Growable contiguous container over [`RawMemory`].
//!
//! Every operation that needs more room follows the same order:
//! allocate a new block, construct the new value in it, relocate the live
//! values, swap the blocks. Anything that can panic or fail happens before
//! the old block is given up, so the vector is left as it was.
//!
//! Relocation is a bitwise copy since a move in Rust can't panic. Old slots
//! are then treated as holding no value and the old block is released
//! without dropping anything.

use crate::{
    error::{or_raise, AllocError},
    raw::RawMemory,
};
use log::*;
use std::{
    fmt,
    hash::{Hash, Hasher},
    mem::{self, ManuallyDrop},
    ops::{Deref, DerefMut, Index, IndexMut},
    ptr,
    slice::{self, SliceIndex},
};

/// Creates a [`Vector`] from a list of values, or from `value; n`.
#[macro_export]
macro_rules! vector {
    () => {
        $crate::Vector::new()
    };
    ($value:expr; $n:expr) => {
        $crate::Vector::from_elem($value, $n)
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Vector::from([$($value),+])
    };
}

mod iter;

pub use iter::IntoIter;

/// Capacity of the first block allocated by growth.
pub const MIN_NON_ZERO_CAPACITY: usize = 1;

/// Capacity multiplier when a full vector grows.
pub const GROWTH_FACTOR: usize = 2;

/// Contiguous growable container with value semantics.
///
/// Slots `[0, len)` of the storage hold live values, `[len, capacity)` are
/// uninitialized.
pub struct Vector<T> {
    data: RawMemory<T>,
    size: usize,
}

impl<T> Vector<T> {
    pub const fn new() -> Self {
        Self {
            data: RawMemory::new(),
            size: 0,
        }
    }

    /// Empty vector with storage for exactly `capacity` values.
    #[track_caller]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: RawMemory::with_capacity(capacity),
            size: 0,
        }
    }

    /// Vector of `len` default values, with capacity `len`.
    #[track_caller]
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        let mut vector = Self::with_capacity(len);
        vector.resize_with(len, T::default);
        vector
    }

    /// Vector of `n` clones of `value`.
    #[track_caller]
    pub fn from_elem(value: T, n: usize) -> Self
    where
        T: Clone,
    {
        let mut vector = Self::with_capacity(n);
        if n > 0 {
            for _ in 1..n {
                // This is safe since capacity is n.
                unsafe { vector.push_unchecked(value.clone()) };
            }
            // This is safe since capacity is n.
            unsafe { vector.push_unchecked(value) };
        }
        vector
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn as_slice(&self) -> &[T] {
        // This is safe since first size slots are initialized.
        unsafe { slice::from_raw_parts(self.data.as_ptr(), self.size) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // This is safe since first size slots are initialized.
        unsafe { slice::from_raw_parts_mut(self.data.as_mut_ptr(), self.size) }
    }

    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.data.as_mut_ptr()
    }

    /// Sets number of live values without constructing or dropping any.
    ///
    /// # Safety
    /// `len <= capacity` and slots `[0, len)` must hold initialized values.
    pub unsafe fn set_len(&mut self, len: usize) {
        debug_assert!(
            len <= self.capacity(),
            "len {} exceeds capacity {}",
            len,
            self.capacity()
        );
        self.size = len;
    }

    /// Takes storage and values, leaving `self` empty with no capacity.
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Replaces content of `self` with that of `source`, leaving `source`
    /// empty with no capacity. Storage is taken over as a whole, previous
    /// values of `self` are dropped.
    pub fn move_from(&mut self, source: &mut Self) {
        *self = source.take();
    }

    /// Exchanges storage and values. No value is touched.
    pub fn swap_storage(&mut self, other: &mut Self) {
        self.data.swap(&mut other.data);
        mem::swap(&mut self.size, &mut other.size);
    }

    pub fn push_back(&mut self, value: T) {
        self.emplace_back_with(|| value);
    }

    /// Appends and returns the appended value.
    pub fn emplace_back(&mut self, value: T) -> &mut T {
        self.emplace_back_with(|| value)
    }

    /// Appends value returned by `f`.
    ///
    /// If `f` panics, the vector is left untouched.
    #[track_caller]
    pub fn emplace_back_with(&mut self, f: impl FnOnce() -> T) -> &mut T {
        or_raise(self.try_emplace_back_with(f))
    }

    pub fn try_push_back(&mut self, value: T) -> Result<(), AllocError> {
        self.try_emplace_back_with(|| value).map(|_| ())
    }

    /// Fallible [`Vector::emplace_back_with`]. On error `f` isn't called
    /// and the vector is left untouched.
    pub fn try_emplace_back_with(&mut self, f: impl FnOnce() -> T) -> Result<&mut T, AllocError> {
        let index = self.size;
        if self.size == self.capacity() {
            let data: RawMemory<T> = RawMemory::try_with_capacity(self.grown_capacity()?)?;
            // New value goes first so that a panic in f leaves old storage as is.
            let value = f();
            // This is safe since new capacity is larger than size and
            // the blocks don't overlap.
            unsafe {
                data.slot(index).write(value);
                relocate(&self.data, &data, 0, 0, self.size);
            }
            self.replace_storage(data);
        } else {
            let value = f();
            // This is safe since size < capacity.
            unsafe { self.data.slot(index).write(value) };
        }
        self.size += 1;

        // This is safe since the slot was just initialized.
        Ok(unsafe { &mut *self.data.slot(index) })
    }

    /// Removes and returns last value.
    pub fn pop(&mut self) -> Option<T> {
        if self.size == 0 {
            return None;
        }
        self.size -= 1;
        // This is safe since the slot was initialized and is now past size.
        Some(unsafe { self.data.slot(self.size).read() })
    }

    /// Drops last value.
    ///
    /// Calling it on an empty vector is a contract violation, caught only in
    /// debug builds. Release builds do nothing.
    pub fn pop_back(&mut self) {
        debug_assert!(self.size > 0, "pop_back on empty vector");
        drop(self.pop());
    }

    /// Ensures total capacity of at least `capacity`. Allocates exactly
    /// `capacity` slots if it has to.
    #[track_caller]
    pub fn reserve(&mut self, capacity: usize) {
        or_raise(self.try_reserve(capacity))
    }

    /// Fallible [`Vector::reserve`]. On error the vector is left untouched.
    pub fn try_reserve(&mut self, capacity: usize) -> Result<(), AllocError> {
        if capacity <= self.capacity() {
            return Ok(());
        }

        let data: RawMemory<T> = RawMemory::try_with_capacity(capacity)?;
        // This is safe since new capacity is larger than size and
        // the blocks don't overlap.
        unsafe { relocate(&self.data, &data, 0, 0, self.size) };
        self.replace_storage(data);
        Ok(())
    }

    /// Resizes to `len`, filling new slots with default values.
    #[track_caller]
    pub fn resize(&mut self, len: usize)
    where
        T: Default,
    {
        self.resize_with(len, T::default)
    }

    /// Resizes to `len`, filling new slots with values returned by `f`.
    ///
    /// If `f` panics, values constructed so far are kept.
    #[track_caller]
    pub fn resize_with(&mut self, len: usize, mut f: impl FnMut() -> T) {
        if len > self.size {
            self.reserve(len);
            while self.size < len {
                // This is safe since capacity is at least len.
                unsafe { self.push_unchecked(f()) };
            }
        } else {
            self.truncate(len);
        }
    }

    /// Drops values from `len` onward. Capacity stays.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.size {
            return;
        }

        // This is safe since len < size <= capacity.
        let tail = ptr::slice_from_raw_parts_mut(unsafe { self.data.offset(len) }, self.size - len);
        // Shrink first so a panicking drop can't lead to double drop.
        self.size = len;
        // This is safe since tail slots were initialized and are now past size.
        unsafe { ptr::drop_in_place(tail) };
    }

    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Inserts `value` before `index` and returns it.
    ///
    /// Panics if `index > len`.
    #[track_caller]
    pub fn insert(&mut self, index: usize, value: T) -> &mut T {
        self.emplace_with(index, || value)
    }

    /// Inserts value returned by `f` before `index` and returns it.
    ///
    /// If `f` panics, the vector is left untouched.
    /// Panics if `index > len`.
    #[track_caller]
    pub fn emplace_with(&mut self, index: usize, f: impl FnOnce() -> T) -> &mut T {
        or_raise(self.try_emplace_with(index, f))
    }

    #[track_caller]
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<&mut T, AllocError> {
        self.try_emplace_with(index, || value)
    }

    /// Fallible [`Vector::emplace_with`]. On error `f` isn't called and the
    /// vector is left untouched.
    ///
    /// Panics if `index > len`.
    #[track_caller]
    pub fn try_emplace_with(
        &mut self,
        index: usize,
        f: impl FnOnce() -> T,
    ) -> Result<&mut T, AllocError> {
        #[cold]
        #[inline(never)]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("insertion index (is {index}) should be <= len (is {len})");
        }

        let len = self.size;
        if index > len {
            assert_failed(index, len);
        }

        if len == self.capacity() {
            let data: RawMemory<T> = RawMemory::try_with_capacity(self.grown_capacity()?)?;
            let value = f();
            // This is safe since new capacity is larger than len and
            // the blocks don't overlap.
            unsafe {
                data.slot(index).write(value);
                relocate(&self.data, &data, 0, 0, index);
                relocate(&self.data, &data, index, index + 1, len - index);
            }
            self.replace_storage(data);
        } else {
            // Constructed before anything is shifted, so a panic in f
            // leaves the values where they were.
            let value = f();
            // This is safe since len < capacity so there is a free slot at the end.
            unsafe {
                let slot = self.data.slot(index);
                ptr::copy(slot, slot.add(1), len - index);
                slot.write(value);
            }
        }
        self.size = len + 1;

        // This is safe since the slot was just initialized.
        Ok(unsafe { &mut *self.data.slot(index) })
    }

    /// Inserts a clone of the value at `source` before `index`.
    ///
    /// The clone is made before anything is shifted or reallocated, so
    /// the source may be anywhere in the vector, including at `index`.
    #[track_caller]
    pub fn insert_duplicate(&mut self, index: usize, source: usize) -> &mut T
    where
        T: Clone,
    {
        let value = self[source].clone();
        self.insert(index, value)
    }

    /// Removes and returns the value at `index`, shifting the rest toward
    /// the front.
    ///
    /// Panics if `index >= len`.
    #[track_caller]
    pub fn remove(&mut self, index: usize) -> T {
        #[cold]
        #[inline(never)]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("removal index (is {index}) should be < len (is {len})");
        }

        let len = self.size;
        if index >= len {
            assert_failed(index, len);
        }

        // This is safe since index < len.
        unsafe {
            let slot = self.data.slot(index);
            let value = slot.read();
            ptr::copy(slot.add(1), slot, len - index - 1);
            self.size = len - 1;
            value
        }
    }

    /// Drops the value at `index`, shifting the rest toward the front.
    ///
    /// Returns position of the value that followed the erased one, which is
    /// `len` if the last value was erased.
    /// Panics if `index >= len`.
    #[track_caller]
    pub fn erase(&mut self, index: usize) -> usize {
        drop(self.remove(index));
        index
    }

    /// Ensures room for `additional` more values, growing by at least
    /// [`GROWTH_FACTOR`] so repeated calls stay amortized.
    #[track_caller]
    fn reserve_additional(&mut self, additional: usize) {
        let required = self.size.saturating_add(additional);
        if required <= self.capacity() {
            return;
        }
        let grown = self.grown_capacity().unwrap_or(required);
        self.reserve(required.max(grown));
    }

    /// # Safety
    /// `len < capacity`.
    unsafe fn push_unchecked(&mut self, value: T) {
        self.data.slot(self.size).write(value);
        self.size += 1;
    }

    fn grown_capacity(&self) -> Result<usize, AllocError> {
        match self.capacity() {
            0 => Ok(MIN_NON_ZERO_CAPACITY),
            capacity => capacity
                .checked_mul(GROWTH_FACTOR)
                .ok_or(AllocError::CapacityOverflow),
        }
    }

    /// Swaps in `data` whose first size slots already hold the values.
    /// Old block is released without dropping anything.
    fn replace_storage(&mut self, mut data: RawMemory<T>) {
        trace!(
            "Reallocated {} values from {} to {} slots",
            self.size,
            self.capacity(),
            data.capacity()
        );
        self.data.swap(&mut data);
    }
}

/// Moves `count` values from slots of `src` starting at `from` into slots of
/// `dst` starting at `to`. Source slots are left as holding no value.
///
/// # Safety
/// Both ranges must be within capacity, source range initialized and
/// destination range uninitialized. The blocks must be distinct.
unsafe fn relocate<T>(src: &RawMemory<T>, dst: &RawMemory<T>, from: usize, to: usize, count: usize) {
    debug_assert!(from + count <= src.capacity());
    debug_assert!(to + count <= dst.capacity());
    ptr::copy_nonoverlapping(src.offset(from), dst.offset(to), count);
}

impl<T> Drop for Vector<T> {
    fn drop(&mut self) {
        // Values only. Storage releases the block itself.
        // This is safe since first size slots are initialized.
        unsafe { ptr::drop_in_place(self.as_mut_slice()) }
    }
}

impl<T> Default for Vector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Vector<T> {
    /// Capacity of the clone equals `len` of `self`.
    fn clone(&self) -> Self {
        let mut copy = Self::with_capacity(self.size);
        for value in self.iter() {
            // This is safe since capacity is self.size.
            unsafe { copy.push_unchecked(value.clone()) };
        }
        copy
    }

    /// Reuses existing storage and values when `source` fits into it.
    fn clone_from(&mut self, source: &Self) {
        if source.size > self.capacity() {
            // Doesn't fit. Build aside so a panicking clone leaves self as is.
            let mut copy = source.clone();
            self.swap_storage(&mut copy);
        } else if source.size < self.size {
            self.as_mut_slice()[..source.size].clone_from_slice(source.as_slice());
            self.truncate(source.size);
        } else {
            let (prefix, tail) = source.as_slice().split_at(self.size);
            self.as_mut_slice().clone_from_slice(prefix);
            for value in tail {
                // This is safe since source.size <= capacity.
                unsafe { self.push_unchecked(value.clone()) };
            }
        }
    }
}

impl<T> Deref for Vector<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T> DerefMut for Vector<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T, I: SliceIndex<[T]>> Index<I> for Vector<T> {
    type Output = I::Output;

    fn index(&self, index: I) -> &Self::Output {
        Index::index(self.as_slice(), index)
    }
}

impl<T, I: SliceIndex<[T]>> IndexMut<I> for Vector<T> {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

impl<T> AsRef<[T]> for Vector<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for Vector<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq<U>, U> PartialEq<Vector<U>> for Vector<T> {
    fn eq(&self, other: &Vector<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialEq<U>, U> PartialEq<[U]> for Vector<T> {
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq<U>, U> PartialEq<&[U]> for Vector<T> {
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T: PartialEq<U>, U, const N: usize> PartialEq<[U; N]> for Vector<T> {
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for Vector<T> {}

impl<T: Hash> Hash for Vector<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state)
    }
}

impl<T> Extend<T> for Vector<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve_additional(lower);
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vector = Self::new();
        vector.extend(iter);
        vector
    }
}

impl<T: Clone> From<&[T]> for Vector<T> {
    fn from(values: &[T]) -> Self {
        let mut vector = Self::with_capacity(values.len());
        for value in values {
            // This is safe since capacity is values.len().
            unsafe { vector.push_unchecked(value.clone()) };
        }
        vector
    }
}

impl<T, const N: usize> From<[T; N]> for Vector<T> {
    fn from(values: [T; N]) -> Self {
        let mut vector = Self::with_capacity(N);
        for value in values {
            // This is safe since capacity is N.
            unsafe { vector.push_unchecked(value) };
        }
        vector
    }
}

impl<T> From<Vec<T>> for Vector<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T> IntoIterator for Vector<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let mut this = ManuallyDrop::new(self);
        let data = mem::take(&mut this.data);
        IntoIter::new(data, this.size)
    }
}

impl<'a, T> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Vector<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
