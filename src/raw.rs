use crate::error::{or_raise, AllocError};
use getset::CopyGetters;
use log::*;
use std::{
    alloc::{self, Layout},
    any::type_name,
    fmt,
    marker::PhantomData,
    mem,
    ptr::NonNull,
};

/// Uninitialized storage for exactly `capacity` values of `T`.
///
/// Acquires and releases memory, nothing more. It never constructs nor drops
/// a `T`, since it can't know which slots hold live values. Whoever places
/// values into it must drop them before the storage is dropped.
///
/// Move only. Copying the block would alias slots without any notion of
/// which of the copies owns the values in them.
#[derive(CopyGetters)]
pub struct RawMemory<T> {
    /// Dangling if nothing is allocated.
    buffer: NonNull<T>,
    /// Number of slots, not bytes.
    #[getset(get_copy = "pub")]
    capacity: usize,
    _marker: PhantomData<T>,
}

impl<T> RawMemory<T> {
    /// Empty storage. Doesn't allocate.
    pub const fn new() -> Self {
        Self {
            buffer: NonNull::dangling(),
            capacity: 0,
            _marker: PhantomData,
        }
    }

    /// Storage for exactly `capacity` slots.
    ///
    /// Panics on capacity overflow and aborts through the global alloc error
    /// handler if memory can't be acquired.
    #[track_caller]
    pub fn with_capacity(capacity: usize) -> Self {
        or_raise(Self::try_with_capacity(capacity))
    }

    /// Storage for exactly `capacity` slots, or the reason it can't be had.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, AllocError> {
        Ok(Self {
            buffer: Self::allocate(capacity)?,
            capacity,
            _marker: PhantomData,
        })
    }

    pub fn as_ptr(&self) -> *const T {
        self.buffer.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buffer.as_ptr()
    }

    /// Address of slot at `offset`.
    ///
    /// # Safety
    /// `offset <= capacity`. Checked only in debug builds.
    #[inline(always)]
    pub unsafe fn offset(&self, offset: usize) -> *mut T {
        // Address right after the last slot is allowed.
        debug_assert!(
            offset <= self.capacity,
            "offset {} is past the end of {} slots",
            offset,
            self.capacity
        );
        self.buffer.as_ptr().add(offset)
    }

    /// Address of slot at `index`.
    ///
    /// # Safety
    /// `index < capacity`. Checked only in debug builds.
    #[inline(always)]
    pub unsafe fn slot(&self, index: usize) -> *mut T {
        debug_assert!(
            index < self.capacity,
            "slot {} is out of {} slots",
            index,
            self.capacity
        );
        self.buffer.as_ptr().add(index)
    }

    /// Exchanges blocks. No slot is touched.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    fn allocate(capacity: usize) -> Result<NonNull<T>, AllocError> {
        let layout = Layout::array::<T>(capacity).map_err(|_| AllocError::CapacityOverflow)?;
        if layout.size() == 0 {
            // Zero slots or zero sized T.
            return Ok(NonNull::dangling());
        }

        // This is safe since layout has non zero size.
        let ptr = unsafe { alloc::alloc(layout) } as *mut T;
        match NonNull::new(ptr) {
            Some(buffer) => {
                trace!("Allocated {} slots of {}", capacity, type_name::<T>());
                Ok(buffer)
            }
            None => {
                debug!(
                    "Failed to allocate {} slots of {} ({} bytes)",
                    capacity,
                    type_name::<T>(),
                    layout.size()
                );
                Err(AllocError::OutOfMemory { layout })
            }
        }
    }

    /// # Safety
    /// `buffer` and `capacity` must come from the same successful `allocate`.
    unsafe fn deallocate(buffer: NonNull<T>, capacity: usize) {
        // Same layout as in allocate, which already checked it.
        let layout = Layout::from_size_align_unchecked(
            mem::size_of::<T>() * capacity,
            mem::align_of::<T>(),
        );
        if layout.size() != 0 {
            trace!("Releasing {} slots of {}", capacity, type_name::<T>());
            alloc::dealloc(buffer.as_ptr() as *mut u8, layout);
        }
    }
}

impl<T> Drop for RawMemory<T> {
    fn drop(&mut self) {
        // This is safe since buffer and capacity are only ever set together by allocate.
        unsafe { Self::deallocate(self.buffer, self.capacity) }
    }
}

impl<T> Default for RawMemory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RawMemory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawMemory")
            .field("buffer", &self.buffer)
            .field("capacity", &self.capacity)
            .finish()
    }
}

// Owns the block exclusively, the same as Box<[MaybeUninit<T>]> would.
unsafe impl<T: Send> Send for RawMemory<T> {}
unsafe impl<T: Sync> Sync for RawMemory<T> {}
