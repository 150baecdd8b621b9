use std::{alloc::Layout, fmt::Display};

/// Failure to acquire memory for a storage block.
///
/// Returned by the `try_*` family. Infallible methods turn it into a panic
/// or into [`std::alloc::handle_alloc_error`] through [`AllocError::raise`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// Requested slot count overflows the maximum layout size.
    CapacityOverflow,
    /// Global allocator returned null for the layout.
    OutOfMemory { layout: Layout },
}

impl AllocError {
    /// Reports the failure the way `std` collections do: overflow panics,
    /// allocator failure goes to the global alloc error handler.
    #[cold]
    #[inline(never)]
    #[track_caller]
    pub fn raise(self) -> ! {
        match self {
            Self::CapacityOverflow => panic!("capacity overflow"),
            Self::OutOfMemory { layout } => std::alloc::handle_alloc_error(layout),
        }
    }
}

impl Display for AllocError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapacityOverflow => write!(f, "Requested capacity exceeds maximum layout size."),
            Self::OutOfMemory { layout } => write!(
                f,
                "Failed to allocate {} bytes aligned to {}.",
                layout.size(),
                layout.align()
            ),
        }
    }
}

impl std::error::Error for AllocError {}

/// Unwraps an allocation result, raising the failure on error.
#[inline]
#[track_caller]
pub(crate) fn or_raise<T>(result: Result<T, AllocError>) -> T {
    match result {
        Ok(value) => value,
        Err(error) => error.raise(),
    }
}
