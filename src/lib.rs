//! # Goal
//! A growable contiguous container with value semantics, amortized constant
//! time append, random access and manual control over allocated versus used
//! capacity.
//!
//! # Architecture
//! Two pieces, one on top of the other:
//! - [`RawMemory`] - a block of uninitialized slots.
//!      - Responsible for: Is there memory for N values? (In pointer terms: is it allocated?)
//! - [`Vector`] - values living in a [`RawMemory`].
//!      - Responsible for: Which slots hold a value? (In pointer terms: is it initialized?)
//!
//! Growth allocates a new block, constructs the new value in it, relocates
//! the rest, and swaps blocks. A panicking constructor or a failed
//! allocation therefore leaves the vector as it was.
//!
//! # Contracts
//! Allocation failure is reported through `try_*` methods as [`AllocError`].
//! Infallible counterparts panic on capacity overflow and go through
//! [`std::alloc::handle_alloc_error`] when the allocator fails.
//!
//! Raw slot access is unchecked with debug only assertions. Safe entry
//! points of [`Vector`] panic on out of range positions. `pop_back` on an
//! empty vector is checked only in debug builds.
//!
//! ```
//! use advanced_vector::{vector, Vector};
//!
//! let mut v: Vector<u32> = vector![1, 2, 3];
//! v.insert(0, v[2]);
//! assert_eq!(v, [3, 1, 2, 3]);
//!
//! let next = v.erase(1);
//! assert_eq!(v[next], 2);
//! ```

pub mod error;
pub mod raw;
#[macro_use]
pub mod vector;

pub use error::AllocError;
pub use raw::RawMemory;
pub use vector::{IntoIter, Vector};
