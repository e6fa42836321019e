use core::alloc::Layout;

use alloc::alloc::handle_alloc_error;

/// The error type for fallible allocation in [`HashTable`] and [`HashMap`].
///
/// Returned by the `try_*` family of methods. When one of these methods
/// returns an error, the stored entries are unchanged. An insertion may
/// already have grown the table before the failing step, so the capacity
/// can differ from before the call.
///
/// [`HashTable`]: crate::HashTable
/// [`HashMap`]: crate::HashMap
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TryReserveError {
    /// The requested capacity exceeds the largest supported capacity exponent,
    /// or the resulting allocation size overflows `isize`.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// The memory allocator returned an error.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocError {
        /// The layout of the allocation request that failed.
        layout: Layout,
    },
}

/// Whether an allocation failure is reported to the caller or handled with
/// the `alloc` conventions (panic on overflow, abort on allocator failure).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Fallibility {
    Fallible,
    Infallible,
}

impl Fallibility {
    #[cold]
    pub(crate) fn capacity_overflow(self) -> TryReserveError {
        match self {
            Fallibility::Fallible => TryReserveError::CapacityOverflow,
            Fallibility::Infallible => panic!("capacity overflow"),
        }
    }

    #[cold]
    pub(crate) fn alloc_err(self, layout: Layout) -> TryReserveError {
        match self {
            Fallibility::Fallible => TryReserveError::AllocError { layout },
            Fallibility::Infallible => handle_alloc_error(layout),
        }
    }
}

/// Unwraps the result of an infallible operation.
///
/// `Fallibility::Infallible` never produces an `Err`, it panics or aborts
/// first.
#[inline]
pub(crate) fn infallible<T>(result: Result<T, TryReserveError>) -> T {
    match result {
        Ok(value) => value,
        Err(_) => unreachable!("infallible allocation returned an error"),
    }
}
