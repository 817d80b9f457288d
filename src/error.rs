//! Error types for sequence operations.
//!
//! A key or index that is not present is not an error: lookups report it
//! as `None`. The variants here cover the two conditions a caller can
//! actually act on.

use std::fmt;
use std::time::Duration;

/// Error returned by the fallible operations of
/// [`ConcurrentSortedSequence`](crate::sequence::ConcurrentSortedSequence).
///
/// # Examples
///
/// ```rust
/// use mru_sequence::error::SequenceError;
/// use std::time::Duration;
///
/// let error = SequenceError::LockContention {
///     timeout: Duration::from_millis(5),
/// };
/// assert!(error.is_lock_contention());
/// assert_eq!(
///     format!("{error}"),
///     "sequence lock not acquired within 5ms"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceError {
    /// Storage for the elements could not be reserved.
    AllocationFailure {
        /// Number of elements that were requested.
        requested: usize,
    },
    /// The instance lock was still held by another thread when the
    /// timeout elapsed.
    LockContention {
        /// The timeout that elapsed.
        timeout: Duration,
    },
}

impl SequenceError {
    /// Returns `true` if this is an [`AllocationFailure`](Self::AllocationFailure).
    #[inline]
    pub const fn is_allocation_failure(&self) -> bool {
        matches!(self, Self::AllocationFailure { .. })
    }

    /// Returns `true` if this is a [`LockContention`](Self::LockContention).
    #[inline]
    pub const fn is_lock_contention(&self) -> bool {
        matches!(self, Self::LockContention { .. })
    }
}

impl fmt::Display for SequenceError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailure { requested } => {
                write!(
                    formatter,
                    "failed to allocate storage for {requested} elements"
                )
            }
            Self::LockContention { timeout } => {
                write!(formatter, "sequence lock not acquired within {timeout:?}")
            }
        }
    }
}

impl std::error::Error for SequenceError {}
