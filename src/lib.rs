//! # mru-sequence
//!
//! A sorted sequence of integers that can be shared between threads and
//! remembers where its last lookup landed.
//!
//! ## Overview
//!
//! - **Sorted storage**: elements are copied and sorted once at construction
//!   and never change afterwards; duplicates are kept
//! - **MRU cursor**: the position of the last resolved lookup is cached, so
//!   repeated lookups skip the binary search
//! - **Ownership transfer**: storage can be moved to another instance while
//!   other threads keep issuing lookups against the source
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for sequences
//!
//! Building with `RUSTFLAGS="--cfg loom"` runs the lock through `loom` for
//! model checking.
//!
//! ## Example
//!
//! ```rust
//! use mru_sequence::prelude::*;
//!
//! let source = ConcurrentSortedSequence::new(&[50, 10, 40, 20, 30]);
//! let destination = ConcurrentSortedSequence::default();
//!
//! destination.transfer_from(&source);
//! assert_eq!(destination.lookup(&10), Some(10));
//! assert!(source.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use mru_sequence::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::SequenceError;
    pub use crate::sequence::*;
}

pub mod error;
pub mod sequence;

mod sync;
