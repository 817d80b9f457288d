//! Concurrent sorted sequences.
//!
//! This module provides the sequence type and its supporting pieces:
//!
//! - [`ConcurrentSortedSequence`]: a fixed, sorted sequence with a
//!   lock-guarded most-recently-used cursor and race-free ownership transfer
//! - [`CacheStatistics`]: hit and miss counters of the cursor
//!
//! # Examples
//!
//! ```rust
//! use mru_sequence::sequence::ConcurrentSortedSequence;
//!
//! let sequence = ConcurrentSortedSequence::new(&[50, 10, 40, 20, 30]);
//!
//! // Binary search; the cursor was on 10.
//! assert_eq!(sequence.lookup(&40), Some(40));
//! // Answered from the cursor.
//! assert_eq!(sequence.lookup(&40), Some(40));
//! assert_eq!(sequence.statistics().hits, 1);
//!
//! assert_eq!(sequence.lookup(&99), None);
//! ```

mod concurrent;
mod cursor;
mod sorted;

pub use concurrent::ConcurrentSortedSequence;
pub use cursor::CacheStatistics;
