//! Thread-safe sorted sequence with a most-recently-used cursor.
//!
//! This module provides [`ConcurrentSortedSequence`], a sequence whose
//! elements are fixed and sorted at construction. Lookups resolve by binary
//! search and remember the resolved position in a cursor, so a repeated
//! lookup of the same key is answered without searching.
//!
//! # Locking
//!
//! Every instance owns one mutex guarding its storage, its cursor and its
//! statistics. All operations take that lock for their whole critical
//! section, including lookups, because a lookup moves the cursor.
//!
//! Ownership transfer ([`transfer_from`](ConcurrentSortedSequence::transfer_from))
//! touches two instances and takes both locks. Locks are always acquired in
//! ascending instance-id order. Ids are process-unique and assigned from a
//! monotonic counter at construction, so two transfers running in opposite
//! directions between the same pair of instances cannot deadlock. Any new
//! code that locks two sequences must follow the same order.
//!
//! A reader that calls [`lookup`](ConcurrentSortedSequence::lookup) on the
//! source of a transfer observes either the complete old storage or the
//! empty storage left behind, never anything in between.
//!
//! When the source is owned exclusively, a plain Rust move (or
//! [`into_vec`](ConcurrentSortedSequence::into_vec)) transfers the storage
//! without any locking at all: the borrow checker already rules out a
//! concurrent reader.
//!
//! # Examples
//!
//! ```rust
//! use mru_sequence::sequence::ConcurrentSortedSequence;
//!
//! let source = ConcurrentSortedSequence::new(&[50, 10, 40, 20, 30]);
//! assert_eq!(source.len(), 5);
//! assert_eq!(source.lookup(&40), Some(40));
//! assert_eq!(source.lookup(&99), None);
//!
//! let destination = ConcurrentSortedSequence::default();
//! destination.transfer_from(&source);
//! assert_eq!(source.len(), 0);
//! assert_eq!(destination.len(), 5);
//! assert_eq!(destination.lookup(&10), Some(10));
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::cursor::{CacheStatistics, Cursor};
use super::sorted::SortedElements;
use crate::error::SequenceError;
use crate::sync::{Mutex, MutexGuard};

const SEQUENCE_TARGET: &str = "mru_sequence::sequence";
const LOOKUP_TARGET: &str = "mru_sequence::lookup";

/// Source of instance ids, which double as the global lock order.
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(0);

fn next_instance_id() -> u64 {
    NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed)
}

type StateGuard<'a, T> = MutexGuard<'a, SequenceState<T>>;

/// Everything the instance lock protects.
struct SequenceState<T> {
    elements: SortedElements<T>,
    cursor: Cursor,
    statistics: CacheStatistics,
}

impl<T> SequenceState<T> {
    fn new(elements: SortedElements<T>) -> Self {
        let cursor = Cursor::at_start(&elements);
        Self {
            elements,
            cursor,
            statistics: CacheStatistics::default(),
        }
    }

    fn lookup(&mut self, key: &T) -> Option<&T>
    where
        T: Ord,
    {
        let position = if self.cursor.rests_on(&self.elements, key) {
            self.statistics.record_hit();
            trace!(
                target: LOOKUP_TARGET,
                position = self.cursor.position(),
                "lookup_cursor_hit"
            );
            self.cursor.position()
        } else {
            self.statistics.record_miss();
            let found = self.elements.find(key);
            if let Some(position) = found {
                self.cursor.move_to(position);
            }
            trace!(
                target: LOOKUP_TARGET,
                position = found,
                len = self.elements.len(),
                "lookup_binary_search"
            );
            found
        };
        position.and_then(|position| self.elements.get(position))
    }

    fn lookup_index(&mut self, index: usize) -> Option<&T> {
        if self.cursor.is_at(index) {
            self.statistics.record_hit();
            trace!(target: LOOKUP_TARGET, index, "lookup_index_cursor_hit");
        } else {
            self.statistics.record_miss();
            if index < self.elements.len() {
                self.cursor.move_to(index);
            }
            trace!(
                target: LOOKUP_TARGET,
                index,
                len = self.elements.len(),
                "lookup_index_direct"
            );
        }
        self.elements.get(index)
    }

    /// Installs `incoming` and returns the storage it replaces.
    fn install(&mut self, incoming: SortedElements<T>) -> SortedElements<T> {
        let replaced = std::mem::replace(&mut self.elements, incoming);
        self.cursor = Cursor::at_start(&self.elements);
        replaced
    }

    /// Moves the storage out, leaving the zero-element state behind.
    fn drain(&mut self) -> SortedElements<T> {
        self.cursor = Cursor::UNSET;
        self.elements.take()
    }
}

/// A sorted, fixed-content sequence that can be shared between threads.
///
/// `ConcurrentSortedSequence<T>` is built once from an unsorted input and
/// then answers two kinds of queries: lookup by value
/// ([`lookup`](Self::lookup)) and lookup by position
/// ([`lookup_index`](Self::lookup_index)). Both consult the cursor first and
/// fall back to the storage on a miss. The cursor caches a *position*, which
/// is why both query kinds can share it: a value lookup hits when the
/// element under the cursor equals the key, an index lookup hits when the
/// cursor is at the requested index.
///
/// The only structural mutation is ownership transfer, which moves the
/// whole storage to another instance and leaves the source empty.
///
/// # Type Parameters
///
/// * `T` - The element type, `i32` by default. Must implement `Ord`.
///   Duplicates are kept in sorted position; a value lookup resolves to the
///   first of them.
///
/// # Thread Safety
///
/// `ConcurrentSortedSequence<T>` is `Send + Sync` when `T: Send`. Lookups and
/// transfers are linearizable per instance.
///
/// # Examples
///
/// ```rust
/// use mru_sequence::sequence::ConcurrentSortedSequence;
/// use std::sync::Arc;
/// use std::thread;
///
/// let sequence = Arc::new(ConcurrentSortedSequence::from((0..1000).collect::<Vec<i32>>()));
///
/// let handles: Vec<_> = (0..4)
///     .map(|worker| {
///         let sequence = Arc::clone(&sequence);
///         thread::spawn(move || sequence.lookup(&(worker * 100)))
///     })
///     .collect();
///
/// for (worker, handle) in handles.into_iter().enumerate() {
///     let expected = i32::try_from(worker).unwrap() * 100;
///     assert_eq!(handle.join().unwrap(), Some(expected));
/// }
/// ```
pub struct ConcurrentSortedSequence<T = i32> {
    id: u64,
    state: Mutex<SequenceState<T>>,
}

impl<T: Ord> ConcurrentSortedSequence<T> {
    /// Creates a sequence from a copy of `values`, sorted ascending.
    ///
    /// The cursor starts at the first element if there is one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mru_sequence::sequence::ConcurrentSortedSequence;
    ///
    /// let sequence = ConcurrentSortedSequence::new(&[3, 1, 2]);
    /// assert_eq!(sequence.to_vec(), vec![1, 2, 3]);
    /// assert_eq!(sequence.cursor_position(), Some(0));
    /// ```
    pub fn new(values: &[T]) -> Self
    where
        T: Clone,
    {
        Self::from_elements(SortedElements::from_unsorted(values.to_vec()))
    }

    /// Creates a sequence from a copy of `values`, reporting allocation
    /// failure instead of aborting.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::AllocationFailure`] if storage for
    /// `values.len()` elements cannot be reserved.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mru_sequence::sequence::ConcurrentSortedSequence;
    ///
    /// let sequence = ConcurrentSortedSequence::try_new(&[2, 1])?;
    /// assert_eq!(sequence.lookup(&2), Some(2));
    /// # Ok::<(), mru_sequence::error::SequenceError>(())
    /// ```
    pub fn try_new(values: &[T]) -> Result<Self, SequenceError>
    where
        T: Clone,
    {
        SortedElements::try_copy_from(values).map(Self::from_elements)
    }

    fn from_elements(elements: SortedElements<T>) -> Self {
        let id = next_instance_id();
        debug!(
            target: SEQUENCE_TARGET,
            id,
            len = elements.len(),
            "sequence_created"
        );
        Self {
            id,
            state: Mutex::new(SequenceState::new(elements)),
        }
    }

    /// Looks up `key` and returns the stored element equal to it.
    ///
    /// Answers from the cursor when it already rests on `key`; otherwise
    /// binary-searches the storage and, on success, moves the cursor to the
    /// found position. A missing key leaves the cursor where it was.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mru_sequence::sequence::ConcurrentSortedSequence;
    ///
    /// let sequence = ConcurrentSortedSequence::new(&[50, 10, 40, 20, 30]);
    /// assert_eq!(sequence.lookup(&40), Some(40));
    /// assert_eq!(sequence.cursor_position(), Some(3));
    /// assert_eq!(sequence.lookup(&99), None);
    /// assert_eq!(sequence.cursor_position(), Some(3));
    /// ```
    pub fn lookup(&self, key: &T) -> Option<T>
    where
        T: Clone,
    {
        self.state.lock().lookup(key).cloned()
    }

    /// Returns `true` if an element equal to `key` is present.
    ///
    /// Moves the cursor exactly like [`lookup`](Self::lookup).
    pub fn contains(&self, key: &T) -> bool {
        self.state.lock().lookup(key).is_some()
    }

    /// Returns the element at `index` in sorted order.
    ///
    /// On a hit the cursor already sits at `index`; on a miss the element is
    /// read directly and the cursor moves there if `index` is in bounds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mru_sequence::sequence::ConcurrentSortedSequence;
    ///
    /// let sequence = ConcurrentSortedSequence::new(&[50, 10, 40]);
    /// assert_eq!(sequence.lookup_index(2), Some(50));
    /// assert_eq!(sequence.lookup_index(3), None);
    /// assert_eq!(sequence.cursor_position(), Some(2));
    /// ```
    pub fn lookup_index(&self, index: usize) -> Option<T>
    where
        T: Clone,
    {
        self.state.lock().lookup_index(index).cloned()
    }

    /// Like [`lookup`](Self::lookup), but gives up if the lock cannot be
    /// acquired within `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::LockContention`] if the lock is still held by
    /// another thread when `timeout` elapses.
    pub fn try_lookup_for(&self, key: &T, timeout: Duration) -> Result<Option<T>, SequenceError>
    where
        T: Clone,
    {
        let mut state = self.try_lock_for(timeout)?;
        Ok(state.lookup(key).cloned())
    }

    /// Like [`lookup_index`](Self::lookup_index), but gives up if the lock
    /// cannot be acquired within `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::LockContention`] if the lock is still held by
    /// another thread when `timeout` elapses.
    pub fn try_lookup_index_for(
        &self,
        index: usize,
        timeout: Duration,
    ) -> Result<Option<T>, SequenceError>
    where
        T: Clone,
    {
        let mut state = self.try_lock_for(timeout)?;
        Ok(state.lookup_index(index).cloned())
    }

    /// Moves the storage of `source` into `self`.
    ///
    /// Afterwards `self` holds the complete former content of `source` with
    /// its cursor on the first element, and `source` is empty with an unset
    /// cursor, exactly like a freshly constructed empty sequence. Whatever
    /// `self` held before is dropped once both locks are released.
    ///
    /// Both locks are held for the whole move, acquired in ascending
    /// instance-id order. Transferring an instance into itself does nothing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mru_sequence::sequence::ConcurrentSortedSequence;
    ///
    /// let source = ConcurrentSortedSequence::new(&[50, 10, 40, 20, 30]);
    /// let destination = ConcurrentSortedSequence::new(&[99, 88]);
    ///
    /// destination.transfer_from(&source);
    /// assert_eq!(destination.to_vec(), vec![10, 20, 30, 40, 50]);
    /// assert!(source.is_empty());
    /// assert_eq!(source.cursor_position(), None);
    ///
    /// destination.transfer_from(&destination);
    /// assert_eq!(destination.len(), 5);
    /// ```
    pub fn transfer_from(&self, source: &Self) {
        if std::ptr::eq(self, source) {
            trace!(target: SEQUENCE_TARGET, id = self.id, "transfer_into_self_ignored");
            return;
        }
        let replaced = {
            let (mut destination_state, mut source_state) = self.lock_pair(source);
            self.move_storage(&mut destination_state, source, &mut source_state)
        };
        drop(replaced);
    }

    /// Like [`transfer_from`](Self::transfer_from), but gives up if both
    /// locks cannot be acquired within `timeout`.
    ///
    /// The timeout covers both acquisitions together. On failure neither
    /// instance is modified.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::LockContention`] if either lock is still held
    /// by another thread when `timeout` elapses.
    pub fn try_transfer_from_for(
        &self,
        source: &Self,
        timeout: Duration,
    ) -> Result<(), SequenceError> {
        if std::ptr::eq(self, source) {
            trace!(target: SEQUENCE_TARGET, id = self.id, "transfer_into_self_ignored");
            return Ok(());
        }
        let replaced = {
            let (mut destination_state, mut source_state) =
                self.try_lock_pair_for(source, timeout)?;
            self.move_storage(&mut destination_state, source, &mut source_state)
        };
        drop(replaced);
        Ok(())
    }

    /// Moves the storage out into a new instance, leaving `self` empty.
    ///
    /// The new instance gets its own lock and a fresh id; nothing can be
    /// waiting on it yet, so only the lock of `self` is taken.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mru_sequence::sequence::ConcurrentSortedSequence;
    ///
    /// let original = ConcurrentSortedSequence::new(&[2, 1, 3]);
    /// let moved = original.take();
    /// assert_eq!(moved.to_vec(), vec![1, 2, 3]);
    /// assert!(original.is_empty());
    /// ```
    pub fn take(&self) -> Self {
        let elements = self.state.lock().drain();
        let taken = Self::from_elements(elements);
        debug!(
            target: SEQUENCE_TARGET,
            source = self.id,
            destination = taken.id,
            "sequence_taken"
        );
        taken
    }

    fn move_storage(
        &self,
        destination_state: &mut SequenceState<T>,
        source: &Self,
        source_state: &mut SequenceState<T>,
    ) -> SortedElements<T> {
        let replaced = destination_state.install(source_state.drain());
        debug!(
            target: SEQUENCE_TARGET,
            source = source.id,
            destination = self.id,
            moved = destination_state.elements.len(),
            replaced = replaced.len(),
            "ownership_transferred"
        );
        replaced
    }
}

impl<T> ConcurrentSortedSequence<T> {
    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.state.lock().elements.len()
    }

    /// Returns `true` if the sequence holds no elements.
    pub fn is_empty(&self) -> bool {
        self.state.lock().elements.is_empty()
    }

    /// Returns the position the cursor rests on, `None` if it is unset.
    pub fn cursor_position(&self) -> Option<usize> {
        self.state.lock().cursor.position()
    }

    /// Returns the hit and miss counters of this instance.
    pub fn statistics(&self) -> CacheStatistics {
        self.state.lock().statistics
    }

    /// Returns a sorted snapshot of the elements.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.state.lock().elements.as_slice().to_vec()
    }

    /// Consumes the sequence and returns its elements in sorted order.
    ///
    /// No lock is contended here: owning `self` already rules out other
    /// readers.
    pub fn into_vec(self) -> Vec<T> {
        self.state.into_inner().elements.into_vec()
    }

    fn try_lock_for(&self, timeout: Duration) -> Result<StateGuard<'_, T>, SequenceError> {
        self.state.try_lock_for(timeout).ok_or_else(|| {
            debug!(target: SEQUENCE_TARGET, id = self.id, ?timeout, "lock_contention");
            SequenceError::LockContention { timeout }
        })
    }

    /// Locks `self` and `other` in ascending id order and returns the guards
    /// as `(self, other)`.
    fn lock_pair<'a>(&'a self, other: &'a Self) -> (StateGuard<'a, T>, StateGuard<'a, T>) {
        debug_assert_ne!(self.id, other.id, "distinct instances share an id");
        if self.id < other.id {
            let own = self.state.lock();
            let others = other.state.lock();
            (own, others)
        } else {
            let others = other.state.lock();
            let own = self.state.lock();
            (own, others)
        }
    }

    fn try_lock_pair_for<'a>(
        &'a self,
        other: &'a Self,
        timeout: Duration,
    ) -> Result<(StateGuard<'a, T>, StateGuard<'a, T>), SequenceError> {
        debug_assert_ne!(self.id, other.id, "distinct instances share an id");
        let deadline = Instant::now().checked_add(timeout);
        let (first, second) = if self.id < other.id {
            (self, other)
        } else {
            (other, self)
        };

        let first_guard = first.try_lock_for(timeout)?;
        let remaining = deadline.map_or(timeout, |deadline| {
            deadline.saturating_duration_since(Instant::now())
        });
        let second_guard = second.state.try_lock_for(remaining).ok_or_else(|| {
            debug!(target: SEQUENCE_TARGET, id = second.id, ?timeout, "lock_contention");
            SequenceError::LockContention { timeout }
        })?;

        if self.id < other.id {
            Ok((first_guard, second_guard))
        } else {
            Ok((second_guard, first_guard))
        }
    }
}

impl<T: Ord> Default for ConcurrentSortedSequence<T> {
    /// Creates an empty sequence with an unset cursor.
    fn default() -> Self {
        Self::from_elements(SortedElements::default())
    }
}

impl<T: Ord> From<Vec<T>> for ConcurrentSortedSequence<T> {
    /// Takes ownership of `values` and sorts them in place.
    fn from(values: Vec<T>) -> Self {
        Self::from_elements(SortedElements::from_unsorted(values))
    }
}

impl<T: Ord> FromIterator<T> for ConcurrentSortedSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T: fmt::Debug> fmt::Debug for ConcurrentSortedSequence<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = formatter.debug_struct("ConcurrentSortedSequence");
        debug.field("id", &self.id);
        match self.state.try_lock() {
            Some(state) => {
                debug
                    .field("elements", &state.elements.as_slice())
                    .field("cursor", &state.cursor.position());
            }
            None => {
                debug.field("elements", &format_args!("<locked>"));
            }
        }
        debug.finish()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for ConcurrentSortedSequence<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let state = self.state.lock();
        let elements = state.elements.as_slice();
        let mut seq = serializer.serialize_seq(Some(elements.len()))?;
        for element in elements {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for ConcurrentSortedSequence<T>
where
    T: serde::Deserialize<'de> + Ord,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        <Vec<T> as serde::Deserialize>::deserialize(deserializer).map(Self::from)
    }
}

// =============================================================================
// Tests
// =============================================================================
