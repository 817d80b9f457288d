//! Most-recently-used cursor and its hit/miss bookkeeping.

use super::sorted::SortedElements;

/// Position of the last successfully resolved lookup.
///
/// The cursor holds an index, never a reference into the storage, and it is
/// always re-derived from the storage it belongs to. A set cursor is always
/// `< len` of that storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Cursor(Option<usize>);

impl Cursor {
    /// The cursor of a zero-element sequence.
    pub(crate) const UNSET: Self = Self(None);

    /// Cursor for freshly installed storage: the first element, if any.
    #[inline]
    pub(crate) fn at_start<T>(elements: &SortedElements<T>) -> Self {
        if elements.is_empty() {
            Self::UNSET
        } else {
            Self(Some(0))
        }
    }

    #[inline]
    pub(crate) const fn position(self) -> Option<usize> {
        self.0
    }

    /// Returns `true` if the cursor rests on an element equal to `key`.
    #[inline]
    pub(crate) fn rests_on<T: PartialEq>(self, elements: &SortedElements<T>, key: &T) -> bool {
        self.0
            .and_then(|position| elements.get(position))
            .is_some_and(|element| element == key)
    }

    /// Returns `true` if the cursor is at `index`.
    #[inline]
    pub(crate) fn is_at(self, index: usize) -> bool {
        self.0 == Some(index)
    }

    #[inline]
    pub(crate) fn move_to(&mut self, position: usize) {
        self.0 = Some(position);
    }
}

/// Hit and miss counters of one sequence instance.
///
/// A hit is a lookup answered from the cursor; a miss is a lookup that had
/// to search (or index) the storage, whether or not it found anything.
/// The counters belong to the instance and survive ownership transfer.
///
/// # Examples
///
/// ```rust
/// use mru_sequence::sequence::ConcurrentSortedSequence;
///
/// let sequence = ConcurrentSortedSequence::new(&[50, 10, 40, 20, 30]);
/// sequence.lookup(&40);
/// sequence.lookup(&40);
///
/// let statistics = sequence.statistics();
/// assert_eq!(statistics.hits, 1);
/// assert_eq!(statistics.misses, 1);
/// assert!((statistics.hit_ratio() - 0.5).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStatistics {
    /// Lookups answered from the cursor.
    pub hits: u64,
    /// Lookups that searched the storage.
    pub misses: u64,
}

impl CacheStatistics {
    /// Total number of lookups recorded.
    #[inline]
    pub const fn lookups(&self) -> u64 {
        self.hits.saturating_add(self.misses)
    }

    /// Fraction of lookups answered from the cursor, `0.0` if none were made.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_ratio(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    #[inline]
    pub(crate) const fn record_hit(&mut self) {
        self.hits = self.hits.saturating_add(1);
    }

    #[inline]
    pub(crate) const fn record_miss(&mut self) {
        self.misses = self.misses.saturating_add(1);
    }
}
