//! Immutable sorted element storage.

use crate::error::SequenceError;

/// Panic message used when the sortedness invariant is violated.
const SORTED_INVARIANT_PANIC_MESSAGE: &str = "SortedElements invariant violated: elements must be sorted in non-decreasing order";

/// A `Vec` kept in non-decreasing order.
///
/// Duplicates are preserved in sorted position. The content never changes
/// after construction; the only mutation is moving the whole buffer out.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct SortedElements<T>(Vec<T>);

impl<T> Default for SortedElements<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T: Ord> SortedElements<T> {
    /// Sorts `elements` in place and takes ownership of them.
    pub(crate) fn from_unsorted(mut elements: Vec<T>) -> Self {
        elements.sort();
        Self::from_sorted(elements)
    }

    /// Copies `values` into freshly reserved storage and sorts the copy.
    ///
    /// Reports [`SequenceError::AllocationFailure`] instead of aborting when
    /// the reservation cannot be satisfied.
    pub(crate) fn try_copy_from(values: &[T]) -> Result<Self, SequenceError>
    where
        T: Clone,
    {
        let mut elements = Vec::new();
        elements
            .try_reserve_exact(values.len())
            .map_err(|_| SequenceError::AllocationFailure {
                requested: values.len(),
            })?;
        elements.extend_from_slice(values);
        Ok(Self::from_unsorted(elements))
    }

    #[inline]
    fn from_sorted(elements: Vec<T>) -> Self {
        debug_assert!(elements.is_sorted(), "{}", SORTED_INVARIANT_PANIC_MESSAGE);
        Self(elements)
    }

    /// Index of the first element equal to `key`, if any.
    pub(crate) fn find(&self, key: &T) -> Option<usize> {
        let position = self.0.partition_point(|element| element < key);
        self.0
            .get(position)
            .filter(|element| *element == key)
            .map(|_| position)
    }
}

impl<T> SortedElements<T> {
    #[inline]
    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.0.get(index)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[T] {
        &self.0
    }

    /// Moves the buffer out, leaving empty storage behind.
    #[inline]
    pub(crate) fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    #[inline]
    pub(crate) fn into_vec(self) -> Vec<T> {
        self.0
    }
}
