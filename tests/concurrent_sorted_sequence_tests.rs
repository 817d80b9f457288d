#![cfg(not(loom))]

use mru_sequence::error::SequenceError;
use mru_sequence::sequence::{CacheStatistics, ConcurrentSortedSequence};
use rstest::rstest;
use std::time::Duration;

fn sample_sequence() -> ConcurrentSortedSequence {
    // Sorted order: 10, 20, 30, 40, 50
    ConcurrentSortedSequence::new(&[50, 10, 40, 20, 30])
}

// =============================================================================
// Construction
// =============================================================================

#[rstest]
fn construction_sorts_and_counts() {
    let sequence = sample_sequence();
    assert_eq!(sequence.len(), 5);
    assert!(!sequence.is_empty());
    assert_eq!(sequence.to_vec(), vec![10, 20, 30, 40, 50]);
}

#[rstest]
fn construction_places_cursor_on_first_element() {
    assert_eq!(sample_sequence().cursor_position(), Some(0));
}

#[rstest]
fn construction_from_empty_input() {
    let sequence = ConcurrentSortedSequence::<i32>::new(&[]);
    assert_eq!(sequence.len(), 0);
    assert!(sequence.is_empty());
    assert_eq!(sequence.cursor_position(), None);
}

#[rstest]
fn construction_keeps_duplicates() {
    let sequence = ConcurrentSortedSequence::new(&[4, 2, 4, 1, 2]);
    assert_eq!(sequence.to_vec(), vec![1, 2, 2, 4, 4]);
    assert_eq!(sequence.len(), 5);
}

#[rstest]
fn construction_does_not_touch_input() {
    let input = vec![3, 1, 2];
    let _sequence = ConcurrentSortedSequence::new(&input);
    assert_eq!(input, vec![3, 1, 2]);
}

#[rstest]
fn construction_from_vec_and_iterator_agree() {
    let from_vec = ConcurrentSortedSequence::from(vec![9, -3, 5]);
    let from_iterator: ConcurrentSortedSequence = [9, -3, 5].into_iter().collect();
    assert_eq!(from_vec.to_vec(), from_iterator.to_vec());
    assert_eq!(from_vec.to_vec(), vec![-3, 5, 9]);
}

#[rstest]
fn try_new_succeeds_for_ordinary_input() {
    let sequence = ConcurrentSortedSequence::try_new(&[i32::MAX, i32::MIN, 0]).unwrap();
    assert_eq!(sequence.to_vec(), vec![i32::MIN, 0, i32::MAX]);
}

#[rstest]
fn default_is_empty() {
    let sequence: ConcurrentSortedSequence = ConcurrentSortedSequence::default();
    assert!(sequence.is_empty());
    assert_eq!(sequence.lookup(&0), None);
}

#[rstest]
fn into_vec_returns_sorted_elements() {
    assert_eq!(sample_sequence().into_vec(), vec![10, 20, 30, 40, 50]);
}

// =============================================================================
// Lookup by value
// =============================================================================

#[rstest]
#[case(10)]
#[case(30)]
#[case(50)]
fn lookup_finds_present_values(#[case] key: i32) {
    assert_eq!(sample_sequence().lookup(&key), Some(key));
}

#[rstest]
#[case(99)]
#[case(0)]
#[case(35)]
#[case(i32::MIN)]
fn lookup_misses_absent_values(#[case] key: i32) {
    let sequence = sample_sequence();
    assert_eq!(sequence.lookup(&key), None);
    assert!(!sequence.contains(&key));
}

#[rstest]
fn lookup_on_empty_sequence_returns_none() {
    let sequence = ConcurrentSortedSequence::<i32>::new(&[]);
    assert_eq!(sequence.lookup(&0), None);
    assert_eq!(sequence.lookup_index(0), None);
    assert_eq!(sequence.cursor_position(), None);
}

#[rstest]
fn lookup_moves_cursor_to_found_position() {
    let sequence = sample_sequence();
    assert_eq!(sequence.lookup(&40), Some(40));
    assert_eq!(sequence.cursor_position(), Some(3));
}

#[rstest]
fn failed_lookup_leaves_cursor_in_place() {
    let sequence = sample_sequence();
    sequence.lookup(&30);
    assert_eq!(sequence.lookup(&31), None);
    assert_eq!(sequence.cursor_position(), Some(2));
}

#[rstest]
fn lookup_with_duplicates_resolves_first_occurrence() {
    let sequence = ConcurrentSortedSequence::new(&[5, 1, 5, 5, 9]);
    assert_eq!(sequence.lookup(&5), Some(5));
    assert_eq!(sequence.cursor_position(), Some(1));
}

// =============================================================================
// Cursor cache
// =============================================================================

#[rstest]
fn repeated_lookup_hits_the_cursor() {
    let sequence = sample_sequence();

    assert_eq!(sequence.lookup(&40), Some(40));
    assert_eq!(sequence.lookup(&40), Some(40));

    assert_eq!(
        sequence.statistics(),
        CacheStatistics { hits: 1, misses: 1 }
    );
}

#[rstest]
fn first_element_hits_without_prior_lookup() {
    let sequence = sample_sequence();
    assert_eq!(sequence.lookup(&10), Some(10));
    assert_eq!(sequence.statistics().hits, 1);
}

#[rstest]
fn alternating_keys_update_the_cursor() {
    let sequence = sample_sequence();

    assert_eq!(sequence.lookup(&30), Some(30));
    assert_eq!(sequence.lookup(&30), Some(30));
    assert_eq!(sequence.lookup(&10), Some(10));
    assert_eq!(sequence.lookup(&10), Some(10));

    let statistics = sequence.statistics();
    assert_eq!(statistics.hits, 2);
    assert_eq!(statistics.misses, 2);
    assert_eq!(statistics.lookups(), 4);
}

#[rstest]
fn value_and_index_lookups_share_the_cursor() {
    let sequence = sample_sequence();

    assert_eq!(sequence.lookup(&40), Some(40));
    assert_eq!(sequence.lookup_index(3), Some(40));
    assert_eq!(sequence.statistics().hits, 1);

    assert_eq!(sequence.lookup_index(1), Some(20));
    assert_eq!(sequence.lookup(&20), Some(20));
    assert_eq!(sequence.statistics().hits, 2);
}

// =============================================================================
// Lookup by index
// =============================================================================

#[rstest]
#[case(0, Some(10))]
#[case(2, Some(30))]
#[case(4, Some(50))]
#[case(5, None)]
#[case(usize::MAX, None)]
fn lookup_index_reads_sorted_positions(#[case] index: usize, #[case] expected: Option<i32>) {
    assert_eq!(sample_sequence().lookup_index(index), expected);
}

#[rstest]
fn lookup_index_out_of_bounds_leaves_cursor_in_place() {
    let sequence = sample_sequence();
    sequence.lookup_index(4);
    assert_eq!(sequence.lookup_index(17), None);
    assert_eq!(sequence.cursor_position(), Some(4));
}

// =============================================================================
// Ownership transfer
// =============================================================================

#[rstest]
fn take_moves_everything_into_a_new_instance() {
    let source = sample_sequence();
    let moved = source.take();

    assert_eq!(moved.len(), 5);
    assert_eq!(moved.lookup(&10), Some(10));

    assert_eq!(source.len(), 0);
    assert_eq!(source.lookup(&10), None);
    assert_eq!(source.cursor_position(), None);
}

#[rstest]
fn transfer_replaces_destination_content() {
    let source = sample_sequence();
    let destination = ConcurrentSortedSequence::new(&[99, 88]);

    destination.transfer_from(&source);

    assert_eq!(destination.len(), 5);
    assert_eq!(destination.lookup(&20), Some(20));
    assert_eq!(destination.lookup(&99), None);

    assert_eq!(source.len(), 0);
    assert_eq!(source.lookup(&20), None);
}

#[rstest]
fn transfer_resets_destination_cursor_to_first_element() {
    let source = sample_sequence();
    let destination = ConcurrentSortedSequence::new(&[1, 2, 3]);
    destination.lookup(&3);

    destination.transfer_from(&source);
    assert_eq!(destination.cursor_position(), Some(0));
}

#[rstest]
fn transfer_from_empty_source_empties_destination() {
    let source: ConcurrentSortedSequence = ConcurrentSortedSequence::default();
    let destination = sample_sequence();

    destination.transfer_from(&source);

    assert!(destination.is_empty());
    assert_eq!(destination.cursor_position(), None);
    assert!(source.is_empty());
}

#[rstest]
fn transfer_into_self_is_a_no_op() {
    let sequence = sample_sequence();
    sequence.lookup(&30);

    sequence.transfer_from(&sequence);

    assert_eq!(sequence.len(), 5);
    assert_eq!(sequence.to_vec(), vec![10, 20, 30, 40, 50]);
    assert_eq!(sequence.cursor_position(), Some(2));
    assert_eq!(sequence.lookup(&10), Some(10));
}

#[rstest]
fn transfer_works_in_both_id_orders() {
    let older = ConcurrentSortedSequence::new(&[1, 2]);
    let newer = ConcurrentSortedSequence::new(&[3, 4, 5]);

    older.transfer_from(&newer);
    assert_eq!(older.to_vec(), vec![3, 4, 5]);
    assert!(newer.is_empty());

    newer.transfer_from(&older);
    assert_eq!(newer.to_vec(), vec![3, 4, 5]);
    assert!(older.is_empty());
}

#[rstest]
fn source_is_reusable_as_destination_after_transfer() {
    let first = sample_sequence();
    let second: ConcurrentSortedSequence = ConcurrentSortedSequence::default();
    let third = ConcurrentSortedSequence::new(&[7]);

    second.transfer_from(&first);
    first.transfer_from(&third);

    assert_eq!(first.to_vec(), vec![7]);
    assert_eq!(first.lookup(&7), Some(7));
    assert_eq!(second.len(), 5);
    assert!(third.is_empty());
}

#[rstest]
fn statistics_stay_with_the_instance() {
    let source = sample_sequence();
    source.lookup(&50);
    let destination: ConcurrentSortedSequence = ConcurrentSortedSequence::default();

    destination.transfer_from(&source);

    assert_eq!(source.statistics().misses, 1);
    assert_eq!(destination.statistics(), CacheStatistics::default());
}

#[rstest]
fn native_move_needs_no_transfer_call() {
    let source = sample_sequence();
    let moved = source;
    assert_eq!(moved.lookup(&50), Some(50));
}

// =============================================================================
// Timed acquisition
// =============================================================================

#[rstest]
fn timed_operations_succeed_without_contention() {
    let source = sample_sequence();
    let destination: ConcurrentSortedSequence = ConcurrentSortedSequence::default();
    let timeout = Duration::from_millis(50);

    assert_eq!(source.try_lookup_for(&20, timeout), Ok(Some(20)));
    assert_eq!(source.try_lookup_index_for(9, timeout), Ok(None));

    destination.try_transfer_from_for(&source, timeout).unwrap();
    assert_eq!(destination.len(), 5);
    assert!(source.is_empty());

    assert_eq!(destination.try_transfer_from_for(&destination, timeout), Ok(()));
    assert_eq!(destination.len(), 5);
}

#[rstest]
fn zero_timeout_succeeds_on_free_lock() {
    let sequence = sample_sequence();
    assert_eq!(sequence.try_lookup_for(&30, Duration::ZERO), Ok(Some(30)));
}

#[rstest]
fn lock_contention_error_reports_timeout() {
    let error = SequenceError::LockContention {
        timeout: Duration::from_millis(3),
    };
    assert!(error.is_lock_contention());
    assert!(!error.is_allocation_failure());
}

// =============================================================================
// Formatting
// =============================================================================

#[rstest]
fn debug_lists_sorted_elements() {
    let rendered = format!("{:?}", ConcurrentSortedSequence::new(&[2, 1]));
    assert!(rendered.starts_with("ConcurrentSortedSequence"));
    assert!(rendered.contains("[1, 2]"));
}

#[rstest]
fn generic_element_types_are_supported() {
    let sequence = ConcurrentSortedSequence::new(&["pear", "apple", "fig"]);
    assert_eq!(sequence.lookup(&"fig"), Some("fig"));
    assert_eq!(sequence.lookup_index(0), Some("apple"));
}
