//! Handle Allocator Tests
//!
//! Tests for:
//! - Lowest-available issuing and reuse
//! - Client-chosen handles (reserve)
//! - Contiguous ranges: first fit, release, reallocation
//! - Exhaustion of a bounded handle space

use std::collections::BTreeSet;

use tessel::prelude::*;

// ============================================================================
// Single handles
// ============================================================================

#[test]
fn allocated_handles_are_nonzero_and_unique() {
    let mut allocator = HandleAllocator::new();
    let mut seen = BTreeSet::new();

    for _ in 0..100 {
        let handle = allocator.allocate();
        assert!(handle.is_some(), "allocator issued the reserved handle 0");
        assert!(seen.insert(handle), "handle {handle} issued twice");
    }
    assert_eq!(allocator.used_count(), 100);
}

#[test]
fn released_handles_are_reused_lowest_first() {
    let mut allocator = HandleAllocator::new();
    for _ in 0..10 {
        allocator.allocate();
    }

    // Release every third handle: 3, 6, 9
    for raw in [9, 3, 6] {
        allocator.release(Handle::new(raw));
    }

    assert_eq!(allocator.allocate(), Handle::new(3));
    assert_eq!(allocator.allocate(), Handle::new(6));
    assert_eq!(allocator.allocate(), Handle::new(9));
    assert_eq!(allocator.allocate(), Handle::new(11));
}

#[test]
fn reserved_handles_are_never_issued() {
    let mut allocator = HandleAllocator::new();
    assert!(allocator.reserve(Handle::new(1)));
    assert!(allocator.reserve(Handle::new(3)));

    assert_eq!(allocator.allocate(), Handle::new(2));
    assert_eq!(allocator.allocate(), Handle::new(4));
    assert!(!allocator.reserve(Handle::new(4)), "4 is already in use");
}

// ============================================================================
// Ranges
// ============================================================================

#[test]
fn range_can_be_reallocated_after_release() {
    let mut allocator = HandleAllocator::new();
    allocator.allocate();

    let first = allocator.allocate_range(16);
    assert_eq!(first, Handle::new(2));
    for offset in 0..16 {
        assert!(allocator.is_used(Handle::new(2 + offset)));
    }

    allocator.release_range(first, 16);
    assert_eq!(allocator.used_count(), 1);

    let again = allocator.allocate_range(16);
    assert_eq!(again, first, "the freed block is the lowest fit");
}

#[test]
fn range_skips_gaps_that_are_too_small() {
    let mut allocator = HandleAllocator::new();
    allocator.allocate_range(8);
    allocator.release(Handle::new(2));
    allocator.release(Handle::new(5));
    allocator.release(Handle::new(6));

    assert_eq!(allocator.allocate_range(3), Handle::new(9));
    assert_eq!(allocator.allocate_range(2), Handle::new(5));
    assert_eq!(allocator.allocate(), Handle::new(2));
}

#[test]
fn single_handles_fill_around_ranges() {
    let mut allocator = HandleAllocator::new();
    assert!(allocator.reserve(Handle::new(4)));

    assert_eq!(allocator.allocate_range(3), Handle::new(1));
    assert_eq!(allocator.allocate(), Handle::new(5));
}

// ============================================================================
// Exhaustion
// ============================================================================

#[test]
fn bounded_space_reports_exhaustion() {
    let mut allocator = HandleAllocator::with_max_handle(8);
    assert_eq!(allocator.allocate_range(8), Handle::new(1));
    assert_eq!(allocator.allocate(), Handle::NONE);
    assert_eq!(allocator.allocate_range(1), Handle::NONE);

    allocator.release_range(Handle::new(3), 2);
    assert_eq!(allocator.allocate_range(3), Handle::NONE, "only 2 handles are free");
    assert_eq!(allocator.used_count(), 6, "failed allocation must not reserve");
    assert_eq!(allocator.allocate_range(2), Handle::new(3));
}

#[test]
fn empty_range_is_rejected() {
    let mut allocator = HandleAllocator::new();
    assert_eq!(allocator.allocate_range(0), Handle::NONE);
    assert_eq!(allocator.used_count(), 0);
}
