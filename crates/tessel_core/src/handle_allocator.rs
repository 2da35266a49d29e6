//! Handle Allocator
//!
//! Issues, reserves and releases client-visible handles.
//!
//! # Design
//!
//! Used handles are stored as an ordered map of disjoint, merged ranges
//! (`first -> last`, inclusive). Two adjacent ranges are always merged, so:
//! - the lowest free handle is `1` or one past the end of the first range,
//! - a contiguous block of `n` handles is the first gap of length `n` between
//!   two ranges,
//! - releasing a handle in the middle of a range splits it in two.
//!
//! Exhaustion is reported through the [`Handle::NONE`] sentinel; callers map it
//! to an out-of-memory error and roll back whatever they had started.

use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::handle::Handle;

#[derive(Debug, Clone)]
pub struct HandleAllocator {
    /// `first -> last` (inclusive) of every used range
    used: BTreeMap<u32, u32>,
    max_handle: u32,
    used_count: u32,
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_handle(u32::MAX)
    }

    /// Allocator whose handle space is `1..=max_handle`.
    #[must_use]
    pub fn with_max_handle(max_handle: u32) -> Self {
        Self {
            used: BTreeMap::new(),
            max_handle,
            used_count: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn max_handle(&self) -> u32 {
        self.max_handle
    }

    /// Number of handles currently in use.
    #[inline]
    #[must_use]
    pub fn used_count(&self) -> u32 {
        self.used_count
    }

    /// Returns the lowest unused handle, or [`Handle::NONE`] when the space is exhausted.
    pub fn allocate(&mut self) -> Handle {
        let candidate = match self.used.first_key_value() {
            Some((&1, &last)) => match last.checked_add(1) {
                Some(next) => next,
                None => return self.exhausted(1),
            },
            _ => 1,
        };
        if candidate > self.max_handle {
            return self.exhausted(1);
        }

        self.mark_used(candidate, candidate);
        log::trace!("Allocated handle {candidate}");
        Handle::new(candidate)
    }

    /// Marks an externally chosen handle as used.
    ///
    /// Returns `false` if the handle is 0, outside the handle space, or already used.
    pub fn reserve(&mut self, handle: Handle) -> bool {
        let raw = handle.get();
        if raw == 0 || raw > self.max_handle || self.is_used(handle) {
            return false;
        }
        self.mark_used(raw, raw);
        log::trace!("Reserved handle {raw}");
        true
    }

    /// Returns a handle to the free pool.
    pub fn release(&mut self, handle: Handle) {
        if handle.is_none() {
            return;
        }
        let freed = self.mark_free(handle.get(), handle.get());
        debug_assert_eq!(freed, 1, "released handle {handle} was not in use");
        log::trace!("Released handle {handle}");
    }

    /// Reserves `count` contiguous handles and returns the first one.
    ///
    /// The lowest block that fits is used. Returns [`Handle::NONE`] when no such
    /// block exists; nothing is reserved in that case.
    pub fn allocate_range(&mut self, count: u32) -> Handle {
        if count == 0 {
            return Handle::NONE;
        }

        let wanted = u64::from(count);
        let mut candidate: u64 = 1;
        for (&first, &last) in &self.used {
            if u64::from(first) - candidate >= wanted {
                break;
            }
            candidate = u64::from(last) + 1;
        }

        let last = candidate + wanted - 1;
        if last > u64::from(self.max_handle) {
            return self.exhausted(count);
        }

        self.mark_used(candidate as u32, last as u32);
        log::trace!("Allocated handle range {candidate}..={last}");
        Handle::new(candidate as u32)
    }

    /// Releases `count` handles starting at `first`.
    ///
    /// Handles in the range that are already free are ignored, so a range whose
    /// members were partially released stays safe to release as a whole.
    pub fn release_range(&mut self, first: Handle, count: u32) {
        if first.is_none() || count == 0 {
            return;
        }
        let last = first.get().saturating_add(count - 1);
        let freed = self.mark_free(first.get(), last);
        log::trace!("Released handle range {first}+{count} ({freed} were in use)");
    }

    #[must_use]
    pub fn is_used(&self, handle: Handle) -> bool {
        let raw = handle.get();
        self.used
            .range(..=raw)
            .next_back()
            .is_some_and(|(_, &last)| last >= raw)
    }

    fn exhausted(&self, count: u32) -> Handle {
        log::warn!(
            "Handle space exhausted: no free block of {count} handle(s) below {}",
            self.max_handle
        );
        Handle::NONE
    }

    fn mark_used(&mut self, first: u32, last: u32) {
        let mut first = first;
        let mut last = last;

        if let Some((&prev_first, &prev_last)) = self.used.range(..first).next_back()
            && prev_last.saturating_add(1) >= first
        {
            first = prev_first;
            last = last.max(prev_last);
            self.used.remove(&prev_first);
        }

        while let Some((&next_first, &next_last)) = self.used.range(first..).next() {
            if next_first > last.saturating_add(1) {
                break;
            }
            last = last.max(next_last);
            self.used.remove(&next_first);
        }

        self.used.insert(first, last);
        self.used_count = self.count_used();
    }

    /// Frees `first..=last`; returns how many of those handles were in use.
    fn mark_free(&mut self, first: u32, last: u32) -> u32 {
        let overlapping: SmallVec<[(u32, u32); 4]> = self
            .used
            .range(..=last)
            .rev()
            .take_while(|&(_, &range_last)| range_last >= first)
            .map(|(&range_first, &range_last)| (range_first, range_last))
            .collect();

        let mut freed = 0u32;
        for (range_first, range_last) in overlapping {
            self.used.remove(&range_first);
            if range_first < first {
                self.used.insert(range_first, first - 1);
            }
            if range_last > last {
                self.used.insert(last + 1, range_last);
            }
            freed += range_last.min(last) - range_first.max(first) + 1;
        }

        self.used_count -= freed;
        freed
    }

    fn count_used(&self) -> u32 {
        self.used
            .iter()
            .map(|(&first, &last)| last - first + 1)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_is_lowest_available() {
        let mut allocator = HandleAllocator::new();
        assert_eq!(allocator.allocate(), Handle::new(1));
        assert_eq!(allocator.allocate(), Handle::new(2));
        assert_eq!(allocator.allocate(), Handle::new(3));

        allocator.release(Handle::new(2));
        assert_eq!(allocator.allocate(), Handle::new(2));
        assert_eq!(allocator.allocate(), Handle::new(4));
        assert_eq!(allocator.used_count(), 4);
    }

    #[test]
    fn test_reserve_skips_external_handles() {
        let mut allocator = HandleAllocator::new();
        assert!(allocator.reserve(Handle::new(2)));
        assert!(!allocator.reserve(Handle::new(2)));
        assert!(!allocator.reserve(Handle::NONE));

        assert_eq!(allocator.allocate(), Handle::new(1));
        assert_eq!(allocator.allocate(), Handle::new(3));
    }

    #[test]
    fn test_range_fills_first_fitting_gap() {
        let mut allocator = HandleAllocator::new();
        assert_eq!(allocator.allocate_range(10), Handle::new(1));
        allocator.release_range(Handle::new(3), 3);
        assert_eq!(allocator.used_count(), 7);

        // 3..=5 is free: a block of 4 does not fit there
        assert_eq!(allocator.allocate_range(4), Handle::new(11));
        assert_eq!(allocator.allocate_range(3), Handle::new(3));
        assert_eq!(allocator.allocate(), Handle::new(15));
    }

    #[test]
    fn test_release_splits_range() {
        let mut allocator = HandleAllocator::new();
        allocator.allocate_range(5);
        allocator.release(Handle::new(3));

        assert!(allocator.is_used(Handle::new(2)));
        assert!(!allocator.is_used(Handle::new(3)));
        assert!(allocator.is_used(Handle::new(4)));
        assert_eq!(allocator.allocate(), Handle::new(3));
    }

    #[test]
    fn test_exhaustion_returns_sentinel() {
        let mut allocator = HandleAllocator::with_max_handle(4);
        for expected in 1..=4 {
            assert_eq!(allocator.allocate(), Handle::new(expected));
        }
        assert_eq!(allocator.allocate(), Handle::NONE);
        assert!(!allocator.reserve(Handle::new(5)));

        allocator.release_range(Handle::new(1), 2);
        assert_eq!(allocator.allocate_range(3), Handle::NONE);
        assert_eq!(allocator.allocate_range(2), Handle::new(1));
    }

    #[test]
    fn test_release_range_tolerates_holes() {
        let mut allocator = HandleAllocator::new();
        allocator.allocate_range(6);
        allocator.release(Handle::new(2));
        allocator.release(Handle::new(5));

        allocator.release_range(Handle::new(1), 6);
        assert_eq!(allocator.used_count(), 0);
        assert_eq!(allocator.allocate_range(6), Handle::new(1));
    }
}
