use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::handle::Handle;

/// State of a handle in an [`ObjectTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Never issued, or already deleted
    Unallocated,
    /// Handle issued, object not constructed yet
    Empty,
    /// Handle issued and object constructed
    Filled,
}

/// Handle -> object slot mapping.
///
/// A slot is either empty (`None`: name generated, object not built yet) or
/// filled. Handles absent from the map are unallocated.
pub struct ObjectTable<T> {
    slots: FxHashMap<Handle, Option<Rc<T>>>,
}

impl<T> Default for ObjectTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ObjectTable<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: FxHashMap::default(),
        }
    }

    /// Creates an empty slot. An existing slot is left untouched.
    pub fn insert_empty(&mut self, handle: Handle) {
        self.slots.entry(handle).or_insert(None);
    }

    /// Stores the object for `handle`, replacing whatever the slot held.
    pub fn fill(&mut self, handle: Handle, object: Rc<T>) {
        self.slots.insert(handle, Some(object));
    }

    /// The object stored for `handle`, if its slot is filled.
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&Rc<T>> {
        self.slots.get(&handle).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn state(&self, handle: Handle) -> SlotState {
        match self.slots.get(&handle) {
            None => SlotState::Unallocated,
            Some(None) => SlotState::Empty,
            Some(Some(_)) => SlotState::Filled,
        }
    }

    /// Removes the slot. Returns the object if it was filled.
    pub fn remove(&mut self, handle: Handle) -> Option<Rc<T>> {
        self.slots.remove(&handle).flatten()
    }

    #[must_use]
    pub fn contains(&self, handle: Handle) -> bool {
        self.slots.contains_key(&handle)
    }

    /// Every allocated handle, ascending.
    #[must_use]
    pub fn handles(&self) -> Vec<Handle> {
        let mut handles: Vec<Handle> = self.slots.keys().copied().collect();
        handles.sort_unstable();
        handles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Filled slots, in no particular order.
    pub fn iter_filled(&self) -> impl Iterator<Item = (Handle, &Rc<T>)> {
        self.slots
            .iter()
            .filter_map(|(&handle, slot)| slot.as_ref().map(|object| (handle, object)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_lifecycle() {
        let mut table: ObjectTable<&str> = ObjectTable::new();
        let handle = Handle::new(3);
        assert_eq!(table.state(handle), SlotState::Unallocated);

        table.insert_empty(handle);
        assert_eq!(table.state(handle), SlotState::Empty);
        assert!(table.get(handle).is_none());
        assert!(table.contains(handle));

        table.fill(handle, Rc::new("texture"));
        assert_eq!(table.state(handle), SlotState::Filled);
        assert_eq!(table.get(handle).map(|object| **object), Some("texture"));

        // insert_empty never clobbers a filled slot
        table.insert_empty(handle);
        assert_eq!(table.state(handle), SlotState::Filled);

        assert!(table.remove(handle).is_some());
        assert_eq!(table.state(handle), SlotState::Unallocated);
    }

    #[test]
    fn test_handles_are_sorted() {
        let mut table: ObjectTable<u8> = ObjectTable::new();
        for raw in [9, 2, 5] {
            table.insert_empty(Handle::new(raw));
        }
        table.fill(Handle::new(5), Rc::new(0));

        assert_eq!(
            table.handles(),
            vec![Handle::new(2), Handle::new(5), Handle::new(9)]
        );
        assert_eq!(table.len(), 3);
        assert_eq!(table.iter_filled().count(), 1);
    }
}
