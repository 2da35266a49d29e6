//! Reference-Counted Resources
//!
//! Every managed object embeds a [`RefCount`]: a count of holders (attachments,
//! bindings, program stages) plus a "flagged for deletion" bit. An object the
//! client already deleted stays alive and usable while something still holds it;
//! it becomes eligible for destruction once the last holder lets go.
//!
//! # Design Principles
//! - The owning edge is a [`ResourceRef`], an `Rc` that adds a holder on creation
//!   and releases it on drop, so "deleted but still attached" never dangles
//! - The object table's own reference is not a holder
//! - Physical destruction is committed by the owning manager (see
//!   `ResourceManager::reap_released`), never by the holder itself
//! - The last holder of a flagged object pushes its handle onto the manager's
//!   [`ReleaseQueue`], so reaping only visits released objects

use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use crate::handle::Handle;

/// Handles whose last holder let go after they were flagged for deletion.
///
/// Shared between a manager and the objects it deferred; drained by the manager.
#[derive(Debug, Clone, Default)]
pub struct ReleaseQueue {
    released: Rc<RefCell<Vec<Handle>>>,
}

impl ReleaseQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, handle: Handle) {
        self.released.borrow_mut().push(handle);
    }

    /// Takes every queued handle, ascending and without duplicates.
    pub fn drain(&self) -> Vec<Handle> {
        let mut handles = std::mem::take(&mut *self.released.borrow_mut());
        handles.sort_unstable();
        handles.dedup();
        handles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.released.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.released.borrow().is_empty()
    }
}

/// Holder count and deletion flag of a managed object.
#[derive(Debug, Default)]
pub struct RefCount {
    holders: Cell<u32>,
    flagged: Cell<bool>,
    release_queue: RefCell<Option<ReleaseQueue>>,
}

impl RefCount {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the holder count, returns the new count
    #[inline]
    pub fn add_ref(&self) -> u32 {
        let count = self.holders.get() + 1;
        self.holders.set(count);
        count
    }

    /// Decrements the holder count.
    ///
    /// Returns `true` when this was the last holder of an object flagged for
    /// deletion, i.e. the object may now be destroyed.
    pub fn release(&self) -> bool {
        let current = self.holders.get();
        debug_assert!(current > 0, "release without matching add_ref");
        let count = current.saturating_sub(1);
        self.holders.set(count);
        count == 0 && self.flagged.get()
    }

    /// Sets the deletion flag without touching the holder count
    #[inline]
    pub fn flag_for_deletion(&self) {
        self.flagged.set(true);
    }

    /// Queue that learns about the final release of this object.
    pub fn notify_on_release(&self, queue: &ReleaseQueue) {
        *self.release_queue.borrow_mut() = Some(queue.clone());
    }

    fn notify_released(&self, handle: Handle) {
        if let Some(queue) = self.release_queue.borrow().as_ref() {
            queue.push(handle);
        }
    }

    #[inline]
    #[must_use]
    pub fn is_flagged_for_deletion(&self) -> bool {
        self.flagged.get()
    }

    /// Current holder count
    #[inline]
    #[must_use]
    pub fn count(&self) -> u32 {
        self.holders.get()
    }

    /// Flagged for deletion and no holder left
    #[inline]
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.flagged.get() && self.holders.get() == 0
    }
}

/// Capability every object kind stored in a `ResourceManager` provides.
pub trait Resource {
    /// Kind name used in logs and errors
    const KIND: &'static str;

    fn id(&self) -> Handle;

    fn ref_count(&self) -> &RefCount;

    /// Called once, right before the manager drops its reference.
    fn on_destroy(&self) {}
}

/// Owning, ref-counted edge to a managed object.
///
/// Holding one keeps the object from being destroyed even after the client
/// deleted it. Dropping the last one makes a flagged object eligible for reaping.
pub struct ResourceRef<T: Resource> {
    inner: Rc<T>,
}

impl<T: Resource> ResourceRef<T> {
    pub fn new(resource: Rc<T>) -> Self {
        resource.ref_count().add_ref();
        Self { inner: resource }
    }

    /// Handle of the referenced object
    #[inline]
    #[must_use]
    pub fn id(&self) -> Handle {
        self.inner.id()
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> &Rc<T> {
        &self.inner
    }

    /// Identity comparison with a table entry
    #[inline]
    #[must_use]
    pub fn refers_to(&self, resource: &Rc<T>) -> bool {
        Rc::ptr_eq(&self.inner, resource)
    }
}

impl<T: Resource> Clone for ResourceRef<T> {
    fn clone(&self) -> Self {
        Self::new(Rc::clone(&self.inner))
    }
}

impl<T: Resource> Drop for ResourceRef<T> {
    fn drop(&mut self) {
        let ref_count = self.inner.ref_count();
        if ref_count.release() {
            log::debug!(
                "Last holder released {} {}; destruction deferred to its manager",
                T::KIND,
                self.inner.id()
            );
            ref_count.notify_released(self.inner.id());
        }
    }
}

impl<T: Resource> Deref for ResourceRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: Resource> PartialEq for ResourceRef<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Resource> Eq for ResourceRef<T> {}

impl<T: Resource> fmt::Debug for ResourceRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRef")
            .field("kind", &T::KIND)
            .field("id", &self.inner.id())
            .field("holders", &self.inner.ref_count().count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy {
        id: Handle,
        ref_count: RefCount,
    }

    impl Resource for Dummy {
        const KIND: &'static str = "dummy";

        fn id(&self) -> Handle {
            self.id
        }

        fn ref_count(&self) -> &RefCount {
            &self.ref_count
        }
    }

    fn dummy(id: u32) -> Rc<Dummy> {
        Rc::new(Dummy {
            id: Handle::new(id),
            ref_count: RefCount::new(),
        })
    }

    #[test]
    fn test_release_reports_last_flagged_holder() {
        let count = RefCount::new();
        count.add_ref();
        count.add_ref();
        count.flag_for_deletion();

        assert!(!count.release());
        assert!(!count.is_released());
        assert!(count.release());
        assert!(count.is_released());
    }

    #[test]
    fn test_release_without_flag_keeps_object() {
        let count = RefCount::new();
        count.add_ref();
        assert!(!count.release());
        assert!(!count.is_released());
    }

    #[test]
    fn test_resource_ref_tracks_holders() {
        let object = dummy(7);

        let first = ResourceRef::new(Rc::clone(&object));
        let second = first.clone();
        assert_eq!(object.ref_count().count(), 2);
        assert_eq!(first, second);
        assert_eq!(second.id(), Handle::new(7));

        drop(first);
        assert_eq!(object.ref_count().count(), 1);
        drop(second);
        assert_eq!(object.ref_count().count(), 0);
    }

    #[test]
    fn test_rebind_adds_before_release() {
        let object = dummy(1);
        object.ref_count().flag_for_deletion();

        let mut slot = Some(ResourceRef::new(Rc::clone(&object)));
        // New holder is created before the old one is dropped
        let replacement = ResourceRef::new(Rc::clone(&object));
        let previous = slot.replace(replacement);
        drop(previous);

        assert_eq!(object.ref_count().count(), 1);
        assert!(!object.ref_count().is_released());
        drop(slot);
        assert!(object.ref_count().is_released());
    }

    #[test]
    fn test_last_release_is_queued() {
        let queue = ReleaseQueue::new();
        let object = dummy(3);
        let holder = ResourceRef::new(Rc::clone(&object));
        let second = holder.clone();

        object.ref_count().flag_for_deletion();
        object.ref_count().notify_on_release(&queue);
        drop(holder);
        assert!(queue.is_empty());

        drop(second);
        assert_eq!(queue.drain(), vec![Handle::new(3)]);
        assert!(queue.is_empty());
    }
}
