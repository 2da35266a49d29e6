//! Resource Manager
//!
//! A generic handle -> object table for one resource kind, with two-phase
//! creation and deferred, ref-counted deletion.
//!
//! # Lifecycle
//!
//! ```text
//! allocate_empty_object ──► Empty ──check_object_allocation──► Filled
//! insert_object ───────────────────────────────────────────────► Filled
//! check_object_allocation(unknown id) ─────────────────────────► Filled
//!
//! Filled ──delete_object(policy = true)──► on_destroy, removed, handle freed
//! Filled ──delete_object(policy = false)─► flagged, stays in the table
//! flagged + last holder released ──reap_released──► on_destroy, removed
//! ```
//!
//! The deletion policy is supplied per call, so one manager type serves every
//! kind: [`destroy_now`] for kinds nothing else holds, [`defer_while_referenced`]
//! for kinds held by attachments or program stages.
//!
//! A *default object* (handle 0, e.g. the window-system framebuffer) can be
//! registered. It is owned externally and never destroyed by the manager.

use std::rc::Rc;

use crate::errors::{Result, TesselError};
use crate::handle::Handle;
use crate::handle_allocator::HandleAllocator;
use crate::object_table::{ObjectTable, SlotState};
use crate::ref_count::{ReleaseQueue, Resource};

/// Deletion policy: destroy immediately, regardless of holders.
pub fn destroy_now<T: Resource>(_object: &T) -> bool {
    true
}

/// Deletion policy: destroy if nothing holds the object, otherwise flag it.
pub fn defer_while_referenced<T: Resource>(object: &T) -> bool {
    let ref_count = object.ref_count();
    if ref_count.count() == 0 {
        true
    } else {
        ref_count.flag_for_deletion();
        false
    }
}

pub struct ResourceManager<T: Resource> {
    handles: HandleAllocator,
    objects: ObjectTable<T>,
    default_object: Option<Rc<T>>,
    /// Deferred objects report their final release here
    released: ReleaseQueue,
}

impl<T: Resource> Default for ResourceManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Resource> ResourceManager<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_handle_allocator(HandleAllocator::new())
    }

    /// Manager drawing handles from a pre-configured allocator (e.g. a bounded one).
    #[must_use]
    pub fn with_handle_allocator(handles: HandleAllocator) -> Self {
        Self {
            handles,
            objects: ObjectTable::new(),
            default_object: None,
            released: ReleaseQueue::new(),
        }
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Issues a handle with an empty slot ("generate now, define later").
    pub fn allocate_empty_object(&mut self) -> Result<Handle> {
        self.reap_released();
        let handle = self.issue_handle()?;
        self.objects.insert_empty(handle);
        Ok(handle)
    }

    /// Issues a handle and constructs the object for it right away.
    ///
    /// The factory receives the new handle. If it fails, the handle is released
    /// again and the failure is reported as an allocation error.
    pub fn insert_object<F>(&mut self, factory: F) -> Result<Handle>
    where
        F: FnOnce(Handle) -> Option<T>,
    {
        self.reap_released();
        let handle = self.issue_handle()?;

        let Some(object) = factory(handle) else {
            self.handles.release(handle);
            return Err(self.construction_failed(handle));
        };

        self.objects.fill(handle, Rc::new(object));
        Ok(handle)
    }

    /// Issues `count` contiguous handles and constructs an object for each.
    ///
    /// All or nothing: if any construction fails, the whole range is released.
    pub fn insert_object_range<F>(&mut self, count: u32, mut factory: F) -> Result<Handle>
    where
        F: FnMut(Handle) -> Option<T>,
    {
        self.reap_released();
        if count == 0 {
            return Err(TesselError::InvalidValue(format!(
                "{} range must not be empty",
                T::KIND
            )));
        }

        let first = self.handles.allocate_range(count);
        if first.is_none() {
            return Err(TesselError::HandleRangeExhausted { count });
        }

        let mut built = Vec::with_capacity(count as usize);
        for offset in 0..count {
            // The allocator guarantees the whole block fits in the handle space
            let handle = Handle::new(first.get() + offset);
            match factory(handle) {
                Some(object) => built.push((handle, Rc::new(object))),
                None => {
                    self.handles.release_range(first, count);
                    return Err(self.construction_failed(handle));
                }
            }
        }

        for (handle, object) in built {
            self.objects.fill(handle, object);
        }
        log::trace!("Created {} {}..+{count}", T::KIND, first);
        Ok(first)
    }

    /// Resolves a handle on first use.
    ///
    /// - `0` is "no object" and returns `Ok(None)`
    /// - an empty slot is filled by the factory
    /// - a filled slot returns the existing object
    /// - an unknown handle is reserved as a client-chosen id and filled
    pub fn check_object_allocation<F>(
        &mut self,
        handle: Handle,
        factory: F,
    ) -> Result<Option<Rc<T>>>
    where
        F: FnOnce(Handle) -> Option<T>,
    {
        self.reap_released();
        if handle.is_none() {
            return Ok(None);
        }

        match self.objects.state(handle) {
            SlotState::Filled => Ok(self.objects.get(handle).cloned()),
            SlotState::Empty => {
                let object = factory(handle).ok_or_else(|| self.construction_failed(handle))?;
                let object = Rc::new(object);
                self.objects.fill(handle, Rc::clone(&object));
                Ok(Some(object))
            }
            SlotState::Unallocated => {
                if !self.handles.reserve(handle) {
                    return Err(TesselError::OutOfMemory(format!(
                        "cannot reserve {} handle {handle}",
                        T::KIND
                    )));
                }
                let Some(object) = factory(handle) else {
                    self.handles.release(handle);
                    return Err(self.construction_failed(handle));
                };
                let object = Rc::new(object);
                self.objects.fill(handle, Rc::clone(&object));
                log::trace!("Adopted client-chosen {} handle {handle}", T::KIND);
                Ok(Some(object))
            }
        }
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Deletes the object named by `handle`.
    ///
    /// Unknown handles and `0` are ignored. An empty slot only gives its handle
    /// back. A filled slot asks `policy`: `true` destroys the object now, `false`
    /// leaves it in place (the policy is expected to have flagged it).
    pub fn delete_object<F>(&mut self, handle: Handle, policy: F)
    where
        F: FnOnce(&T) -> bool,
    {
        self.reap_released();
        if handle.is_none() {
            return;
        }

        match self.objects.state(handle) {
            SlotState::Unallocated => {}
            SlotState::Empty => {
                self.objects.remove(handle);
                self.handles.release(handle);
                log::trace!("Deleted unused {} handle {handle}", T::KIND);
            }
            SlotState::Filled => {
                let Some(object) = self.objects.get(handle) else {
                    return;
                };
                if policy(object.as_ref()) {
                    self.destroy(handle);
                    return;
                }

                let ref_count = object.ref_count();
                if ref_count.is_released() {
                    self.released.push(handle);
                } else {
                    ref_count.notify_on_release(&self.released);
                }
                log::debug!("Deferred deletion of {} {handle}: still referenced", T::KIND);
            }
        }
    }

    /// Deletes `count` handles starting at `first`; holes are skipped.
    pub fn delete_object_range(&mut self, first: Handle, count: u32) {
        self.reap_released();
        if first.is_none() {
            return;
        }
        for offset in 0..count {
            let Some(handle) = first.offset(offset) else {
                break;
            };
            if let Some(object) = self.objects.remove(handle) {
                object.on_destroy();
            }
        }
        self.handles.release_range(first, count);
    }

    /// Commits the destruction of every flagged object whose last holder is gone.
    ///
    /// Returns how many objects were destroyed.
    /// Only queued handles are visited. A queued handle whose slot was destroyed
    /// and reissued in the meantime names an object that is not released, and
    /// is skipped.
    pub fn reap_released(&mut self) -> usize {
        if self.released.is_empty() {
            return 0;
        }

        let mut reaped = 0;
        for handle in self.released.drain() {
            let released = self
                .objects
                .get(handle)
                .is_some_and(|object| object.ref_count().is_released());
            if released {
                self.destroy(handle);
                reaped += 1;
            }
        }
        if reaped > 0 {
            log::debug!("Reaped {reaped} released {} object(s)", T::KIND);
        }
        reaped
    }

    /// Released objects waiting for [`Self::reap_released`].
    #[must_use]
    pub fn pending_releases(&self) -> usize {
        self.released.len()
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Pure lookup; never constructs.
    ///
    /// Returns `None` for `0`, unknown handles, empty slots, and flagged objects
    /// whose last holder already released them.
    #[must_use]
    pub fn get_object(&self, handle: Handle) -> Option<&Rc<T>> {
        self.objects
            .get(handle)
            .filter(|object| !object.ref_count().is_released())
    }

    /// `0` resolves to the default object, anything else to [`Self::get_object`].
    #[must_use]
    pub fn get_object_or_default(&self, handle: Handle) -> Option<&Rc<T>> {
        if handle.is_none() {
            self.default_object.as_ref()
        } else {
            self.get_object(handle)
        }
    }

    /// `true` for `0` and for every handle this manager issued and has not deleted.
    #[must_use]
    pub fn is_generated(&self, handle: Handle) -> bool {
        if handle.is_none() {
            return true;
        }
        match self.objects.state(handle) {
            SlotState::Unallocated => false,
            SlotState::Empty => true,
            SlotState::Filled => self.get_object(handle).is_some(),
        }
    }

    /// Registers the externally owned object named by handle `0`.
    pub fn set_default_object(&mut self, object: Option<Rc<T>>) {
        self.default_object = object;
    }

    #[must_use]
    pub fn default_object(&self) -> Option<&Rc<T>> {
        self.default_object.as_ref()
    }

    /// Allocated handles (empty or filled), ascending.
    #[must_use]
    pub fn handles(&self) -> Vec<Handle> {
        self.objects.handles()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn issue_handle(&mut self) -> Result<Handle> {
        let handle = self.handles.allocate();
        if handle.is_none() {
            return Err(TesselError::OutOfMemory(format!(
                "{} handle space exhausted",
                T::KIND
            )));
        }
        log::trace!("Issued {} handle {handle}", T::KIND);
        Ok(handle)
    }

    fn construction_failed(&self, handle: Handle) -> TesselError {
        log::warn!("Failed to construct {} for handle {handle}", T::KIND);
        TesselError::ObjectConstructionFailed {
            kind: T::KIND,
            handle,
        }
    }

    fn destroy(&mut self, handle: Handle) {
        if let Some(object) = self.objects.remove(handle) {
            object.on_destroy();
        }
        self.handles.release(handle);
        log::trace!("Destroyed {} {handle}", T::KIND);
    }
}

impl<T: Resource> Drop for ResourceManager<T> {
    fn drop(&mut self) {
        self.reap_released();
        for handle in self.objects.handles() {
            self.destroy(handle);
        }
        // Externally owned: dropped, never destroyed
        self.default_object = None;
    }
}
