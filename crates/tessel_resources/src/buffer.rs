//! Buffer objects: size and usage bookkeeping only, data lives in the backend.

use std::cell::{Cell, RefCell};

use serde::{Deserialize, Serialize};
use tessel_core::{ChangeTracker, Handle, RefCount, Resource, Result, TesselError};

/// Expected update frequency and direction of a buffer's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BufferUsage {
    #[default]
    StaticDraw,
    DynamicDraw,
    StreamDraw,
    StaticRead,
    DynamicRead,
    StreamRead,
    StaticCopy,
    DynamicCopy,
    StreamCopy,
}

#[derive(Debug)]
pub struct Buffer {
    id: Handle,
    ref_count: RefCount,
    size: Cell<u64>,
    usage: Cell<BufferUsage>,
    mapped: Cell<bool>,
    tracker: ChangeTracker,
    label: RefCell<String>,
}

impl Buffer {
    #[must_use]
    pub fn new(id: Handle) -> Self {
        Self {
            id,
            ref_count: RefCount::new(),
            size: Cell::new(0),
            usage: Cell::new(BufferUsage::default()),
            mapped: Cell::new(false),
            tracker: ChangeTracker::new(),
            label: RefCell::new(String::new()),
        }
    }

    /// (Re)allocates the data store. Unmaps the buffer.
    pub fn set_data(&self, size: u64, usage: BufferUsage) {
        self.size.set(size);
        self.usage.set(usage);
        self.mapped.set(false);
        self.tracker.changed();
    }

    /// Validates an update of `len` bytes at `offset` against the data store.
    pub fn set_sub_data(&self, offset: u64, len: u64) -> Result<()> {
        if self.mapped.get() {
            return Err(TesselError::InvalidOperation(format!(
                "buffer {} is mapped",
                self.id
            )));
        }
        let end = offset.checked_add(len);
        if end.is_none_or(|end| end > self.size.get()) {
            return Err(TesselError::InvalidValue(format!(
                "range {offset}+{len} exceeds buffer size {}",
                self.size.get()
            )));
        }
        self.tracker.changed();
        Ok(())
    }

    pub fn map(&self) -> Result<()> {
        if self.mapped.replace(true) {
            return Err(TesselError::InvalidOperation(format!(
                "buffer {} is already mapped",
                self.id
            )));
        }
        Ok(())
    }

    /// Returns `false` if the buffer was not mapped.
    pub fn unmap(&self) -> bool {
        self.mapped.replace(false)
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size.get()
    }

    #[inline]
    #[must_use]
    pub fn usage(&self) -> BufferUsage {
        self.usage.get()
    }

    #[inline]
    #[must_use]
    pub fn is_mapped(&self) -> bool {
        self.mapped.get()
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.tracker.version()
    }

    pub fn set_label(&self, label: impl Into<String>) {
        *self.label.borrow_mut() = label.into();
    }

    #[must_use]
    pub fn label(&self) -> String {
        self.label.borrow().clone()
    }
}

impl Resource for Buffer {
    const KIND: &'static str = "buffer";

    fn id(&self) -> Handle {
        self.id
    }

    fn ref_count(&self) -> &RefCount {
        &self.ref_count
    }

    fn on_destroy(&self) {
        self.mapped.set(false);
    }
}
