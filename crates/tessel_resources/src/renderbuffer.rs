use std::cell::{Cell, RefCell};

use tessel_core::{ChangeTracker, Handle, RefCount, Resource, Result, TesselError};

use crate::format::InternalFormat;
use crate::image_index::Extents;
use crate::settings::ContextState;

/// Current storage of a renderbuffer. The default value is "no storage".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderbufferStorage {
    pub width: u32,
    pub height: u32,
    pub format: Option<InternalFormat>,
    pub samples: u32,
}

/// Renderbuffer object: a single renderable image.
#[derive(Debug)]
pub struct Renderbuffer {
    id: Handle,
    ref_count: RefCount,
    storage: Cell<RenderbufferStorage>,
    tracker: ChangeTracker,
    label: RefCell<String>,
}

impl Renderbuffer {
    #[must_use]
    pub fn new(id: Handle) -> Self {
        Self {
            id,
            ref_count: RefCount::new(),
            storage: Cell::new(RenderbufferStorage::default()),
            tracker: ChangeTracker::new(),
            label: RefCell::new(String::new()),
        }
    }

    pub fn set_storage(&self, format: InternalFormat, width: u32, height: u32) {
        self.replace_storage(RenderbufferStorage {
            width,
            height,
            format: Some(format),
            samples: 0,
        });
    }

    /// Multisampled storage; `samples` is bounded by the context's `max_samples`.
    pub fn set_storage_multisample(
        &self,
        samples: u32,
        format: InternalFormat,
        width: u32,
        height: u32,
        ctx: &ContextState,
    ) -> Result<()> {
        let max_samples = ctx.limits().max_samples;
        if samples > max_samples {
            return Err(TesselError::InvalidValue(format!(
                "{samples} samples requested, at most {max_samples} supported"
            )));
        }
        self.replace_storage(RenderbufferStorage {
            width,
            height,
            format: Some(format),
            samples,
        });
        Ok(())
    }

    #[must_use]
    pub fn storage(&self) -> RenderbufferStorage {
        self.storage.get()
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.storage.get().width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.storage.get().height
    }

    #[must_use]
    pub fn size(&self) -> Extents {
        let storage = self.storage.get();
        Extents::new(storage.width, storage.height, 1)
    }

    #[must_use]
    pub fn internal_format(&self) -> Option<InternalFormat> {
        self.storage.get().format
    }

    #[must_use]
    pub fn samples(&self) -> u32 {
        self.storage.get().samples
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

    fn replace_storage(&self, storage: RenderbufferStorage) {
        self.storage.set(storage);
        self.tracker.changed();
        log::trace!("Renderbuffer {} storage: {storage:?}", self.id);
    }
}

impl Resource for Renderbuffer {
    const KIND: &'static str = "renderbuffer";

    fn id(&self) -> Handle {
        self.id
    }

    fn ref_count(&self) -> &RefCount {
        &self.ref_count
    }
}
