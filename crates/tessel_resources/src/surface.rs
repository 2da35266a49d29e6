use std::cell::Cell;

use tessel_core::{ChangeTracker, Handle};

use crate::format::InternalFormat;
use crate::image_index::Extents;

/// Window-system surface.
///
/// Owned by the display layer, not by any resource manager. It backs the
/// default framebuffer and can lend its color buffer to a 2D texture.
#[derive(Debug)]
pub struct Surface {
    width: Cell<u32>,
    height: Cell<u32>,
    color_format: InternalFormat,
    depth_stencil_format: Option<InternalFormat>,
    samples: u32,
    tracker: ChangeTracker,
    bound_texture: Cell<Handle>,
}

impl Surface {
    #[must_use]
    pub fn new(width: u32, height: u32, color_format: InternalFormat) -> Self {
        Self {
            width: Cell::new(width),
            height: Cell::new(height),
            color_format,
            depth_stencil_format: None,
            samples: 0,
            tracker: ChangeTracker::new(),
            bound_texture: Cell::new(Handle::NONE),
        }
    }

    #[must_use]
    pub fn with_depth_stencil(mut self, format: InternalFormat) -> Self {
        self.depth_stencil_format = Some(format);
        self
    }

    #[must_use]
    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height.get()
    }

    #[must_use]
    pub fn size(&self) -> Extents {
        Extents::new(self.width.get(), self.height.get(), 1)
    }

    #[must_use]
    pub fn color_format(&self) -> InternalFormat {
        self.color_format
    }

    #[must_use]
    pub fn depth_stencil_format(&self) -> Option<InternalFormat> {
        self.depth_stencil_format
    }

    #[must_use]
    pub fn samples(&self) -> u32 {
        self.samples
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.tracker.version()
    }

    pub fn resize(&self, width: u32, height: u32) {
        if self.width.get() != width || self.height.get() != height {
            self.width.set(width);
            self.height.set(height);
            self.tracker.changed();
        }
    }

    /// Texture currently using the color buffer as its level 0
    #[must_use]
    pub fn bound_texture(&self) -> Option<Handle> {
        Some(self.bound_texture.get()).filter(|handle| handle.is_some())
    }

    pub(crate) fn bind_texture(&self, texture: Handle) {
        self.bound_texture.set(texture);
    }

    pub(crate) fn release_texture(&self, texture: Handle) {
        if self.bound_texture.get() == texture {
            self.bound_texture.set(Handle::NONE);
        }
    }
}
