//! Framebuffers & Framebuffer Completeness
//!
//! A framebuffer is a fixed set of binding points (eight color slots, depth,
//! stencil) plus per-slot draw-buffer state and a read-buffer selector.
//! [`Framebuffer::check_status`] folds all attachments into one verdict:
//!
//! 1. Color slots in order. The first attachment sets the reference width,
//!    height and sample count; every later one must match it. Before 3.0 all
//!    color attachments must also share the same bytes per pixel, and no two
//!    slots may name the same object.
//! 2. Depth, then stencil, against the same reference.
//! 3. Depth and stencil, when both are present, must be one object.
//! 4. At least one attachment must exist.
//!
//! The default (window-system) framebuffer is always complete: its buffers
//! belong to the display layer.
//!
//! # Caching
//!
//! The verdict is cached together with a fingerprint of everything it depends
//! on: the context's capability serial and version, and per slot the attached
//! object's identity, storage version and image index. A storage change of an
//! attached object produces a new fingerprint; attach and detach drop the
//! cached verdict outright.

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use rustc_hash::FxHasher;
use tessel_core::{Handle, RefCount, Resource, ResourceRef, Result, TesselError};

use crate::attachment::{
    AttachedResource, AttachmentInfo, AttachmentPoint, FramebufferAttachment, SurfaceAspect,
};
use crate::image_index::{ImageIndex, MAX_TEXTURE_LEVELS};
use crate::renderbuffer::Renderbuffer;
use crate::settings::ContextState;
use crate::surface::Surface;
use crate::texture::Texture;

/// Number of color binding points of a framebuffer.
pub const MAX_COLOR_ATTACHMENTS: usize = 8;

/// Completeness verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferStatus {
    Complete,
    /// An attachment is zero-sized, has an unusable format or names a bad level
    IncompleteAttachment,
    /// Nothing is attached
    IncompleteMissingAttachment,
    /// Attachments disagree on width or height
    IncompleteDimensions,
    /// Attachments disagree on sample count
    IncompleteMultisample,
    /// A valid but unsupported combination
    Unsupported,
}

impl fmt::Display for FramebufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Complete => "complete",
            Self::IncompleteAttachment => "incomplete attachment",
            Self::IncompleteMissingAttachment => "incomplete missing attachment",
            Self::IncompleteDimensions => "incomplete dimensions",
            Self::IncompleteMultisample => "incomplete multisample",
            Self::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// Destination selected for one draw-buffer slot, or the read source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawBuffer {
    None,
    /// Back buffer of the window surface
    Back,
    ColorAttachment(u32),
}

#[derive(Debug, Clone, Copy)]
struct StatusCache {
    fingerprint: u64,
    status: FramebufferStatus,
}

#[derive(Debug)]
struct FramebufferState {
    color: [Option<FramebufferAttachment>; MAX_COLOR_ATTACHMENTS],
    depth: Option<FramebufferAttachment>,
    stencil: Option<FramebufferAttachment>,
    draw_buffers: [DrawBuffer; MAX_COLOR_ATTACHMENTS],
    read_buffer: DrawBuffer,
}

impl FramebufferState {
    fn new(first_buffer: DrawBuffer) -> Self {
        let mut draw_buffers = [DrawBuffer::None; MAX_COLOR_ATTACHMENTS];
        draw_buffers[0] = first_buffer;
        Self {
            color: std::array::from_fn(|_| None),
            depth: None,
            stencil: None,
            draw_buffers,
            read_buffer: first_buffer,
        }
    }

    fn slots(&self) -> impl Iterator<Item = &Option<FramebufferAttachment>> {
        self.color.iter().chain([&self.depth, &self.stencil])
    }

    fn clear(&mut self) {
        self.color = std::array::from_fn(|_| None);
        self.depth = None;
        self.stencil = None;
    }
}

/// Width, height and samples every attachment must agree on.
#[derive(Debug, Clone, Copy)]
struct Reference {
    width: u32,
    height: u32,
    samples: u32,
}

// ============================================================================
// Framebuffer
// ============================================================================

#[derive(Debug)]
pub struct Framebuffer {
    id: Handle,
    ref_count: RefCount,
    is_default: bool,
    state: RefCell<FramebufferState>,
    label: RefCell<String>,
    status_cache: Cell<Option<StatusCache>>,
    status_computations: Cell<u64>,
}

impl Framebuffer {
    /// Application framebuffer with nothing attached.
    #[must_use]
    pub fn new(id: Handle) -> Self {
        Self {
            id,
            ref_count: RefCount::new(),
            is_default: false,
            state: RefCell::new(FramebufferState::new(DrawBuffer::ColorAttachment(0))),
            label: RefCell::new(String::new()),
            status_cache: Cell::new(None),
            status_computations: Cell::new(0),
        }
    }

    /// Window-system framebuffer backed by `surface`.
    ///
    /// Depth and stencil are attached only if the surface's depth-stencil
    /// format has bits for them.
    #[must_use]
    pub fn new_default(surface: &Rc<Surface>) -> Self {
        let framebuffer = Self {
            is_default: true,
            state: RefCell::new(FramebufferState::new(DrawBuffer::Back)),
            ..Self::new(Handle::NONE)
        };

        {
            let mut state = framebuffer.state.borrow_mut();
            state.color[0] = Some(FramebufferAttachment::surface(
                AttachmentPoint::Color(0),
                Rc::clone(surface),
                SurfaceAspect::Color,
            ));
            if let Some(format) = surface.depth_stencil_format() {
                let depth_stencil = FramebufferAttachment::surface(
                    AttachmentPoint::DepthStencil,
                    Rc::clone(surface),
                    SurfaceAspect::DepthStencil,
                );
                if format.depth_bits() > 0 {
                    state.depth = Some(depth_stencil.rebound(AttachmentPoint::Depth));
                }
                if format.stencil_bits() > 0 {
                    state.stencil = Some(depth_stencil.rebound(AttachmentPoint::Stencil));
                }
            }
        }
        framebuffer
    }

    #[inline]
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn set_label(&self, label: impl Into<String>) {
        *self.label.borrow_mut() = label.into();
    }

    #[must_use]
    pub fn label(&self) -> String {
        self.label.borrow().clone()
    }

    // ========================================================================
    // Attach / detach
    // ========================================================================

    /// Attaches one image of `texture` to `point`.
    pub fn attach_texture(
        &self,
        point: AttachmentPoint,
        texture: &Rc<Texture>,
        index: ImageIndex,
    ) -> Result<()> {
        if index.target.texture_type() != texture.texture_type() {
            return Err(TesselError::InvalidOperation(format!(
                "{:?} does not address a {:?} texture",
                index.target,
                texture.texture_type()
            )));
        }
        if index.level as usize >= MAX_TEXTURE_LEVELS {
            return Err(TesselError::InvalidValue(format!(
                "texture level {} out of range",
                index.level
            )));
        }
        let attachment =
            FramebufferAttachment::texture(point, ResourceRef::new(Rc::clone(texture)), index);
        self.set_attachment(point, Some(attachment))
    }

    pub fn attach_renderbuffer(
        &self,
        point: AttachmentPoint,
        renderbuffer: &Rc<Renderbuffer>,
    ) -> Result<()> {
        let attachment =
            FramebufferAttachment::renderbuffer(point, ResourceRef::new(Rc::clone(renderbuffer)));
        self.set_attachment(point, Some(attachment))
    }

    /// Empties `point`, releasing the attached object.
    pub fn detach(&self, point: AttachmentPoint) -> Result<()> {
        self.set_attachment(point, None)
    }

    /// Detaches `texture` from every binding point it occupies.
    pub fn detach_texture(&self, texture: Handle) {
        self.detach_matching(|attachment| attachment.is_texture() && attachment.id() == texture);
    }

    /// Detaches `renderbuffer` from every binding point it occupies.
    pub fn detach_renderbuffer(&self, renderbuffer: Handle) {
        self.detach_matching(|attachment| {
            attachment.is_renderbuffer() && attachment.id() == renderbuffer
        });
    }

    fn detach_matching(&self, matches: impl Fn(&FramebufferAttachment) -> bool) {
        let mut state = self.state.borrow_mut();
        let FramebufferState {
            color,
            depth,
            stencil,
            ..
        } = &mut *state;
        let mut detached = false;
        for slot in color.iter_mut().chain([depth, stencil]) {
            if slot.as_ref().is_some_and(&matches) {
                *slot = None;
                detached = true;
            }
        }
        if detached {
            self.status_cache.set(None);
        }
    }

    fn set_attachment(
        &self,
        point: AttachmentPoint,
        attachment: Option<FramebufferAttachment>,
    ) -> Result<()> {
        if self.is_default {
            return Err(TesselError::InvalidOperation(
                "the default framebuffer's attachments belong to its surface".to_string(),
            ));
        }

        // The new attachment already holds its object; the replaced one is
        // released afterwards, so rebinding the same object never destroys it.
        let mut state = self.state.borrow_mut();
        match point {
            AttachmentPoint::Color(index) => {
                let slot = state.color.get_mut(index as usize).ok_or_else(|| {
                    TesselError::InvalidValue(format!(
                        "color attachment {index} exceeds {MAX_COLOR_ATTACHMENTS}"
                    ))
                })?;
                *slot = attachment;
            }
            AttachmentPoint::Depth => state.depth = attachment,
            AttachmentPoint::Stencil => state.stencil = attachment,
            AttachmentPoint::DepthStencil => {
                state.depth = attachment.clone();
                state.stencil = attachment;
            }
        }
        // A dropped object's address can be reused by the next one attached
        self.status_cache.set(None);
        Ok(())
    }

    // ========================================================================
    // Attachment access
    // ========================================================================

    #[must_use]
    pub fn color_attachment(&self, index: usize) -> Option<Ref<'_, FramebufferAttachment>> {
        Ref::filter_map(self.state.borrow(), |state| {
            state.color.get(index).and_then(Option::as_ref)
        })
        .ok()
    }

    #[must_use]
    pub fn depth_attachment(&self) -> Option<Ref<'_, FramebufferAttachment>> {
        Ref::filter_map(self.state.borrow(), |state| state.depth.as_ref()).ok()
    }

    #[must_use]
    pub fn stencil_attachment(&self) -> Option<Ref<'_, FramebufferAttachment>> {
        Ref::filter_map(self.state.borrow(), |state| state.stencil.as_ref()).ok()
    }

    /// The depth attachment, if depth and stencil are one object.
    #[must_use]
    pub fn depth_stencil_attachment(&self) -> Option<Ref<'_, FramebufferAttachment>> {
        Ref::filter_map(self.state.borrow(), |state| {
            match (&state.depth, &state.stencil) {
                (Some(depth), Some(stencil)) if depth.same_resource(stencil) => Some(depth),
                _ => None,
            }
        })
        .ok()
    }

    /// Depth if attached, otherwise stencil.
    #[must_use]
    pub fn depth_or_stencil_attachment(&self) -> Option<Ref<'_, FramebufferAttachment>> {
        Ref::filter_map(self.state.borrow(), |state| {
            state.depth.as_ref().or(state.stencil.as_ref())
        })
        .ok()
    }

    /// First occupied color slot.
    #[must_use]
    pub fn first_color_attachment(&self) -> Option<Ref<'_, FramebufferAttachment>> {
        Ref::filter_map(self.state.borrow(), |state| state.color.iter().flatten().next()).ok()
    }

    /// Color attachment selected by the read buffer.
    #[must_use]
    pub fn read_color_attachment(&self) -> Option<Ref<'_, FramebufferAttachment>> {
        Ref::filter_map(self.state.borrow(), |state| {
            let index = match state.read_buffer {
                DrawBuffer::None => return None,
                DrawBuffer::Back => 0,
                DrawBuffer::ColorAttachment(index) => index as usize,
            };
            state.color.get(index).and_then(Option::as_ref)
        })
        .ok()
    }

    /// Query-layer view of one binding point; the default info when empty.
    #[must_use]
    pub fn attachment_info(&self, point: AttachmentPoint) -> AttachmentInfo {
        let attachment = match point {
            AttachmentPoint::Color(index) => self.color_attachment(index as usize),
            AttachmentPoint::Depth => self.depth_attachment(),
            AttachmentPoint::Stencil => self.stencil_attachment(),
            AttachmentPoint::DepthStencil => self.depth_stencil_attachment(),
        };
        attachment.map(|attachment| attachment.info()).unwrap_or_default()
    }

    /// A stencil buffer with stencil bits is attached
    #[must_use]
    pub fn has_stencil(&self) -> bool {
        self.stencil_attachment()
            .is_some_and(|stencil| stencil.stencil_size() > 0)
    }

    // ========================================================================
    // Draw & read buffers
    // ========================================================================

    /// Sets the draw buffers; slots past `buffers.len()` are disabled.
    ///
    /// Slot `i` of an application framebuffer may only select `None` or color
    /// attachment `i`; the default framebuffer takes a single `Back` or `None`.
    pub fn set_draw_buffers(&self, buffers: &[DrawBuffer]) -> Result<()> {
        if buffers.len() > MAX_COLOR_ATTACHMENTS {
            return Err(TesselError::InvalidValue(format!(
                "{} draw buffers exceed {MAX_COLOR_ATTACHMENTS}",
                buffers.len()
            )));
        }
        for (slot, &buffer) in buffers.iter().enumerate() {
            let valid = match buffer {
                DrawBuffer::None => true,
                DrawBuffer::Back => self.is_default && buffers.len() == 1,
                DrawBuffer::ColorAttachment(index) => !self.is_default && index as usize == slot,
            };
            if !valid {
                return Err(TesselError::InvalidOperation(format!(
                    "draw buffer {slot} cannot select {buffer:?}"
                )));
            }
        }

        let mut state = self.state.borrow_mut();
        state.draw_buffers = [DrawBuffer::None; MAX_COLOR_ATTACHMENTS];
        state.draw_buffers[..buffers.len()].copy_from_slice(buffers);
        Ok(())
    }

    #[must_use]
    pub fn draw_buffer_state(&self, slot: usize) -> DrawBuffer {
        self.state
            .borrow()
            .draw_buffers
            .get(slot)
            .copied()
            .unwrap_or(DrawBuffer::None)
    }

    pub fn set_read_buffer(&self, buffer: DrawBuffer) -> Result<()> {
        let valid = match buffer {
            DrawBuffer::None => true,
            DrawBuffer::Back => self.is_default,
            DrawBuffer::ColorAttachment(index) => {
                !self.is_default && (index as usize) < MAX_COLOR_ATTACHMENTS
            }
        };
        if !valid {
            return Err(TesselError::InvalidOperation(format!(
                "cannot read from {buffer:?}"
            )));
        }
        self.state.borrow_mut().read_buffer = buffer;
        Ok(())
    }

    #[must_use]
    pub fn read_buffer(&self) -> DrawBuffer {
        self.state.borrow().read_buffer
    }

    /// Slot is occupied and its draw buffer is not `None`.
    #[must_use]
    pub fn is_enabled_color_attachment(&self, slot: usize) -> bool {
        let state = self.state.borrow();
        state.color.get(slot).is_some_and(Option::is_some)
            && state.draw_buffers[slot] != DrawBuffer::None
    }

    #[must_use]
    pub fn has_enabled_color_attachment(&self) -> bool {
        (0..MAX_COLOR_ATTACHMENTS).any(|slot| self.is_enabled_color_attachment(slot))
    }

    /// Draws to any color slot beyond the first.
    #[must_use]
    pub fn using_extended_draw_buffers(&self) -> bool {
        (1..MAX_COLOR_ATTACHMENTS).any(|slot| self.is_enabled_color_attachment(slot))
    }

    // ========================================================================
    // Completeness
    // ========================================================================

    /// Sample count of a complete framebuffer, 0 otherwise.
    #[must_use]
    pub fn samples(&self, ctx: &ContextState) -> u32 {
        if self.check_status(ctx) != FramebufferStatus::Complete {
            return 0;
        }
        let state = self.state.borrow();
        state
            .slots()
            .flatten()
            .next()
            .map_or(0, FramebufferAttachment::samples)
    }

    /// Number of times the verdict was computed rather than served from cache.
    #[must_use]
    pub fn status_computations(&self) -> u64 {
        self.status_computations.get()
    }

    /// Completeness verdict, reused while nothing it depends on changed.
    #[must_use]
    pub fn check_status(&self, ctx: &ContextState) -> FramebufferStatus {
        if self.is_default {
            return FramebufferStatus::Complete;
        }

        let fingerprint = self.fingerprint(ctx);
        let cached = self.status_cache.get();
        if let Some(cache) = cached
            && cache.fingerprint == fingerprint
        {
            return cache.status;
        }

        let status = self.compute_status(ctx);
        self.status_computations
            .set(self.status_computations.get() + 1);
        if cached.is_some_and(|cache| cache.status != status) {
            log::debug!("Framebuffer {} status changed to {status}", self.id);
        }
        self.status_cache.set(Some(StatusCache {
            fingerprint,
            status,
        }));
        status
    }

    fn fingerprint(&self, ctx: &ContextState) -> u64 {
        let mut hasher = FxHasher::default();
        ctx.serial().hash(&mut hasher);
        ctx.settings().hash(&mut hasher);

        let state = self.state.borrow();
        for slot in state.slots() {
            match slot {
                None => 0u8.hash(&mut hasher),
                Some(attachment) => {
                    1u8.hash(&mut hasher);
                    attachment.object_type().hash(&mut hasher);
                    attachment.identity().hash(&mut hasher);
                    attachment.version().hash(&mut hasher);
                    attachment.image_index().hash(&mut hasher);
                }
            }
        }
        hasher.finish()
    }

    fn compute_status(&self, ctx: &ContextState) -> FramebufferStatus {
        let state = self.state.borrow();
        let mut reference: Option<Reference> = None;
        let mut color_pixel_bytes = 0;

        for (slot, attachment) in state.color.iter().enumerate() {
            let Some(attachment) = attachment else {
                continue;
            };
            if let Err(status) = check_color_attachment(attachment, ctx) {
                return status;
            }

            let size = attachment.size();
            let samples = attachment.samples();
            let pixel_bytes = attachment.format_info().pixel_bytes;
            let Some(reference) = reference else {
                reference = Some(Reference {
                    width: size.width,
                    height: size.height,
                    samples,
                });
                color_pixel_bytes = pixel_bytes;
                continue;
            };

            if size.width != reference.width || size.height != reference.height {
                return FramebufferStatus::IncompleteDimensions;
            }
            if samples != reference.samples {
                return FramebufferStatus::IncompleteMultisample;
            }
            // Before 3.0 all color attachments share one bit depth
            if ctx.is_es2() && pixel_bytes != color_pixel_bytes {
                return FramebufferStatus::Unsupported;
            }
            // Overlapping render targets are undefined
            if state.color[..slot]
                .iter()
                .flatten()
                .any(|previous| previous.same_resource(attachment))
            {
                return FramebufferStatus::Unsupported;
            }
        }

        for (attachment, aspect) in [
            (&state.depth, DepthOrStencil::Depth),
            (&state.stencil, DepthOrStencil::Stencil),
        ] {
            let Some(attachment) = attachment else {
                continue;
            };
            if let Err(status) = check_depth_or_stencil_attachment(attachment, aspect, ctx) {
                return status;
            }

            let size = attachment.size();
            let samples = attachment.samples();
            match reference {
                None => {
                    reference = Some(Reference {
                        width: size.width,
                        height: size.height,
                        samples,
                    });
                }
                Some(reference) if size.width != reference.width || size.height != reference.height => {
                    return FramebufferStatus::IncompleteDimensions;
                }
                Some(reference) if samples != reference.samples => {
                    return FramebufferStatus::IncompleteMultisample;
                }
                Some(_) => {}
            }
        }

        // Only packed depth-stencil is supported, not separate objects
        if let (Some(depth), Some(stencil)) = (&state.depth, &state.stencil)
            && !depth.same_resource(stencil)
        {
            return FramebufferStatus::Unsupported;
        }

        if reference.is_none() {
            return FramebufferStatus::IncompleteMissingAttachment;
        }

        FramebufferStatus::Complete
    }
}

impl Resource for Framebuffer {
    const KIND: &'static str = "framebuffer";

    fn id(&self) -> Handle {
        self.id
    }

    fn ref_count(&self) -> &RefCount {
        &self.ref_count
    }

    fn on_destroy(&self) {
        // Releases every attached object right away
        self.state.borrow_mut().clear();
        self.status_cache.set(None);
    }
}

// ============================================================================
// Per-attachment rules
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DepthOrStencil {
    Depth,
    Stencil,
}

fn check_color_attachment(
    attachment: &FramebufferAttachment,
    ctx: &ContextState,
) -> std::result::Result<(), FramebufferStatus> {
    let size = attachment.size();
    if size.width == 0 || size.height == 0 {
        return Err(FramebufferStatus::IncompleteAttachment);
    }
    let format = attachment
        .internal_format()
        .ok_or(FramebufferStatus::IncompleteAttachment)?;
    let info = format.info();
    let renderable = ctx.caps(format).renderable();

    match attachment.resource() {
        AttachedResource::Renderbuffer(_) => {
            if !renderable || info.is_depth_or_stencil() {
                return Err(FramebufferStatus::IncompleteAttachment);
            }
        }
        AttachedResource::Texture(_) => {
            if info.is_depth_or_stencil() {
                return Err(FramebufferStatus::IncompleteAttachment);
            }
            if !renderable {
                return Err(FramebufferStatus::Unsupported);
            }
            check_texture_level(attachment, ctx)?;
        }
        AttachedResource::Surface { .. } => {}
    }
    Ok(())
}

fn check_depth_or_stencil_attachment(
    attachment: &FramebufferAttachment,
    aspect: DepthOrStencil,
    ctx: &ContextState,
) -> std::result::Result<(), FramebufferStatus> {
    let size = attachment.size();
    if size.width == 0 || size.height == 0 {
        return Err(FramebufferStatus::IncompleteAttachment);
    }
    let format = attachment
        .internal_format()
        .ok_or(FramebufferStatus::IncompleteAttachment)?;
    let bits = match aspect {
        DepthOrStencil::Depth => format.depth_bits(),
        DepthOrStencil::Stencil => format.stencil_bits(),
    };

    match attachment.resource() {
        AttachedResource::Renderbuffer(_) => {
            if bits == 0 || !ctx.caps(format).renderable() {
                return Err(FramebufferStatus::IncompleteAttachment);
            }
        }
        AttachedResource::Texture(_) => {
            if !ctx.supports_depth_textures() || bits == 0 {
                return Err(FramebufferStatus::IncompleteAttachment);
            }
            check_texture_level(attachment, ctx)?;
        }
        AttachedResource::Surface { .. } => {}
    }
    Ok(())
}

/// The attached level (and layer) must exist and be renderable.
fn check_texture_level(
    attachment: &FramebufferAttachment,
    ctx: &ContextState,
) -> std::result::Result<(), FramebufferStatus> {
    let Some(texture) = attachment.as_texture() else {
        return Ok(());
    };
    let level = attachment.mip_level();

    if texture.immutable_format() && level >= texture.immutable_levels() {
        return Err(FramebufferStatus::IncompleteAttachment);
    }
    if ctx.is_es2() && level != 0 && !ctx.extensions().fbo_render_mipmap {
        return Err(FramebufferStatus::IncompleteAttachment);
    }
    if let Some(layer) = attachment.layer()
        && layer >= attachment.size().depth
    {
        return Err(FramebufferStatus::IncompleteAttachment);
    }
    Ok(())
}
