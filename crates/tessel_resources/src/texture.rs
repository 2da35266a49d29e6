//! Textures & Texture Completeness
//!
//! A texture is a set of image descriptors, one per `(target, level)` (per
//! `(face, level)` for cube maps), plus the sampling state that decides how
//! those images are read.
//!
//! # Completeness
//!
//! Whether a texture can be sampled is answered by
//! [`TextureState::is_sampler_complete`], which combines:
//!
//! - **cube completeness**: six square faces of equal size and format at level 0
//! - **level completeness**: one level matches the base image's format and the
//!   halved-and-floored base extent (2D-array layer counts stay constant)
//! - **mipmap completeness**: every level in `[effective base, mipmap max]` is
//!   level-complete, on every face
//! - filterability, NPOT restrictions and the depth-comparison rule
//!
//! The verdict is cached. The cache is keyed on the sampler state, the base
//! format's filterability, the client version and NPOT support, and it is
//! invalidated by every image-descriptor write and base/max level change. All
//! of those writes go through one private path, so no call site can forget it.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;

use tessel_core::{ChangeTracker, Handle, RefCount, Resource, Result, TesselError};

use crate::format::InternalFormat;
use crate::framebuffer::{Framebuffer, FramebufferStatus};
use crate::image_index::{Extents, ImageIndex, MAX_TEXTURE_LEVELS, TextureTarget, TextureType};
use crate::sampler::{CompareMode, MagFilter, MinFilter, SamplerState, WrapMode};
use crate::settings::{ContextState, Version};
use crate::surface::Surface;

/// Initial `max_level` of a texture
pub const DEFAULT_MAX_LEVEL: u32 = 1000;

/// Size and format of one texture image. The default value is "no image".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ImageDesc {
    pub size: Extents,
    pub format: Option<InternalFormat>,
}

impl ImageDesc {
    #[must_use]
    pub const fn new(size: Extents, format: InternalFormat) -> Self {
        Self {
            size,
            format: Some(format),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct SamplerCompletenessCache {
    valid: bool,
    sampler_state: SamplerState,
    filterable: bool,
    client_version: Version,
    supports_npot: bool,
    sampler_complete: bool,
}

impl Default for SamplerCompletenessCache {
    fn default() -> Self {
        Self {
            valid: false,
            sampler_state: SamplerState::default(),
            filterable: false,
            client_version: Version::new(0, 0),
            supports_npot: false,
            sampler_complete: false,
        }
    }
}

// ============================================================================
// TextureState
// ============================================================================

/// Image descriptors and completeness logic of one texture.
#[derive(Debug)]
pub struct TextureState {
    texture_type: TextureType,
    image_descs: Vec<ImageDesc>,
    sampler_state: SamplerState,
    base_level: u32,
    max_level: u32,
    immutable_format: bool,
    immutable_levels: u32,
    tracker: ChangeTracker,
    completeness_cache: Cell<SamplerCompletenessCache>,
    completeness_computations: Cell<u64>,
}

impl TextureState {
    #[must_use]
    pub fn new(texture_type: TextureType) -> Self {
        // One spare level so a clamped out-of-range base level reads "no image"
        let desc_count = (MAX_TEXTURE_LEVELS + 1) * texture_type.face_count();
        Self {
            texture_type,
            image_descs: vec![ImageDesc::default(); desc_count],
            sampler_state: SamplerState::default(),
            base_level: 0,
            max_level: DEFAULT_MAX_LEVEL,
            immutable_format: false,
            immutable_levels: 0,
            tracker: ChangeTracker::new(),
            completeness_cache: Cell::new(SamplerCompletenessCache::default()),
            completeness_computations: Cell::new(0),
        }
    }

    #[inline]
    #[must_use]
    pub fn texture_type(&self) -> TextureType {
        self.texture_type
    }

    #[inline]
    #[must_use]
    pub fn sampler_state(&self) -> &SamplerState {
        &self.sampler_state
    }

    /// Sampler state is part of the cache key, so no invalidation is needed.
    pub fn set_sampler_state(&mut self, state: SamplerState) {
        self.sampler_state = state;
    }

    #[inline]
    #[must_use]
    pub fn base_level(&self) -> u32 {
        self.base_level
    }

    #[inline]
    #[must_use]
    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    pub fn set_base_level(&mut self, level: u32) {
        if self.base_level != level {
            self.base_level = level;
            self.invalidate();
        }
    }

    pub fn set_max_level(&mut self, level: u32) {
        if self.max_level != level {
            self.max_level = level;
            self.invalidate();
        }
    }

    #[inline]
    #[must_use]
    pub fn immutable_format(&self) -> bool {
        self.immutable_format
    }

    #[inline]
    #[must_use]
    pub fn immutable_levels(&self) -> u32 {
        self.immutable_levels
    }

    /// Storage version, bumped by every descriptor or level-range change
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.tracker.version()
    }

    /// How many times the sampler-completeness verdict was recomputed.
    #[inline]
    #[must_use]
    pub fn sampler_completeness_computations(&self) -> u64 {
        self.completeness_computations.get()
    }

    // ------------------------------------------------------------------------
    // Effective level range
    // ------------------------------------------------------------------------

    /// Base level clamped to the immutable level count, or to the descriptor table.
    #[must_use]
    pub fn effective_base_level(&self) -> u32 {
        if self.immutable_format {
            self.base_level.min(self.immutable_levels.saturating_sub(1))
        } else {
            self.base_level.min(MAX_TEXTURE_LEVELS as u32)
        }
    }

    #[must_use]
    pub fn effective_max_level(&self) -> u32 {
        if self.immutable_format {
            self.max_level
                .max(self.effective_base_level())
                .min(self.immutable_levels.saturating_sub(1))
        } else {
            self.max_level
        }
    }

    /// Last level a full mip chain from the base image would have, clamped to
    /// the effective max level and to the last level a texture can hold.
    #[must_use]
    pub fn mipmap_max_level(&self) -> u32 {
        let base = self.base_image_desc().size;
        let largest = match self.texture_type {
            TextureType::Texture3D => base.width.max(base.height).max(base.depth),
            _ => base.width.max(base.height),
        };
        let expected_levels = largest.checked_ilog2().unwrap_or(0);
        let base_level = self.effective_base_level();
        (base_level + expected_levels)
            .min(MAX_TEXTURE_LEVELS as u32 - 1)
            .max(base_level)
            .min(self.effective_max_level())
    }

    // ------------------------------------------------------------------------
    // Image descriptors
    // ------------------------------------------------------------------------

    /// Descriptor at `(target, level)`; "no image" when out of range.
    #[must_use]
    pub fn image_desc(&self, target: TextureTarget, level: u32) -> ImageDesc {
        self.image_descs
            .get(self.desc_index(target, level))
            .copied()
            .unwrap_or_default()
    }

    pub fn set_image_desc(&mut self, target: TextureTarget, level: u32, desc: ImageDesc) {
        let index = self.desc_index(target, level);
        debug_assert!(index < self.image_descs.len(), "level {level} out of range");
        if let Some(slot) = self.image_descs.get_mut(index) {
            *slot = desc;
        }
        self.invalidate();
    }

    pub fn clear_image_desc(&mut self, target: TextureTarget, level: u32) {
        self.set_image_desc(target, level, ImageDesc::default());
    }

    pub fn clear_image_descs(&mut self) {
        self.image_descs.fill(ImageDesc::default());
        self.invalidate();
    }

    /// Fills `base_level..=max_level` with a geometric chain from `base_size`.
    ///
    /// Each level halves the previous extent (floored, min 1). 2D arrays keep
    /// their layer count. Cube maps get the same chain on every face.
    pub fn set_image_desc_chain(
        &mut self,
        base_level: u32,
        max_level: u32,
        base_size: Extents,
        format: InternalFormat,
    ) {
        let keep_depth = self.texture_type == TextureType::Texture2DArray;
        let targets = self.texture_type.targets();
        for level in base_level..=max_level {
            let desc = ImageDesc::new(base_size.mip(level - base_level, keep_depth), format);
            for &target in &targets {
                self.set_image_desc(target, level, desc);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Completeness
    // ------------------------------------------------------------------------

    /// Six square, equally sized, same-format faces at level 0.
    #[must_use]
    pub fn is_cube_complete(&self) -> bool {
        debug_assert_eq!(self.texture_type, TextureType::CubeMap);

        let targets = TextureType::CubeMap.targets();
        let base = self.image_desc(targets[0], 0);
        if base.size.width == 0 || base.size.width != base.size.height {
            return false;
        }

        targets[1..].iter().all(|&face| {
            let desc = self.image_desc(face, 0);
            desc.size.width == base.size.width
                && desc.size.height == base.size.height
                && desc.format == base.format
        })
    }

    /// Every level of the mip chain is level-complete.
    #[must_use]
    pub fn is_mipmap_complete(&self) -> bool {
        let targets = self.texture_type.targets();
        (self.effective_base_level()..=self.mipmap_max_level()).all(|level| {
            targets
                .iter()
                .all(|&target| self.is_level_complete(target, level))
        })
    }

    /// One level of one target agrees with the base image.
    #[must_use]
    pub fn is_level_complete(&self, target: TextureTarget, level: u32) -> bool {
        if self.immutable_format {
            return true;
        }

        let base = self.base_image_desc();
        if base.is_empty() {
            return false;
        }

        let desc = self.image_desc(target, level);
        if desc.is_empty() || desc.format != base.format {
            return false;
        }

        let base_level = self.effective_base_level();
        debug_assert!(level >= base_level, "level below the base level");
        let relative_level = level.saturating_sub(base_level);
        let expected = base.size.mip(relative_level, false);

        if desc.size.width != expected.width || desc.size.height != expected.height {
            return false;
        }

        match self.texture_type {
            TextureType::Texture3D => desc.size.depth == expected.depth,
            TextureType::Texture2DArray => desc.size.depth == base.size.depth,
            TextureType::Texture2D | TextureType::CubeMap => true,
        }
    }

    /// Cached sampler completeness under `sampler` and `ctx`.
    #[must_use]
    pub fn is_sampler_complete(&self, sampler: &SamplerState, ctx: &ContextState) -> bool {
        let filterable = self
            .base_image_desc()
            .format
            .is_some_and(|format| ctx.caps(format).filterable());
        let client_version = ctx.client_version();
        let supports_npot = ctx.extensions().texture_npot;

        let cache = self.completeness_cache.get();
        if cache.valid
            && cache.sampler_state == *sampler
            && cache.filterable == filterable
            && cache.client_version == client_version
            && cache.supports_npot == supports_npot
        {
            return cache.sampler_complete;
        }

        let sampler_complete = self.compute_sampler_completeness(sampler, ctx);
        self.completeness_computations
            .set(self.completeness_computations.get() + 1);
        if cache.valid && cache.sampler_complete != sampler_complete {
            log::debug!(
                "Sampler completeness of {:?} texture changed to {sampler_complete}",
                self.texture_type
            );
        }

        self.completeness_cache.set(SamplerCompletenessCache {
            valid: true,
            sampler_state: *sampler,
            filterable,
            client_version,
            supports_npot,
            sampler_complete,
        });
        sampler_complete
    }

    fn compute_sampler_completeness(&self, sampler: &SamplerState, ctx: &ContextState) -> bool {
        if self.base_level > self.max_level {
            return false;
        }

        let base = self.base_image_desc();
        let Some(format) = base.format else {
            return false;
        };
        if base.is_empty() {
            return false;
        }

        let is_cube = self.texture_type == TextureType::CubeMap;
        if is_cube && base.size.width != base.size.height {
            return false;
        }

        if !ctx.caps(format).filterable() && !sampler.is_point_sampled() {
            return false;
        }

        let npot_support = ctx.supports_npot();
        let width_pot = base.size.width.is_power_of_two();
        let height_pot = base.size.height.is_power_of_two();
        if !npot_support
            && ((sampler.wrap_s != WrapMode::ClampToEdge && !width_pot)
                || (sampler.wrap_t != WrapMode::ClampToEdge && !height_pot))
        {
            return false;
        }

        if sampler.is_mipmap_filtered() {
            if !npot_support && (!width_pot || !height_pot) {
                return false;
            }
            if !self.is_mipmap_complete() {
                return false;
            }
        } else if is_cube && !self.is_cube_complete() {
            return false;
        }

        // Depth formats without comparison must be point sampled on 3.0+
        if format.depth_bits() > 0
            && ctx.client_version().major > 2
            && sampler.compare_mode == CompareMode::None
            && (!matches!(
                sampler.min_filter,
                MinFilter::Nearest | MinFilter::NearestMipmapNearest
            ) || sampler.mag_filter != MagFilter::Nearest)
        {
            return false;
        }

        true
    }

    // ------------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------------

    fn base_image_desc(&self) -> ImageDesc {
        self.image_desc(self.texture_type.base_target(), self.effective_base_level())
    }

    fn desc_index(&self, target: TextureTarget, level: u32) -> usize {
        debug_assert_eq!(
            target.texture_type(),
            self.texture_type,
            "target {target:?} does not belong to a {:?} texture",
            self.texture_type
        );
        let level = level as usize;
        match target.cube_face() {
            Some(face) => level * 6 + face.index(),
            None => level,
        }
    }

    /// Single invalidation path for every tracked input.
    fn invalidate(&mut self) {
        let mut cache = self.completeness_cache.get();
        cache.valid = false;
        self.completeness_cache.set(cache);
        self.tracker.changed();
    }
}

// ============================================================================
// Texture
// ============================================================================

/// Texture object.
#[derive(Debug)]
pub struct Texture {
    id: Handle,
    ref_count: RefCount,
    state: RefCell<TextureState>,
    label: RefCell<String>,
    bound_surface: RefCell<Option<Rc<Surface>>>,
}

impl Texture {
    #[must_use]
    pub fn new(id: Handle, texture_type: TextureType) -> Self {
        Self {
            id,
            ref_count: RefCount::new(),
            state: RefCell::new(TextureState::new(texture_type)),
            label: RefCell::new(String::new()),
            bound_surface: RefCell::new(None),
        }
    }

    #[must_use]
    pub fn texture_type(&self) -> TextureType {
        self.state.borrow().texture_type()
    }

    /// Read access to the image descriptors and completeness state.
    pub fn state(&self) -> Ref<'_, TextureState> {
        self.state.borrow()
    }

    /// Write access for backends that maintain descriptors themselves.
    pub fn state_mut(&self) -> RefMut<'_, TextureState> {
        self.state.borrow_mut()
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.state.borrow().version()
    }

    pub fn set_label(&self, label: impl Into<String>) {
        *self.label.borrow_mut() = label.into();
    }

    #[must_use]
    pub fn label(&self) -> String {
        self.label.borrow().clone()
    }

    // ------------------------------------------------------------------------
    // Sampling parameters
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn sampler_state(&self) -> SamplerState {
        *self.state.borrow().sampler_state()
    }

    pub fn set_sampler_state(&self, state: SamplerState) {
        self.state.borrow_mut().set_sampler_state(state);
    }

    /// Applies `edit` to the texture's own sampler state.
    pub fn update_sampler_state(&self, edit: impl FnOnce(&mut SamplerState)) {
        let mut state = self.sampler_state();
        edit(&mut state);
        self.set_sampler_state(state);
    }

    pub fn set_min_filter(&self, filter: MinFilter) {
        self.update_sampler_state(|state| state.min_filter = filter);
    }

    pub fn set_mag_filter(&self, filter: MagFilter) {
        self.update_sampler_state(|state| state.mag_filter = filter);
    }

    pub fn set_wrap(&self, wrap_s: WrapMode, wrap_t: WrapMode) {
        self.update_sampler_state(|state| {
            state.wrap_s = wrap_s;
            state.wrap_t = wrap_t;
        });
    }

    pub fn set_compare_mode(&self, mode: CompareMode) {
        self.update_sampler_state(|state| state.compare_mode = mode);
    }

    pub fn set_base_level(&self, level: u32) {
        self.state.borrow_mut().set_base_level(level);
    }

    #[must_use]
    pub fn base_level(&self) -> u32 {
        self.state.borrow().base_level()
    }

    pub fn set_max_level(&self, level: u32) {
        self.state.borrow_mut().set_max_level(level);
    }

    #[must_use]
    pub fn max_level(&self) -> u32 {
        self.state.borrow().max_level()
    }

    #[must_use]
    pub fn immutable_format(&self) -> bool {
        self.state.borrow().immutable_format()
    }

    #[must_use]
    pub fn immutable_levels(&self) -> u32 {
        self.state.borrow().immutable_levels()
    }

    // ------------------------------------------------------------------------
    // Completeness queries
    // ------------------------------------------------------------------------

    /// Completeness under the texture's own sampler state.
    #[must_use]
    pub fn is_sampler_complete(&self, ctx: &ContextState) -> bool {
        let state = self.state.borrow();
        let sampler = *state.sampler_state();
        state.is_sampler_complete(&sampler, ctx)
    }

    /// Completeness under a separately bound sampler object's state.
    #[must_use]
    pub fn is_sampler_complete_with(&self, sampler: &SamplerState, ctx: &ContextState) -> bool {
        self.state.borrow().is_sampler_complete(sampler, ctx)
    }

    #[must_use]
    pub fn is_mipmap_complete(&self) -> bool {
        self.state.borrow().is_mipmap_complete()
    }

    #[must_use]
    pub fn is_cube_complete(&self) -> bool {
        self.state.borrow().is_cube_complete()
    }

    #[must_use]
    pub fn sampler_completeness_computations(&self) -> u64 {
        self.state.borrow().sampler_completeness_computations()
    }

    // ------------------------------------------------------------------------
    // Image queries
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn image_desc(&self, target: TextureTarget, level: u32) -> ImageDesc {
        self.state.borrow().image_desc(target, level)
    }

    #[must_use]
    pub fn width(&self, target: TextureTarget, level: u32) -> u32 {
        self.image_desc(target, level).size.width
    }

    #[must_use]
    pub fn height(&self, target: TextureTarget, level: u32) -> u32 {
        self.image_desc(target, level).size.height
    }

    #[must_use]
    pub fn depth(&self, target: TextureTarget, level: u32) -> u32 {
        self.image_desc(target, level).size.depth
    }

    #[must_use]
    pub fn internal_format(&self, target: TextureTarget, level: u32) -> Option<InternalFormat> {
        self.image_desc(target, level).format
    }

    /// Size of the image an attachment refers to.
    #[must_use]
    pub fn attachment_size(&self, index: &ImageIndex) -> Extents {
        self.image_desc(index.target, index.level).size
    }

    #[must_use]
    pub fn attachment_format(&self, index: &ImageIndex) -> Option<InternalFormat> {
        self.image_desc(index.target, index.level).format
    }

    // ------------------------------------------------------------------------
    // Image storage
    // ------------------------------------------------------------------------

    /// Defines one mutable image.
    pub fn set_image(
        &self,
        target: TextureTarget,
        level: u32,
        format: InternalFormat,
        size: Extents,
    ) -> Result<()> {
        self.check_image_target(target, level)?;
        if format.is_compressed() {
            return Err(TesselError::InvalidValue(format!(
                "{format:?} is compressed; use set_compressed_image"
            )));
        }
        self.release_tex_image();
        self.state
            .borrow_mut()
            .set_image_desc(target, level, ImageDesc::new(size, format));
        Ok(())
    }

    /// Defines one mutable image from compressed data.
    pub fn set_compressed_image(
        &self,
        target: TextureTarget,
        level: u32,
        format: InternalFormat,
        size: Extents,
    ) -> Result<()> {
        self.check_image_target(target, level)?;
        if !format.is_compressed() {
            return Err(TesselError::InvalidValue(format!(
                "{format:?} is not a compressed format"
            )));
        }
        self.release_tex_image();
        self.state
            .borrow_mut()
            .set_image_desc(target, level, ImageDesc::new(size, format));
        Ok(())
    }

    /// Defines one image from a region of `source`, which must be complete.
    pub fn copy_image(
        &self,
        target: TextureTarget,
        level: u32,
        format: InternalFormat,
        width: u32,
        height: u32,
        source: &Framebuffer,
        ctx: &ContextState,
    ) -> Result<()> {
        self.check_image_target(target, level)?;
        let status = source.check_status(ctx);
        if status != FramebufferStatus::Complete {
            return Err(TesselError::InvalidFramebufferOperation(status.to_string()));
        }
        self.release_tex_image();
        self.state.borrow_mut().set_image_desc(
            target,
            level,
            ImageDesc::new(Extents::new(width, height, 1), format),
        );
        Ok(())
    }

    /// Allocates immutable storage for `levels` levels.
    pub fn set_storage(&self, levels: u32, format: InternalFormat, size: Extents) -> Result<()> {
        let texture_type = self.texture_type();
        if levels == 0 {
            return Err(TesselError::InvalidValue(
                "storage needs at least one level".to_string(),
            ));
        }
        if size.is_empty() {
            return Err(TesselError::InvalidValue(format!(
                "storage extent {size:?} is empty"
            )));
        }
        if self.immutable_format() {
            return Err(TesselError::InvalidOperation(format!(
                "texture {} already has immutable storage",
                self.id
            )));
        }

        let largest = match texture_type {
            TextureType::Texture3D => size.width.max(size.height).max(size.depth),
            _ => size.width.max(size.height),
        };
        let max_levels = (largest.ilog2() + 1).min(MAX_TEXTURE_LEVELS as u32);
        if levels > max_levels {
            return Err(TesselError::InvalidOperation(format!(
                "{levels} levels requested, a {largest}-texel image has at most {max_levels}"
            )));
        }

        self.release_tex_image();
        let mut state = self.state.borrow_mut();
        state.immutable_format = true;
        state.immutable_levels = levels;
        state.clear_image_descs();
        state.set_image_desc_chain(0, levels - 1, size, format);
        log::trace!("Texture {} got immutable storage: {levels} x {format:?}", self.id);
        Ok(())
    }

    /// Fills the chain below the base level from the base image.
    pub fn generate_mipmap(&self) -> Result<()> {
        self.release_tex_image();

        let mut state = self.state.borrow_mut();
        let base_level = state.effective_base_level();
        let base = state.image_desc(state.texture_type().base_target(), base_level);
        let Some(format) = base.format.filter(|_| !base.is_empty()) else {
            return Err(TesselError::InvalidOperation(
                "cannot generate mipmaps without a base image".to_string(),
            ));
        };
        if format.is_compressed() {
            return Err(TesselError::InvalidOperation(format!(
                "cannot generate mipmaps for compressed format {format:?}"
            )));
        }
        if state.texture_type() == TextureType::CubeMap && !state.is_cube_complete() {
            return Err(TesselError::InvalidOperation(
                "cube map is not cube complete".to_string(),
            ));
        }

        let max_level = state.mipmap_max_level();
        if max_level > base_level {
            state.set_image_desc_chain(base_level, max_level, base.size, format);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Window-surface images
    // ------------------------------------------------------------------------

    /// Uses the surface's color buffer as level 0 of this 2D texture.
    pub fn bind_tex_image(&self, surface: &Rc<Surface>) -> Result<()> {
        if self.texture_type() != TextureType::Texture2D {
            return Err(TesselError::InvalidOperation(
                "only 2D textures can bind a surface image".to_string(),
            ));
        }
        self.release_tex_image();

        surface.bind_texture(self.id);
        *self.bound_surface.borrow_mut() = Some(Rc::clone(surface));
        self.state.borrow_mut().set_image_desc(
            TextureTarget::Texture2D,
            0,
            ImageDesc::new(surface.size(), surface.color_format()),
        );
        Ok(())
    }

    /// Drops a bound surface image, if any. Level 0 becomes undefined.
    pub fn release_tex_image(&self) {
        let Some(surface) = self.bound_surface.borrow_mut().take() else {
            return;
        };
        surface.release_texture(self.id);
        self.state
            .borrow_mut()
            .clear_image_desc(TextureTarget::Texture2D, 0);
    }

    #[must_use]
    pub fn bound_surface(&self) -> Option<Rc<Surface>> {
        self.bound_surface.borrow().clone()
    }

    fn check_image_target(&self, target: TextureTarget, level: u32) -> Result<()> {
        let texture_type = self.texture_type();
        if target.texture_type() != texture_type {
            return Err(TesselError::InvalidOperation(format!(
                "target {target:?} does not match {texture_type:?} texture {}",
                self.id
            )));
        }
        if level as usize >= MAX_TEXTURE_LEVELS {
            return Err(TesselError::InvalidValue(format!(
                "level {level} exceeds {MAX_TEXTURE_LEVELS} levels"
            )));
        }
        if self.immutable_format() {
            return Err(TesselError::InvalidOperation(format!(
                "texture {} has immutable storage",
                self.id
            )));
        }
        Ok(())
    }
}

impl Resource for Texture {
    const KIND: &'static str = "texture";

    fn id(&self) -> Handle {
        self.id
    }

    fn ref_count(&self) -> &RefCount {
        &self.ref_count
    }

    fn on_destroy(&self) {
        self.release_tex_image();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_index::CubeFace;

    fn rgba(width: u32, height: u32) -> ImageDesc {
        ImageDesc::new(Extents::new(width, height, 1), InternalFormat::Rgba8)
    }

    #[test]
    fn test_cube_desc_index_is_face_major_per_level() {
        let mut state = TextureState::new(TextureType::CubeMap);
        let target = TextureTarget::CubeMapFace(CubeFace::PositiveZ);
        state.set_image_desc(target, 2, rgba(4, 4));

        assert_eq!(state.image_descs[2 * 6 + 4], rgba(4, 4));
        assert_eq!(state.image_desc(target, 2), rgba(4, 4));
        assert!(state.image_desc(target, 1).is_empty());
    }

    #[test]
    fn test_chain_keeps_array_layers() {
        let mut state = TextureState::new(TextureType::Texture2DArray);
        state.set_image_desc_chain(0, 2, Extents::new(8, 4, 3), InternalFormat::Rgba8);

        let level2 = state.image_desc(TextureTarget::Texture2DArray, 2);
        assert_eq!(level2.size, Extents::new(2, 1, 3));
        assert!(state.is_mipmap_complete());
    }

    #[test]
    fn test_mipmap_max_level() {
        let mut state = TextureState::new(TextureType::Texture2D);
        state.set_image_desc(TextureTarget::Texture2D, 0, rgba(16, 4));
        assert_eq!(state.mipmap_max_level(), 4);

        state.set_max_level(2);
        assert_eq!(state.mipmap_max_level(), 2);
    }

    #[test]
    fn test_writes_bump_version() {
        let mut state = TextureState::new(TextureType::Texture2D);
        let before = state.version();
        state.set_image_desc(TextureTarget::Texture2D, 0, rgba(2, 2));
        state.set_base_level(1);
        // unchanged value, no bump
        state.set_base_level(1);
        assert_eq!(state.version(), before + 2);
    }
}
