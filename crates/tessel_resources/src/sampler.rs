//! Sampler state and sampler objects.

use std::cell::{Cell, RefCell};

use serde::{Deserialize, Serialize};
use tessel_core::{Handle, RefCount, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MinFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl MinFilter {
    /// Reads from more than one mip level
    #[must_use]
    pub const fn is_mipmapped(self) -> bool {
        !matches!(self, Self::Nearest | Self::Linear)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MagFilter {
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WrapMode {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareMode {
    None,
    CompareRefToTexture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// Sampling parameters, owned by a texture or by a sampler object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplerState {
    pub min_filter: MinFilter,
    pub mag_filter: MagFilter,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub wrap_r: WrapMode,
    pub max_anisotropy: f32,
    pub min_lod: f32,
    pub max_lod: f32,
    pub compare_mode: CompareMode,
    pub compare_func: CompareFunc,
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            min_filter: MinFilter::NearestMipmapLinear,
            mag_filter: MagFilter::Linear,
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            wrap_r: WrapMode::Repeat,
            max_anisotropy: 1.0,
            min_lod: -1000.0,
            max_lod: 1000.0,
            compare_mode: CompareMode::None,
            compare_func: CompareFunc::LessEqual,
        }
    }
}

impl SamplerState {
    /// Nearest magnification and a nearest, non-interpolating minification
    #[must_use]
    pub fn is_point_sampled(&self) -> bool {
        self.mag_filter == MagFilter::Nearest
            && matches!(
                self.min_filter,
                MinFilter::Nearest | MinFilter::NearestMipmapNearest
            )
    }

    #[inline]
    #[must_use]
    pub fn is_mipmap_filtered(&self) -> bool {
        self.min_filter.is_mipmapped()
    }
}

/// Sampler object: a named, shareable [`SamplerState`].
#[derive(Debug)]
pub struct Sampler {
    id: Handle,
    ref_count: RefCount,
    state: Cell<SamplerState>,
    label: RefCell<String>,
}

impl Sampler {
    #[must_use]
    pub fn new(id: Handle) -> Self {
        Self {
            id,
            ref_count: RefCount::new(),
            state: Cell::new(SamplerState::default()),
            label: RefCell::new(String::new()),
        }
    }

    #[must_use]
    pub fn state(&self) -> SamplerState {
        self.state.get()
    }

    /// Applies `edit` to the sampler state.
    pub fn update(&self, edit: impl FnOnce(&mut SamplerState)) {
        let mut state = self.state.get();
        edit(&mut state);
        self.state.set(state);
    }

    pub fn set_label(&self, label: impl Into<String>) {
        *self.label.borrow_mut() = label.into();
    }

    #[must_use]
    pub fn label(&self) -> String {
        self.label.borrow().clone()
    }
}

impl Resource for Sampler {
    const KIND: &'static str = "sampler";

    fn id(&self) -> Handle {
        self.id
    }

    fn ref_count(&self) -> &RefCount {
        &self.ref_count
    }
}
