//! Per-format texture capabilities.
//!
//! Whether a format can be sampled, filtered or rendered to depends on the
//! client version and the enabled extensions. [`TextureCapsMap::from_settings`]
//! derives the table once per context.

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::format::InternalFormat;
use crate::settings::{Extensions, Version};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextureCaps: u8 {
        /// Can back a texture image
        const TEXTURABLE = 1 << 0;
        /// Supports linear filtering
        const FILTERABLE = 1 << 1;
        /// Can be rendered to (color, depth or stencil)
        const RENDERABLE = 1 << 2;
    }
}

impl TextureCaps {
    #[inline]
    #[must_use]
    pub fn texturable(self) -> bool {
        self.contains(Self::TEXTURABLE)
    }

    #[inline]
    #[must_use]
    pub fn filterable(self) -> bool {
        self.contains(Self::FILTERABLE)
    }

    #[inline]
    #[must_use]
    pub fn renderable(self) -> bool {
        self.contains(Self::RENDERABLE)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextureCapsMap {
    caps: FxHashMap<InternalFormat, TextureCaps>,
}

impl TextureCapsMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Capability table for a context of the given version and extensions.
    #[must_use]
    pub fn from_settings(version: Version, extensions: &Extensions) -> Self {
        let mut map = Self::new();
        for format in InternalFormat::ALL {
            map.insert(format, derive_caps(format, version, extensions));
        }
        map
    }

    pub fn insert(&mut self, format: InternalFormat, caps: TextureCaps) {
        self.caps.insert(format, caps);
    }

    /// Caps of `format`; unknown formats have none.
    #[must_use]
    pub fn get(&self, format: InternalFormat) -> TextureCaps {
        self.caps.get(&format).copied().unwrap_or_default()
    }
}

fn derive_caps(format: InternalFormat, version: Version, ext: &Extensions) -> TextureCaps {
    use InternalFormat as F;

    let es3 = version.major >= 3;
    let all = TextureCaps::all();
    let sample = TextureCaps::TEXTURABLE | TextureCaps::FILTERABLE;
    let when = |condition: bool, caps: TextureCaps| {
        if condition { caps } else { TextureCaps::empty() }
    };

    match format {
        F::Rgba8 | F::Rgb8 | F::Bgra8 | F::Rgb565 | F::Rgba4 | F::Rgb5A1 => all,
        F::Luminance8 | F::Alpha8 | F::Luminance8Alpha8 => sample,
        F::R8 | F::Rg8 | F::Srgb8Alpha8 | F::Rgb10A2 => when(es3, all),
        F::R11FG11FB10F => {
            when(es3, sample) | when(es3 && ext.color_buffer_float, TextureCaps::RENDERABLE)
        }
        F::R8UI | F::Rgba8UI | F::R32I => {
            when(es3, TextureCaps::TEXTURABLE | TextureCaps::RENDERABLE)
        }

        F::R16F | F::Rg16F | F::Rgba16F => {
            when(es3 || ext.texture_float, TextureCaps::TEXTURABLE)
                | when(es3 || ext.texture_half_float_linear, TextureCaps::FILTERABLE)
                | when(ext.color_buffer_float, TextureCaps::RENDERABLE)
        }
        F::R32F | F::Rgba32F => {
            when(es3 || ext.texture_float, TextureCaps::TEXTURABLE)
                | when(ext.texture_float_linear, TextureCaps::FILTERABLE)
                | when(ext.color_buffer_float, TextureCaps::RENDERABLE)
        }

        F::DepthComponent16 => {
            TextureCaps::RENDERABLE
                | when(es3 || ext.depth_textures, TextureCaps::TEXTURABLE)
                | when(es3, TextureCaps::FILTERABLE)
        }
        F::DepthComponent24 | F::DepthComponent32F => {
            when(es3 || ext.depth_textures, TextureCaps::TEXTURABLE | TextureCaps::RENDERABLE)
                | when(es3, TextureCaps::FILTERABLE)
        }
        F::Depth24Stencil8 | F::Depth32FStencil8 => {
            when(es3 || ext.packed_depth_stencil, TextureCaps::RENDERABLE)
                | when(
                    es3 || (ext.packed_depth_stencil && ext.depth_textures),
                    TextureCaps::TEXTURABLE,
                )
                | when(es3, TextureCaps::FILTERABLE)
        }
        F::StencilIndex8 => TextureCaps::RENDERABLE,

        F::Etc1Rgb8 => sample,
        F::Etc2Rgba8 => when(es3, sample),
    }
}
