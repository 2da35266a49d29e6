//! Sized Internal Formats
//!
//! The static description of every image format the object layer understands:
//! per-channel bit depths, depth/stencil bits, bytes per pixel, component type
//! and color encoding. Capability data (texturable / filterable / renderable)
//! depends on the context and lives in [`crate::caps`].

use serde::{Deserialize, Serialize};

/// Numeric interpretation of a format's components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ComponentType {
    #[default]
    None,
    UnsignedNormalized,
    SignedNormalized,
    Float,
    UnsignedInt,
    Int,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorEncoding {
    #[default]
    Linear,
    Srgb,
}

/// Static properties of a sized internal format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatInfo {
    pub red_bits: u32,
    pub green_bits: u32,
    pub blue_bits: u32,
    pub alpha_bits: u32,
    pub luminance_bits: u32,
    pub depth_bits: u32,
    pub stencil_bits: u32,
    pub pixel_bytes: u32,
    pub component_type: ComponentType,
    pub color_encoding: ColorEncoding,
    pub compressed: bool,
}

impl FormatInfo {
    const fn color(rgba: [u32; 4], pixel_bytes: u32, component_type: ComponentType) -> Self {
        Self {
            red_bits: rgba[0],
            green_bits: rgba[1],
            blue_bits: rgba[2],
            alpha_bits: rgba[3],
            luminance_bits: 0,
            depth_bits: 0,
            stencil_bits: 0,
            pixel_bytes,
            component_type,
            color_encoding: ColorEncoding::Linear,
            compressed: false,
        }
    }

    const fn depth_stencil(depth_bits: u32, stencil_bits: u32, pixel_bytes: u32) -> Self {
        Self {
            red_bits: 0,
            green_bits: 0,
            blue_bits: 0,
            alpha_bits: 0,
            luminance_bits: 0,
            depth_bits,
            stencil_bits,
            pixel_bytes,
            component_type: if depth_bits == 32 {
                ComponentType::Float
            } else if depth_bits > 0 {
                ComponentType::UnsignedNormalized
            } else {
                ComponentType::UnsignedInt
            },
            color_encoding: ColorEncoding::Linear,
            compressed: false,
        }
    }

    const fn srgb(mut self) -> Self {
        self.color_encoding = ColorEncoding::Srgb;
        self
    }

    const fn luminance(mut self, bits: u32) -> Self {
        self.luminance_bits = bits;
        self
    }

    const fn compressed(mut self) -> Self {
        self.compressed = true;
        self
    }

    /// Has any depth or stencil bits
    #[inline]
    #[must_use]
    pub fn is_depth_or_stencil(&self) -> bool {
        self.depth_bits > 0 || self.stencil_bits > 0
    }
}

/// Sized internal formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InternalFormat {
    // Normalized color
    R8,
    Rg8,
    Rgb8,
    Rgba8,
    Bgra8,
    Srgb8Alpha8,
    Rgb565,
    Rgba4,
    Rgb5A1,
    Rgb10A2,
    Luminance8,
    Alpha8,
    Luminance8Alpha8,

    // Floating point color
    R16F,
    Rg16F,
    Rgba16F,
    R32F,
    Rgba32F,
    R11FG11FB10F,

    // Integer color
    R8UI,
    Rgba8UI,
    R32I,

    // Depth / stencil
    DepthComponent16,
    DepthComponent24,
    DepthComponent32F,
    Depth24Stencil8,
    Depth32FStencil8,
    StencilIndex8,

    // Compressed
    Etc1Rgb8,
    Etc2Rgba8,
}

impl InternalFormat {
    pub const ALL: [InternalFormat; 30] = [
        Self::R8,
        Self::Rg8,
        Self::Rgb8,
        Self::Rgba8,
        Self::Bgra8,
        Self::Srgb8Alpha8,
        Self::Rgb565,
        Self::Rgba4,
        Self::Rgb5A1,
        Self::Rgb10A2,
        Self::Luminance8,
        Self::Alpha8,
        Self::Luminance8Alpha8,
        Self::R16F,
        Self::Rg16F,
        Self::Rgba16F,
        Self::R32F,
        Self::Rgba32F,
        Self::R11FG11FB10F,
        Self::R8UI,
        Self::Rgba8UI,
        Self::R32I,
        Self::DepthComponent16,
        Self::DepthComponent24,
        Self::DepthComponent32F,
        Self::Depth24Stencil8,
        Self::Depth32FStencil8,
        Self::StencilIndex8,
        Self::Etc1Rgb8,
        Self::Etc2Rgba8,
    ];

    #[must_use]
    pub const fn info(self) -> FormatInfo {
        use ComponentType::{Float, Int, UnsignedInt, UnsignedNormalized as Unorm};
        match self {
            Self::R8 => FormatInfo::color([8, 0, 0, 0], 1, Unorm),
            Self::Rg8 => FormatInfo::color([8, 8, 0, 0], 2, Unorm),
            Self::Rgb8 => FormatInfo::color([8, 8, 8, 0], 3, Unorm),
            Self::Rgba8 | Self::Bgra8 => FormatInfo::color([8, 8, 8, 8], 4, Unorm),
            Self::Srgb8Alpha8 => FormatInfo::color([8, 8, 8, 8], 4, Unorm).srgb(),
            Self::Rgb565 => FormatInfo::color([5, 6, 5, 0], 2, Unorm),
            Self::Rgba4 => FormatInfo::color([4, 4, 4, 4], 2, Unorm),
            Self::Rgb5A1 => FormatInfo::color([5, 5, 5, 1], 2, Unorm),
            Self::Rgb10A2 => FormatInfo::color([10, 10, 10, 2], 4, Unorm),
            Self::Luminance8 => FormatInfo::color([0, 0, 0, 0], 1, Unorm).luminance(8),
            Self::Alpha8 => FormatInfo::color([0, 0, 0, 8], 1, Unorm),
            Self::Luminance8Alpha8 => FormatInfo::color([0, 0, 0, 8], 2, Unorm).luminance(8),

            Self::R16F => FormatInfo::color([16, 0, 0, 0], 2, Float),
            Self::Rg16F => FormatInfo::color([16, 16, 0, 0], 4, Float),
            Self::Rgba16F => FormatInfo::color([16, 16, 16, 16], 8, Float),
            Self::R32F => FormatInfo::color([32, 0, 0, 0], 4, Float),
            Self::Rgba32F => FormatInfo::color([32, 32, 32, 32], 16, Float),
            Self::R11FG11FB10F => FormatInfo::color([11, 11, 10, 0], 4, Float),

            Self::R8UI => FormatInfo::color([8, 0, 0, 0], 1, UnsignedInt),
            Self::Rgba8UI => FormatInfo::color([8, 8, 8, 8], 4, UnsignedInt),
            Self::R32I => FormatInfo::color([32, 0, 0, 0], 4, Int),

            Self::DepthComponent16 => FormatInfo::depth_stencil(16, 0, 2),
            Self::DepthComponent24 => FormatInfo::depth_stencil(24, 0, 4),
            Self::DepthComponent32F => FormatInfo::depth_stencil(32, 0, 4),
            Self::Depth24Stencil8 => FormatInfo::depth_stencil(24, 8, 4),
            Self::Depth32FStencil8 => FormatInfo::depth_stencil(32, 8, 8),
            Self::StencilIndex8 => FormatInfo::depth_stencil(0, 8, 1),

            Self::Etc1Rgb8 => FormatInfo::color([8, 8, 8, 0], 0, Unorm).compressed(),
            Self::Etc2Rgba8 => FormatInfo::color([8, 8, 8, 8], 0, Unorm).compressed(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn depth_bits(self) -> u32 {
        self.info().depth_bits
    }

    #[inline]
    #[must_use]
    pub const fn stencil_bits(self) -> u32 {
        self.info().stencil_bits
    }

    #[inline]
    #[must_use]
    pub const fn pixel_bytes(self) -> u32 {
        self.info().pixel_bytes
    }

    #[inline]
    #[must_use]
    pub const fn is_compressed(self) -> bool {
        self.info().compressed
    }
}
