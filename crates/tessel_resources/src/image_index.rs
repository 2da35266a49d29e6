//! Texture targets, extents and sub-resource locators.

use serde::{Deserialize, Serialize};

/// Number of mip levels a texture can describe.
pub const MAX_TEXTURE_LEVELS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        Self::PositiveX,
        Self::NegativeX,
        Self::PositiveY,
        Self::NegativeY,
        Self::PositiveZ,
        Self::NegativeZ,
    ];

    /// Layer index of the face, `0..6`
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Kind of texture object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureType {
    Texture2D,
    Texture3D,
    Texture2DArray,
    CubeMap,
}

impl TextureType {
    /// Target holding the base image (the +X face for cube maps)
    #[must_use]
    pub const fn base_target(self) -> TextureTarget {
        match self {
            Self::Texture2D => TextureTarget::Texture2D,
            Self::Texture3D => TextureTarget::Texture3D,
            Self::Texture2DArray => TextureTarget::Texture2DArray,
            Self::CubeMap => TextureTarget::CubeMapFace(CubeFace::PositiveX),
        }
    }

    /// Every image target of the type, in descriptor order
    #[must_use]
    pub fn targets(self) -> Vec<TextureTarget> {
        match self {
            Self::CubeMap => CubeFace::ALL
                .into_iter()
                .map(TextureTarget::CubeMapFace)
                .collect(),
            other => vec![other.base_target()],
        }
    }

    #[inline]
    #[must_use]
    pub const fn face_count(self) -> usize {
        match self {
            Self::CubeMap => 6,
            _ => 1,
        }
    }
}

/// Image target within a texture: the texture itself, or one cube face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureTarget {
    Texture2D,
    Texture3D,
    Texture2DArray,
    CubeMapFace(CubeFace),
}

impl TextureTarget {
    #[must_use]
    pub const fn texture_type(self) -> TextureType {
        match self {
            Self::Texture2D => TextureType::Texture2D,
            Self::Texture3D => TextureType::Texture3D,
            Self::Texture2DArray => TextureType::Texture2DArray,
            Self::CubeMapFace(_) => TextureType::CubeMap,
        }
    }

    #[inline]
    #[must_use]
    pub const fn cube_face(self) -> Option<CubeFace> {
        match self {
            Self::CubeMapFace(face) => Some(face),
            _ => None,
        }
    }
}

/// Width x height x depth of an image. Depth is the layer count for arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Extents {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Extents {
    #[must_use]
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Any dimension is zero
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.depth == 0
    }

    /// Extent `relative_level` levels below this one: each dimension halved and
    /// floored, never below 1. With `keep_depth` the depth is carried unchanged.
    #[must_use]
    pub fn mip(&self, relative_level: u32, keep_depth: bool) -> Self {
        let halve = |dim: u32| dim.checked_shr(relative_level).unwrap_or(0).max(1);
        Self {
            width: halve(self.width),
            height: halve(self.height),
            depth: if keep_depth {
                self.depth
            } else {
                halve(self.depth)
            },
        }
    }
}

/// Locates one image of a texture: target, mip level, and optionally one layer.
///
/// `layer: None` selects the entire level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageIndex {
    pub target: TextureTarget,
    pub level: u32,
    pub layer: Option<u32>,
}

impl ImageIndex {
    #[must_use]
    pub const fn texture_2d(level: u32) -> Self {
        Self {
            target: TextureTarget::Texture2D,
            level,
            layer: None,
        }
    }

    #[must_use]
    pub const fn texture_cube(face: CubeFace, level: u32) -> Self {
        Self {
            target: TextureTarget::CubeMapFace(face),
            level,
            layer: None,
        }
    }

    #[must_use]
    pub const fn texture_3d(level: u32, layer: Option<u32>) -> Self {
        Self {
            target: TextureTarget::Texture3D,
            level,
            layer,
        }
    }

    #[must_use]
    pub const fn texture_2d_array(level: u32, layer: Option<u32>) -> Self {
        Self {
            target: TextureTarget::Texture2DArray,
            level,
            layer,
        }
    }
}
