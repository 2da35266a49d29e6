//! Context Settings & Capability State
//!
//! Everything the completeness engines need to know about the owning context,
//! passed to them explicitly as a [`ContextState`]:
//!
//! - the client API version (several rules only apply before 3.0),
//! - the enabled extensions,
//! - implementation limits,
//! - the derived per-format [`TextureCapsMap`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tessel_resources::settings::{ContextSettings, ContextState, Extensions, Version};
//!
//! // Defaults: a 3.0 context, no extensions, 8 color attachments
//! let ctx = ContextState::new(ContextSettings::default());
//!
//! // A 2.0 context with NPOT support, loaded from JSON
//! let settings = ContextSettings::from_json(r#"{
//!     "client_version": { "major": 2, "minor": 0 },
//!     "extensions": { "texture_npot": true }
//! }"#)?;
//! let ctx = ContextState::new(settings);
//! ```

use serde::{Deserialize, Serialize};
use tessel_core::errors::{Result, TesselError};

use crate::caps::{TextureCaps, TextureCapsMap};
use crate::format::InternalFormat;
use crate::framebuffer::MAX_COLOR_ATTACHMENTS;
use crate::image_index::MAX_TEXTURE_LEVELS;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Client API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl Default for Version {
    #[inline]
    fn default() -> Self {
        Self::new(3, 0)
    }
}

/// Enabled extensions. Everything is off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Extensions {
    /// Full non-power-of-two texture support on pre-3.0 contexts
    pub texture_npot: bool,
    /// Depth (and packed depth-stencil) textures as attachments
    pub depth_textures: bool,
    pub packed_depth_stencil: bool,
    /// Float formats are color-renderable
    pub color_buffer_float: bool,
    pub texture_float: bool,
    pub texture_float_linear: bool,
    pub texture_half_float_linear: bool,
    /// Non-zero texture levels as attachments on pre-3.0 contexts
    pub fbo_render_mipmap: bool,
    pub draw_buffers: bool,
}

/// Implementation limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_color_attachments: u32,
    pub max_draw_buffers: u32,
    pub max_samples: u32,
    pub max_texture_levels: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_color_attachments: MAX_COLOR_ATTACHMENTS as u32,
            max_draw_buffers: MAX_COLOR_ATTACHMENTS as u32,
            max_samples: 4,
            max_texture_levels: MAX_TEXTURE_LEVELS as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    pub client_version: Version,
    pub extensions: Extensions,
    pub limits: Limits,
}

impl ContextSettings {
    /// Parses settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| TesselError::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects limits beyond what the object layer can store.
    pub fn validate(&self) -> Result<()> {
        let limits = &self.limits;
        if limits.max_color_attachments == 0
            || limits.max_color_attachments as usize > MAX_COLOR_ATTACHMENTS
        {
            return Err(TesselError::InvalidConfig(format!(
                "max_color_attachments must be in 1..={MAX_COLOR_ATTACHMENTS}, got {}",
                limits.max_color_attachments
            )));
        }
        if limits.max_draw_buffers > limits.max_color_attachments {
            return Err(TesselError::InvalidConfig(format!(
                "max_draw_buffers ({}) exceeds max_color_attachments ({})",
                limits.max_draw_buffers, limits.max_color_attachments
            )));
        }
        if limits.max_texture_levels == 0 || limits.max_texture_levels as usize > MAX_TEXTURE_LEVELS
        {
            return Err(TesselError::InvalidConfig(format!(
                "max_texture_levels must be in 1..={MAX_TEXTURE_LEVELS}, got {}",
                limits.max_texture_levels
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ContextState
// ---------------------------------------------------------------------------

/// Capability bundle handed to every completeness query.
#[derive(Debug, Clone)]
pub struct ContextState {
    settings: ContextSettings,
    texture_caps: TextureCapsMap,
    serial: u64,
}

impl Default for ContextState {
    fn default() -> Self {
        Self::new(ContextSettings::default())
    }
}

impl ContextState {
    #[must_use]
    pub fn new(settings: ContextSettings) -> Self {
        let texture_caps =
            TextureCapsMap::from_settings(settings.client_version, &settings.extensions);
        Self {
            settings,
            texture_caps,
            serial: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &ContextSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn client_version(&self) -> Version {
        self.settings.client_version
    }

    /// Pre-3.0 rules apply
    #[inline]
    #[must_use]
    pub fn is_es2(&self) -> bool {
        self.settings.client_version.major < 3
    }

    #[inline]
    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        &self.settings.extensions
    }

    #[inline]
    #[must_use]
    pub fn limits(&self) -> &Limits {
        &self.settings.limits
    }

    #[inline]
    #[must_use]
    pub fn texture_caps(&self) -> &TextureCapsMap {
        &self.texture_caps
    }

    #[inline]
    #[must_use]
    pub fn caps(&self, format: InternalFormat) -> TextureCaps {
        self.texture_caps.get(format)
    }

    /// NPOT textures are fully supported (3.0+ or the extension).
    #[must_use]
    pub fn supports_npot(&self) -> bool {
        self.settings.extensions.texture_npot || !self.is_es2()
    }

    /// Depth textures can be attached (3.0+ or the extension).
    #[must_use]
    pub fn supports_depth_textures(&self) -> bool {
        self.settings.extensions.depth_textures || !self.is_es2()
    }

    /// Overrides the caps of one format.
    pub fn set_texture_caps(&mut self, format: InternalFormat, caps: TextureCaps) {
        self.texture_caps.insert(format, caps);
        self.serial = self.serial.wrapping_add(1);
        log::debug!("Texture caps of {format:?} overridden to {caps:?}");
    }

    /// Bumped on every capability change; part of cached verdict keys.
    #[inline]
    #[must_use]
    pub fn serial(&self) -> u64 {
        self.serial
    }
}
