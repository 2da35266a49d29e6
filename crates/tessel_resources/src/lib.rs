//! Tessel Resources
//!
//! The concrete object kinds of a share group and the completeness rules that
//! decide whether they can be sampled from or rendered to.
//!
//! - [`texture`]: image descriptors, mip chains, sampler completeness
//! - [`framebuffer`]: attachments, draw/read buffers, framebuffer completeness
//! - [`settings`]: the [`ContextState`] every completeness check is evaluated against
//! - [`share_group`]: one resource manager per kind

pub mod attachment;
pub mod buffer;
pub mod caps;
pub mod format;
pub mod framebuffer;
pub mod image_index;
pub mod path;
pub mod program;
pub mod renderbuffer;
pub mod sampler;
pub mod settings;
pub mod shader;
pub mod share_group;
pub mod surface;
pub mod texture;

pub use attachment::{
    AttachedResource, AttachmentInfo, AttachmentObjectType, AttachmentPoint,
    FramebufferAttachment, SurfaceAspect,
};
pub use buffer::{Buffer, BufferUsage};
pub use caps::{TextureCaps, TextureCapsMap};
pub use format::{ColorEncoding, ComponentType, FormatInfo, InternalFormat};
pub use framebuffer::{DrawBuffer, Framebuffer, FramebufferStatus, MAX_COLOR_ATTACHMENTS};
pub use image_index::{
    CubeFace, Extents, ImageIndex, MAX_TEXTURE_LEVELS, TextureTarget, TextureType,
};
pub use path::{EndCap, JoinStyle, Path, PathCommand, StrokeParams};
pub use program::Program;
pub use renderbuffer::{Renderbuffer, RenderbufferStorage};
pub use sampler::{
    CompareFunc, CompareMode, MagFilter, MinFilter, Sampler, SamplerState, WrapMode,
};
pub use settings::{ContextSettings, ContextState, Extensions, Limits, Version};
pub use shader::{Shader, ShaderType};
pub use share_group::ShareGroup;
pub use surface::Surface;
pub use texture::{DEFAULT_MAX_LEVEL, ImageDesc, Texture, TextureState};
