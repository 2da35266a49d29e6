//! # Tessel
//!
//! Object lifetime and validity bookkeeping for a GL-style drawing API.
//!
//! Tessel owns every client-visible object (buffers, textures, renderbuffers,
//! framebuffers, samplers, shaders, programs, paths) behind an integer
//! [`Handle`], and answers the question every draw, clear and read asks first:
//! is this texture sampleable, is this framebuffer complete?
//!
//! ```rust,ignore
//! use tessel::prelude::*;
//!
//! let ctx = ContextState::default();
//! let mut objects = ShareGroup::new();
//!
//! let color = objects.create_renderbuffer()?;
//! let color = objects.check_renderbuffer_allocation(color)?.unwrap();
//! color.set_storage(InternalFormat::Rgba8, 64, 64);
//!
//! let fbo = objects.create_framebuffer()?;
//! let fbo = objects.check_framebuffer_allocation(fbo)?.unwrap();
//! fbo.attach_renderbuffer(AttachmentPoint::Color(0), &color)?;
//! assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Complete);
//! ```
//!
//! The workspace is split in two crates, both re-exported here:
//!
//! - [`tessel_core`]: handles, object tables, ref counts, the generic manager
//! - [`tessel_resources`]: the object kinds and their completeness rules

pub use tessel_core;
pub use tessel_resources;

pub use tessel_core::{Handle, Result, TesselError};
pub use tessel_resources::{
    ContextSettings, ContextState, Framebuffer, FramebufferStatus, ShareGroup, Texture,
};

pub mod prelude {
    pub use tessel_core::{
        Handle, HandleAllocator, RefCount, Resource, ResourceManager, ResourceRef, Result,
        TesselError, defer_while_referenced, destroy_now,
    };
    pub use tessel_resources::{
        AttachmentInfo, AttachmentObjectType, AttachmentPoint, Buffer, BufferUsage,
        ContextSettings, ContextState, CubeFace, DrawBuffer, Extensions, Extents, Framebuffer,
        FramebufferStatus, ImageIndex, InternalFormat, MagFilter, MinFilter, Path, Program,
        Renderbuffer, Sampler, SamplerState, Shader, ShaderType, ShareGroup, Surface, Texture,
        TextureCaps, TextureTarget, TextureType, Version, WrapMode,
    };
}
