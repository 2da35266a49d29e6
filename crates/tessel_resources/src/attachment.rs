//! Framebuffer Attachments
//!
//! A [`FramebufferAttachment`] ties one binding point of a framebuffer to an
//! attachable image: a texture image (selected by an [`ImageIndex`]), a
//! renderbuffer, or a buffer of the window surface.
//!
//! # Ownership
//!
//! Texture and renderbuffer attachments hold a [`ResourceRef`], which counts as
//! a holder of the object: a texture deleted by the client stays alive while a
//! framebuffer still renders to it. Dropping the attachment (detach, rebind, or
//! framebuffer destruction) releases that holder. The handle stored in the
//! resource is the back-reference used for identity and queries.
//!
//! All geometry and format queries delegate to the attached resource, so they
//! always reflect its current storage.

use std::rc::Rc;

use tessel_core::{Handle, ResourceRef};

use crate::format::{ColorEncoding, ComponentType, FormatInfo, InternalFormat};
use crate::image_index::{CubeFace, Extents, ImageIndex};
use crate::renderbuffer::Renderbuffer;
use crate::surface::Surface;
use crate::texture::Texture;

/// Binding point of a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentPoint {
    Color(u32),
    Depth,
    Stencil,
    /// Depth and stencil bound to one object
    DepthStencil,
}

/// What kind of object an attachment names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttachmentObjectType {
    #[default]
    None,
    Texture,
    Renderbuffer,
    FramebufferDefault,
}

/// Which buffer of a window surface an attachment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceAspect {
    Color,
    DepthStencil,
}

#[derive(Debug, Clone)]
pub enum AttachedResource {
    Texture(ResourceRef<Texture>),
    Renderbuffer(ResourceRef<Renderbuffer>),
    Surface {
        surface: Rc<Surface>,
        aspect: SurfaceAspect,
    },
}

/// One attachment of a framebuffer.
///
/// Cloning an attachment adds a holder to the attached object.
#[derive(Debug, Clone)]
pub struct FramebufferAttachment {
    binding: AttachmentPoint,
    image_index: Option<ImageIndex>,
    resource: AttachedResource,
}

impl FramebufferAttachment {
    #[must_use]
    pub fn texture(
        binding: AttachmentPoint,
        texture: ResourceRef<Texture>,
        index: ImageIndex,
    ) -> Self {
        debug_assert_eq!(
            index.target.texture_type(),
            texture.texture_type(),
            "image index does not match the texture type"
        );
        Self {
            binding,
            image_index: Some(index),
            resource: AttachedResource::Texture(texture),
        }
    }

    #[must_use]
    pub fn renderbuffer(
        binding: AttachmentPoint,
        renderbuffer: ResourceRef<Renderbuffer>,
    ) -> Self {
        Self {
            binding,
            image_index: None,
            resource: AttachedResource::Renderbuffer(renderbuffer),
        }
    }

    #[must_use]
    pub fn surface(
        binding: AttachmentPoint,
        surface: Rc<Surface>,
        aspect: SurfaceAspect,
    ) -> Self {
        Self {
            binding,
            image_index: None,
            resource: AttachedResource::Surface { surface, aspect },
        }
    }

    /// Same attachment, recorded under another binding point.
    #[must_use]
    pub(crate) fn rebound(&self, binding: AttachmentPoint) -> Self {
        Self {
            binding,
            ..self.clone()
        }
    }

    #[inline]
    #[must_use]
    pub fn binding(&self) -> AttachmentPoint {
        self.binding
    }

    #[inline]
    #[must_use]
    pub fn resource(&self) -> &AttachedResource {
        &self.resource
    }

    #[must_use]
    pub fn object_type(&self) -> AttachmentObjectType {
        match self.resource {
            AttachedResource::Texture(_) => AttachmentObjectType::Texture,
            AttachedResource::Renderbuffer(_) => AttachmentObjectType::Renderbuffer,
            AttachedResource::Surface { .. } => AttachmentObjectType::FramebufferDefault,
        }
    }

    /// Handle of the attached object; `0` for surface buffers.
    #[must_use]
    pub fn id(&self) -> Handle {
        match &self.resource {
            AttachedResource::Texture(texture) => texture.id(),
            AttachedResource::Renderbuffer(renderbuffer) => renderbuffer.id(),
            AttachedResource::Surface { .. } => Handle::NONE,
        }
    }

    /// Address of the attached object; distinguishes objects that reused a handle.
    #[must_use]
    pub(crate) fn identity(&self) -> usize {
        match &self.resource {
            AttachedResource::Texture(texture) => Rc::as_ptr(texture.get()).cast::<()>() as usize,
            AttachedResource::Renderbuffer(renderbuffer) => {
                Rc::as_ptr(renderbuffer.get()).cast::<()>() as usize
            }
            AttachedResource::Surface { surface, .. } => Rc::as_ptr(surface).cast::<()>() as usize,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_texture(&self) -> bool {
        matches!(self.resource, AttachedResource::Texture(_))
    }

    #[inline]
    #[must_use]
    pub fn is_renderbuffer(&self) -> bool {
        matches!(self.resource, AttachedResource::Renderbuffer(_))
    }

    #[must_use]
    pub fn as_texture(&self) -> Option<&Texture> {
        match &self.resource {
            AttachedResource::Texture(texture) => Some(&**texture),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_renderbuffer(&self) -> Option<&Renderbuffer> {
        match &self.resource {
            AttachedResource::Renderbuffer(renderbuffer) => Some(&**renderbuffer),
            _ => None,
        }
    }

    /// Same underlying object and, for textures, the same image target.
    ///
    /// Two faces of one cube map are different images; two levels of one 2D
    /// texture are not.
    #[must_use]
    pub fn same_resource(&self, other: &Self) -> bool {
        match (&self.resource, &other.resource) {
            (AttachedResource::Texture(a), AttachedResource::Texture(b)) => {
                a == b
                    && self.image_index.map(|index| index.target)
                        == other.image_index.map(|index| index.target)
            }
            (AttachedResource::Renderbuffer(a), AttachedResource::Renderbuffer(b)) => a == b,
            (
                AttachedResource::Surface { surface: a, aspect: x },
                AttachedResource::Surface { surface: b, aspect: y },
            ) => Rc::ptr_eq(a, b) && x == y,
            _ => false,
        }
    }

    // ========================================================================
    // Texture-only locator fields
    // ========================================================================

    #[must_use]
    pub fn image_index(&self) -> Option<ImageIndex> {
        self.image_index
    }

    #[must_use]
    pub fn mip_level(&self) -> u32 {
        debug_assert!(self.is_texture(), "mip level queried on a non-texture attachment");
        self.image_index.map_or(0, |index| index.level)
    }

    #[must_use]
    pub fn cube_face(&self) -> Option<CubeFace> {
        debug_assert!(self.is_texture(), "cube face queried on a non-texture attachment");
        self.image_index.and_then(|index| index.target.cube_face())
    }

    /// Selected layer; `None` attaches the entire level.
    #[must_use]
    pub fn layer(&self) -> Option<u32> {
        debug_assert!(self.is_texture(), "layer queried on a non-texture attachment");
        self.image_index.and_then(|index| index.layer)
    }

    // ========================================================================
    // Delegated geometry & format
    // ========================================================================

    #[must_use]
    pub fn size(&self) -> Extents {
        match &self.resource {
            AttachedResource::Texture(texture) => self
                .image_index
                .map(|index| texture.attachment_size(&index))
                .unwrap_or_default(),
            AttachedResource::Renderbuffer(renderbuffer) => renderbuffer.size(),
            AttachedResource::Surface { surface, .. } => surface.size(),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.size().width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.size().height
    }

    #[must_use]
    pub fn internal_format(&self) -> Option<InternalFormat> {
        match &self.resource {
            AttachedResource::Texture(texture) => self
                .image_index
                .and_then(|index| texture.attachment_format(&index)),
            AttachedResource::Renderbuffer(renderbuffer) => renderbuffer.internal_format(),
            AttachedResource::Surface { surface, aspect } => match aspect {
                SurfaceAspect::Color => Some(surface.color_format()),
                SurfaceAspect::DepthStencil => surface.depth_stencil_format(),
            },
        }
    }

    /// Format properties; all zero when the image is undefined.
    #[must_use]
    pub fn format_info(&self) -> FormatInfo {
        self.internal_format()
            .map(InternalFormat::info)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn red_size(&self) -> u32 {
        self.format_info().red_bits
    }

    #[must_use]
    pub fn green_size(&self) -> u32 {
        self.format_info().green_bits
    }

    #[must_use]
    pub fn blue_size(&self) -> u32 {
        self.format_info().blue_bits
    }

    #[must_use]
    pub fn alpha_size(&self) -> u32 {
        self.format_info().alpha_bits
    }

    #[must_use]
    pub fn depth_size(&self) -> u32 {
        self.format_info().depth_bits
    }

    #[must_use]
    pub fn stencil_size(&self) -> u32 {
        self.format_info().stencil_bits
    }

    #[must_use]
    pub fn component_type(&self) -> ComponentType {
        self.format_info().component_type
    }

    #[must_use]
    pub fn color_encoding(&self) -> ColorEncoding {
        self.format_info().color_encoding
    }

    /// Sample count; textures are never multisampled.
    #[must_use]
    pub fn samples(&self) -> u32 {
        match &self.resource {
            AttachedResource::Texture(_) => 0,
            AttachedResource::Renderbuffer(renderbuffer) => renderbuffer.samples(),
            AttachedResource::Surface { surface, .. } => surface.samples(),
        }
    }

    /// Storage version of the attached object
    #[must_use]
    pub fn version(&self) -> u64 {
        match &self.resource {
            AttachedResource::Texture(texture) => texture.version(),
            AttachedResource::Renderbuffer(renderbuffer) => renderbuffer.version(),
            AttachedResource::Surface { surface, .. } => surface.version(),
        }
    }

    /// Everything the query layer reports about this attachment.
    #[must_use]
    pub fn info(&self) -> AttachmentInfo {
        let format = self.format_info();
        let (mip_level, cube_face, layer) = if self.is_texture() {
            (self.mip_level(), self.cube_face(), self.layer())
        } else {
            (0, None, None)
        };
        AttachmentInfo {
            object_type: self.object_type(),
            object_name: self.id(),
            mip_level,
            cube_face,
            layer,
            red_size: format.red_bits,
            green_size: format.green_bits,
            blue_size: format.blue_bits,
            alpha_size: format.alpha_bits,
            depth_size: format.depth_bits,
            stencil_size: format.stencil_bits,
            component_type: format.component_type,
            color_encoding: format.color_encoding,
            samples: self.samples(),
        }
    }
}

/// Query result for one binding point.
///
/// The default value describes an empty binding point: type `None`, name 0,
/// every size 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttachmentInfo {
    pub object_type: AttachmentObjectType,
    pub object_name: Handle,
    pub mip_level: u32,
    pub cube_face: Option<CubeFace>,
    pub layer: Option<u32>,
    pub red_size: u32,
    pub green_size: u32,
    pub blue_size: u32,
    pub alpha_size: u32,
    pub depth_size: u32,
    pub stencil_size: u32,
    pub component_type: ComponentType,
    pub color_encoding: ColorEncoding,
    pub samples: u32,
}
