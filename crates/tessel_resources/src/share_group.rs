//! Share Group
//!
//! The set of object tables shared by every context of one share group, with
//! one [`ResourceManager`] per kind.
//!
//! Each kind's delete entry point applies the policy that kind needs:
//!
//! | Kind                                        | Policy                       |
//! |---------------------------------------------|------------------------------|
//! | buffer, texture, renderbuffer, sampler      | deferred while referenced    |
//! | shader, program                             | deferred while referenced    |
//! | framebuffer, path                           | immediate                    |
//!
//! "Referenced" means held through a [`tessel_core::ResourceRef`]: a
//! framebuffer attachment, a program stage, or a binding owned by the caller.
//! Deferred objects are destroyed by the next mutating call on their manager
//! after the last holder lets go, or explicitly through [`ShareGroup::reap_released`].

use std::rc::Rc;

use tessel_core::{Handle, ResourceManager, Result, defer_while_referenced, destroy_now};

use crate::buffer::Buffer;
use crate::framebuffer::Framebuffer;
use crate::image_index::TextureType;
use crate::path::Path;
use crate::program::Program;
use crate::renderbuffer::Renderbuffer;
use crate::sampler::Sampler;
use crate::shader::{Shader, ShaderType};
use crate::surface::Surface;
use crate::texture::Texture;

// Field order is teardown order: framebuffers and programs release their
// holds before the kinds they hold are torn down.
#[derive(Default)]
pub struct ShareGroup {
    framebuffers: ResourceManager<Framebuffer>,
    programs: ResourceManager<Program>,
    shaders: ResourceManager<Shader>,
    textures: ResourceManager<Texture>,
    renderbuffers: ResourceManager<Renderbuffer>,
    samplers: ResourceManager<Sampler>,
    buffers: ResourceManager<Buffer>,
    paths: ResourceManager<Path>,
}

impl ShareGroup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroys every flagged object whose last holder is gone, in all tables.
    ///
    /// Holder tables are reaped first, so objects they release in the process
    /// are reaped in the same call.
    pub fn reap_released(&mut self) -> usize {
        let reaped = self.framebuffers.reap_released()
            + self.programs.reap_released()
            + self.shaders.reap_released()
            + self.textures.reap_released()
            + self.renderbuffers.reap_released()
            + self.samplers.reap_released()
            + self.buffers.reap_released()
            + self.paths.reap_released();
        if reaped > 0 {
            log::debug!("Share group reaped {reaped} object(s)");
        }
        reaped
    }

    // ========================================================================
    // Buffers
    // ========================================================================

    pub fn create_buffer(&mut self) -> Result<Handle> {
        self.buffers.allocate_empty_object()
    }

    pub fn check_buffer_allocation(&mut self, handle: Handle) -> Result<Option<Rc<Buffer>>> {
        self.buffers
            .check_object_allocation(handle, |id| Some(Buffer::new(id)))
    }

    pub fn delete_buffer(&mut self, handle: Handle) {
        self.buffers.delete_object(handle, defer_while_referenced);
    }

    #[must_use]
    pub fn get_buffer(&self, handle: Handle) -> Option<&Rc<Buffer>> {
        self.buffers.get_object(handle)
    }

    #[must_use]
    pub fn is_buffer_generated(&self, handle: Handle) -> bool {
        self.buffers.is_generated(handle)
    }

    // ========================================================================
    // Textures
    // ========================================================================

    pub fn create_texture(&mut self) -> Result<Handle> {
        self.textures.allocate_empty_object()
    }

    /// Resolves `handle` on first bind, creating a texture of `texture_type`.
    pub fn check_texture_allocation(
        &mut self,
        handle: Handle,
        texture_type: TextureType,
    ) -> Result<Option<Rc<Texture>>> {
        self.textures
            .check_object_allocation(handle, |id| Some(Texture::new(id, texture_type)))
    }

    pub fn delete_texture(&mut self, handle: Handle) {
        self.textures.delete_object(handle, defer_while_referenced);
    }

    #[must_use]
    pub fn get_texture(&self, handle: Handle) -> Option<&Rc<Texture>> {
        self.textures.get_object(handle)
    }

    #[must_use]
    pub fn is_texture_generated(&self, handle: Handle) -> bool {
        self.textures.is_generated(handle)
    }

    // ========================================================================
    // Renderbuffers
    // ========================================================================

    pub fn create_renderbuffer(&mut self) -> Result<Handle> {
        self.renderbuffers.allocate_empty_object()
    }

    pub fn check_renderbuffer_allocation(
        &mut self,
        handle: Handle,
    ) -> Result<Option<Rc<Renderbuffer>>> {
        self.renderbuffers
            .check_object_allocation(handle, |id| Some(Renderbuffer::new(id)))
    }

    pub fn delete_renderbuffer(&mut self, handle: Handle) {
        self.renderbuffers
            .delete_object(handle, defer_while_referenced);
    }

    #[must_use]
    pub fn get_renderbuffer(&self, handle: Handle) -> Option<&Rc<Renderbuffer>> {
        self.renderbuffers.get_object(handle)
    }

    #[must_use]
    pub fn is_renderbuffer_generated(&self, handle: Handle) -> bool {
        self.renderbuffers.is_generated(handle)
    }

    // ========================================================================
    // Samplers
    // ========================================================================

    pub fn create_sampler(&mut self) -> Result<Handle> {
        self.samplers.allocate_empty_object()
    }

    pub fn check_sampler_allocation(&mut self, handle: Handle) -> Result<Option<Rc<Sampler>>> {
        self.samplers
            .check_object_allocation(handle, |id| Some(Sampler::new(id)))
    }

    pub fn delete_sampler(&mut self, handle: Handle) {
        self.samplers.delete_object(handle, defer_while_referenced);
    }

    #[must_use]
    pub fn get_sampler(&self, handle: Handle) -> Option<&Rc<Sampler>> {
        self.samplers.get_object(handle)
    }

    /// Unlike the other kinds, `0` is not a sampler.
    #[must_use]
    pub fn is_sampler(&self, handle: Handle) -> bool {
        handle.is_some() && self.samplers.is_generated(handle)
    }

    // ========================================================================
    // Shaders & programs
    // ========================================================================

    /// Shaders are constructed together with their handle.
    pub fn create_shader(&mut self, shader_type: ShaderType) -> Result<Handle> {
        self.shaders
            .insert_object(|id| Some(Shader::new(id, shader_type)))
    }

    /// A shader attached to a program survives until it is detached.
    pub fn delete_shader(&mut self, handle: Handle) {
        self.shaders.delete_object(handle, defer_while_referenced);
    }

    #[must_use]
    pub fn get_shader(&self, handle: Handle) -> Option<&Rc<Shader>> {
        self.shaders.get_object(handle)
    }

    pub fn create_program(&mut self) -> Result<Handle> {
        self.programs.insert_object(|id| Some(Program::new(id)))
    }

    /// Destroying a program detaches its shaders, which may release them.
    pub fn delete_program(&mut self, handle: Handle) {
        self.programs.delete_object(handle, defer_while_referenced);
        self.shaders.reap_released();
    }

    #[must_use]
    pub fn get_program(&self, handle: Handle) -> Option<&Rc<Program>> {
        self.programs.get_object(handle)
    }

    // ========================================================================
    // Framebuffers
    // ========================================================================

    pub fn create_framebuffer(&mut self) -> Result<Handle> {
        self.framebuffers.allocate_empty_object()
    }

    pub fn check_framebuffer_allocation(
        &mut self,
        handle: Handle,
    ) -> Result<Option<Rc<Framebuffer>>> {
        self.framebuffers
            .check_object_allocation(handle, |id| Some(Framebuffer::new(id)))
    }

    /// Framebuffers are never shared; deletion releases their attachments at once.
    pub fn delete_framebuffer(&mut self, handle: Handle) {
        self.framebuffers.delete_object(handle, destroy_now);
        self.textures.reap_released();
        self.renderbuffers.reap_released();
    }

    /// `Handle::NONE` names the default framebuffer.
    #[must_use]
    pub fn get_framebuffer(&self, handle: Handle) -> Option<&Rc<Framebuffer>> {
        self.framebuffers.get_object_or_default(handle)
    }

    #[must_use]
    pub fn is_framebuffer_generated(&self, handle: Handle) -> bool {
        self.framebuffers.is_generated(handle)
    }

    /// Installs the window-system framebuffer for `surface`, or removes it.
    pub fn set_default_framebuffer(&mut self, surface: Option<&Rc<Surface>>) {
        let framebuffer = surface.map(|surface| Rc::new(Framebuffer::new_default(surface)));
        self.framebuffers.set_default_object(framebuffer);
    }

    // ========================================================================
    // Paths
    // ========================================================================

    /// Creates `range` paths with contiguous handles; returns the first.
    pub fn create_paths(&mut self, range: u32) -> Result<Handle> {
        self.paths
            .insert_object_range(range, |id| Some(Path::new(id)))
    }

    pub fn delete_paths(&mut self, first: Handle, range: u32) {
        self.paths.delete_object_range(first, range);
    }

    #[must_use]
    pub fn get_path(&self, handle: Handle) -> Option<&Rc<Path>> {
        self.paths.get_object(handle)
    }

    #[must_use]
    pub fn has_path(&self, handle: Handle) -> bool {
        handle.is_some() && self.paths.is_generated(handle)
    }

    // ========================================================================
    // Tables
    // ========================================================================

    #[must_use]
    pub fn buffers(&self) -> &ResourceManager<Buffer> {
        &self.buffers
    }

    #[must_use]
    pub fn textures(&self) -> &ResourceManager<Texture> {
        &self.textures
    }

    #[must_use]
    pub fn renderbuffers(&self) -> &ResourceManager<Renderbuffer> {
        &self.renderbuffers
    }

    #[must_use]
    pub fn samplers(&self) -> &ResourceManager<Sampler> {
        &self.samplers
    }

    #[must_use]
    pub fn shaders(&self) -> &ResourceManager<Shader> {
        &self.shaders
    }

    #[must_use]
    pub fn programs(&self) -> &ResourceManager<Program> {
        &self.programs
    }

    #[must_use]
    pub fn framebuffers(&self) -> &ResourceManager<Framebuffer> {
        &self.framebuffers
    }

    #[must_use]
    pub fn paths(&self) -> &ResourceManager<Path> {
        &self.paths
    }
}
