//! Program objects: one attached shader per stage.

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;
use tessel_core::{Handle, RefCount, Resource, ResourceRef, Result, TesselError};

use crate::shader::{Shader, ShaderType};

#[derive(Debug)]
pub struct Program {
    id: Handle,
    ref_count: RefCount,
    shaders: RefCell<SmallVec<[ResourceRef<Shader>; 3]>>,
    label: RefCell<String>,
}

impl Program {
    #[must_use]
    pub fn new(id: Handle) -> Self {
        Self {
            id,
            ref_count: RefCount::new(),
            shaders: RefCell::new(SmallVec::new()),
            label: RefCell::new(String::new()),
        }
    }

    /// Attaches `shader` to its stage.
    ///
    /// Fails if the shader is already attached or its stage is occupied.
    pub fn attach_shader(&self, shader: &Rc<Shader>) -> Result<()> {
        let mut shaders = self.shaders.borrow_mut();
        if let Some(attached) = shaders
            .iter()
            .find(|attached| attached.shader_type() == shader.shader_type())
        {
            return Err(TesselError::InvalidOperation(format!(
                "program {} already has {:?} shader {}",
                self.id,
                shader.shader_type(),
                attached.id()
            )));
        }
        shaders.push(ResourceRef::new(Rc::clone(shader)));
        Ok(())
    }

    /// Detaches the shader named `shader`, releasing the program's hold on it.
    pub fn detach_shader(&self, shader: Handle) -> Result<()> {
        let mut shaders = self.shaders.borrow_mut();
        let Some(position) = shaders.iter().position(|attached| attached.id() == shader) else {
            return Err(TesselError::InvalidOperation(format!(
                "shader {shader} is not attached to program {}",
                self.id
            )));
        };
        shaders.remove(position);
        Ok(())
    }

    #[must_use]
    pub fn attached_shader(&self, stage: ShaderType) -> Option<Rc<Shader>> {
        self.shaders
            .borrow()
            .iter()
            .find(|attached| attached.shader_type() == stage)
            .map(|attached| Rc::clone(attached.get()))
    }

    /// Handles of the attached shaders in attach order.
    #[must_use]
    pub fn attached_shaders(&self) -> SmallVec<[Handle; 3]> {
        self.shaders.borrow().iter().map(ResourceRef::id).collect()
    }

    pub fn set_label(&self, label: impl Into<String>) {
        *self.label.borrow_mut() = label.into();
    }

    #[must_use]
    pub fn label(&self) -> String {
        self.label.borrow().clone()
    }
}

impl Resource for Program {
    const KIND: &'static str = "program";

    fn id(&self) -> Handle {
        self.id
    }

    fn ref_count(&self) -> &RefCount {
        &self.ref_count
    }

    fn on_destroy(&self) {
        self.shaders.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shader_per_stage() {
        let program = Program::new(Handle::new(1));
        let vertex = Rc::new(Shader::new(Handle::new(2), ShaderType::Vertex));
        let other_vertex = Rc::new(Shader::new(Handle::new(3), ShaderType::Vertex));

        program.attach_shader(&vertex).unwrap();
        assert!(program.attach_shader(&vertex).is_err());
        assert!(program.attach_shader(&other_vertex).is_err());
        assert_eq!(vertex.ref_count().count(), 1);
        assert_eq!(other_vertex.ref_count().count(), 0);
    }

    #[test]
    fn test_detach_releases_hold() {
        let program = Program::new(Handle::new(1));
        let fragment = Rc::new(Shader::new(Handle::new(2), ShaderType::Fragment));
        program.attach_shader(&fragment).unwrap();

        program.detach_shader(Handle::new(2)).unwrap();
        assert_eq!(fragment.ref_count().count(), 0);
        assert!(program.detach_shader(Handle::new(2)).is_err());
        assert!(program.attached_shader(ShaderType::Fragment).is_none());
    }
}
