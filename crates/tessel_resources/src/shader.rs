use std::cell::RefCell;

use serde::{Deserialize, Serialize};
use tessel_core::{ChangeTracker, Handle, RefCount, Resource};

/// Pipeline stage a shader belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderType {
    Vertex,
    Fragment,
    Compute,
}

/// Shader object. Only the source text is tracked; compilation happens elsewhere.
///
/// Programs hold attached shaders through a `ResourceRef`, so a deleted shader
/// survives until it is detached from every program.
#[derive(Debug)]
pub struct Shader {
    id: Handle,
    ref_count: RefCount,
    shader_type: ShaderType,
    source: RefCell<String>,
    tracker: ChangeTracker,
}

impl Shader {
    #[must_use]
    pub fn new(id: Handle, shader_type: ShaderType) -> Self {
        Self {
            id,
            ref_count: RefCount::new(),
            shader_type,
            source: RefCell::new(String::new()),
            tracker: ChangeTracker::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn shader_type(&self) -> ShaderType {
        self.shader_type
    }

    pub fn set_source(&self, source: impl Into<String>) {
        *self.source.borrow_mut() = source.into();
        self.tracker.changed();
    }

    #[must_use]
    pub fn source(&self) -> String {
        self.source.borrow().clone()
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.tracker.version()
    }

    /// Deleted by the client but still attached to a program
    #[must_use]
    pub fn is_flagged_for_deletion(&self) -> bool {
        self.ref_count.is_flagged_for_deletion()
    }
}

impl Resource for Shader {
    const KIND: &'static str = "shader";

    fn id(&self) -> Handle {
        self.id
    }

    fn ref_count(&self) -> &RefCount {
        &self.ref_count
    }
}
