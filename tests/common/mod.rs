//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::rc::Rc;

use tessel::prelude::*;

/// Routes `log` output through the test harness. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn es3() -> ContextState {
    ContextState::default()
}

pub fn es2(extensions: Extensions) -> ContextState {
    ContextState::new(ContextSettings {
        client_version: Version::new(2, 0),
        extensions,
        ..ContextSettings::default()
    })
}

pub fn renderbuffer(id: u32, format: InternalFormat, width: u32, height: u32) -> Rc<Renderbuffer> {
    let renderbuffer = Renderbuffer::new(Handle::new(id));
    renderbuffer.set_storage(format, width, height);
    Rc::new(renderbuffer)
}

pub fn texture_2d(id: u32, format: InternalFormat, width: u32, height: u32) -> Rc<Texture> {
    let texture = Texture::new(Handle::new(id), TextureType::Texture2D);
    texture
        .set_image(TextureTarget::Texture2D, 0, format, Extents::new(width, height, 1))
        .expect("valid 2D image");
    Rc::new(texture)
}
