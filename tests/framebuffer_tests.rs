//! Framebuffer Completeness Tests
//!
//! Tests for:
//! - The completeness verdict: missing, dimensions, multisample, unsupported
//!   combinations, per-attachment format and level rules
//! - The default framebuffer
//! - Status caching and its invalidation
//! - Attach / detach bookkeeping, draw and read buffers, attachment queries

mod common;

use std::rc::Rc;

use tessel::prelude::*;

fn framebuffer() -> Framebuffer {
    Framebuffer::new(Handle::new(1))
}

// ============================================================================
// Verdict
// ============================================================================

#[test]
fn no_attachments_is_missing_attachment() {
    let ctx = common::es3();
    assert_eq!(
        framebuffer().check_status(&ctx),
        FramebufferStatus::IncompleteMissingAttachment
    );
}

#[test]
fn single_color_attachment_is_complete() -> anyhow::Result<()> {
    let ctx = common::es3();
    let fbo = framebuffer();
    let color = common::renderbuffer(1, InternalFormat::Rgba8, 64, 64);

    fbo.attach_renderbuffer(AttachmentPoint::Color(0), &color)?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Complete);
    Ok(())
}

#[test]
fn color_size_mismatch_is_incomplete_dimensions() -> anyhow::Result<()> {
    let ctx = common::es3();
    let fbo = framebuffer();
    let large = common::renderbuffer(1, InternalFormat::Rgba8, 64, 64);
    let small = common::renderbuffer(2, InternalFormat::Rgba8, 32, 32);

    fbo.attach_renderbuffer(AttachmentPoint::Color(0), &large)?;
    fbo.attach_renderbuffer(AttachmentPoint::Color(1), &small)?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::IncompleteDimensions);
    Ok(())
}

#[test]
fn separate_depth_and_stencil_objects_are_unsupported() -> anyhow::Result<()> {
    let ctx = common::es3();
    let fbo = framebuffer();
    let depth = common::renderbuffer(1, InternalFormat::DepthComponent16, 64, 64);
    let stencil = common::renderbuffer(2, InternalFormat::StencilIndex8, 64, 64);

    fbo.attach_renderbuffer(AttachmentPoint::Depth, &depth)?;
    fbo.attach_renderbuffer(AttachmentPoint::Stencil, &stencil)?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Unsupported);
    Ok(())
}

#[test]
fn same_renderbuffer_in_two_color_slots_is_unsupported() -> anyhow::Result<()> {
    let ctx = common::es3();
    let fbo = framebuffer();
    let color = common::renderbuffer(1, InternalFormat::Rgba8, 64, 64);

    fbo.attach_renderbuffer(AttachmentPoint::Color(0), &color)?;
    fbo.attach_renderbuffer(AttachmentPoint::Color(1), &color)?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Unsupported);
    Ok(())
}

#[test]
fn sample_count_mismatch_is_incomplete_multisample() -> anyhow::Result<()> {
    let ctx = common::es3();
    let fbo = framebuffer();
    let multisampled = Rc::new(Renderbuffer::new(Handle::new(1)));
    multisampled.set_storage_multisample(4, InternalFormat::Rgba8, 64, 64, &ctx)?;
    let single = common::renderbuffer(2, InternalFormat::Rgba8, 64, 64);

    fbo.attach_renderbuffer(AttachmentPoint::Color(0), &multisampled)?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Complete);
    assert_eq!(fbo.samples(&ctx), 4);

    fbo.attach_renderbuffer(AttachmentPoint::Color(1), &single)?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::IncompleteMultisample);
    assert_eq!(fbo.samples(&ctx), 0, "incomplete framebuffers report no samples");
    Ok(())
}

#[test]
fn depth_size_must_match_color() -> anyhow::Result<()> {
    let ctx = common::es3();
    let fbo = framebuffer();
    let color = common::renderbuffer(1, InternalFormat::Rgba8, 64, 64);
    let depth = common::renderbuffer(2, InternalFormat::DepthComponent16, 32, 64);

    fbo.attach_renderbuffer(AttachmentPoint::Color(0), &color)?;
    fbo.attach_renderbuffer(AttachmentPoint::Depth, &depth)?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::IncompleteDimensions);
    Ok(())
}

#[test]
fn color_bit_depth_must_agree_before_3_0() -> anyhow::Result<()> {
    let fbo = framebuffer();
    let rgba = common::renderbuffer(1, InternalFormat::Rgba8, 16, 16);
    let rgb565 = common::renderbuffer(2, InternalFormat::Rgb565, 16, 16);
    fbo.attach_renderbuffer(AttachmentPoint::Color(0), &rgba)?;
    fbo.attach_renderbuffer(AttachmentPoint::Color(1), &rgb565)?;

    let es2 = common::es2(Extensions::default());
    assert_eq!(fbo.check_status(&es2), FramebufferStatus::Unsupported);
    assert_eq!(fbo.check_status(&common::es3()), FramebufferStatus::Complete);
    Ok(())
}

#[test]
fn zero_sized_attachment_is_incomplete() -> anyhow::Result<()> {
    let ctx = common::es3();
    let fbo = framebuffer();
    let empty = Rc::new(Renderbuffer::new(Handle::new(1)));

    fbo.attach_renderbuffer(AttachmentPoint::Color(0), &empty)?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::IncompleteAttachment);
    Ok(())
}

#[test]
fn float_renderbuffer_needs_color_buffer_float() -> anyhow::Result<()> {
    let fbo = framebuffer();
    let float = common::renderbuffer(1, InternalFormat::Rgba16F, 16, 16);
    fbo.attach_renderbuffer(AttachmentPoint::Color(0), &float)?;

    assert_eq!(
        fbo.check_status(&common::es3()),
        FramebufferStatus::IncompleteAttachment
    );

    let ctx = ContextState::new(ContextSettings {
        extensions: Extensions {
            color_buffer_float: true,
            ..Extensions::default()
        },
        ..ContextSettings::default()
    });
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Complete);
    Ok(())
}

#[test]
fn depth_format_in_color_slot_is_incomplete() -> anyhow::Result<()> {
    let ctx = common::es3();

    let renderbuffer_fbo = framebuffer();
    let depth = common::renderbuffer(1, InternalFormat::DepthComponent16, 16, 16);
    renderbuffer_fbo.attach_renderbuffer(AttachmentPoint::Color(0), &depth)?;
    assert_eq!(
        renderbuffer_fbo.check_status(&ctx),
        FramebufferStatus::IncompleteAttachment
    );

    let texture_fbo = framebuffer();
    let depth_texture = common::texture_2d(1, InternalFormat::DepthComponent24, 16, 16);
    texture_fbo.attach_texture(AttachmentPoint::Color(0), &depth_texture, ImageIndex::texture_2d(0))?;
    assert_eq!(
        texture_fbo.check_status(&ctx),
        FramebufferStatus::IncompleteAttachment
    );
    Ok(())
}

#[test]
fn non_renderable_color_texture_is_unsupported() -> anyhow::Result<()> {
    let ctx = common::es3();
    let fbo = framebuffer();
    let luminance = common::texture_2d(1, InternalFormat::Luminance8, 16, 16);

    fbo.attach_texture(AttachmentPoint::Color(0), &luminance, ImageIndex::texture_2d(0))?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Unsupported);
    Ok(())
}

#[test]
fn stencil_attachment_needs_stencil_bits() -> anyhow::Result<()> {
    let ctx = common::es3();
    let fbo = framebuffer();
    let depth_only = common::renderbuffer(1, InternalFormat::DepthComponent16, 16, 16);

    fbo.attach_renderbuffer(AttachmentPoint::DepthStencil, &depth_only)?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::IncompleteAttachment);
    Ok(())
}

#[test]
fn packed_depth_stencil_is_complete() -> anyhow::Result<()> {
    let ctx = common::es3();
    let fbo = framebuffer();
    let color = common::renderbuffer(1, InternalFormat::Rgba8, 16, 16);
    let packed = common::renderbuffer(2, InternalFormat::Depth24Stencil8, 16, 16);

    fbo.attach_renderbuffer(AttachmentPoint::Color(0), &color)?;
    fbo.attach_renderbuffer(AttachmentPoint::DepthStencil, &packed)?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Complete);
    assert!(fbo.depth_stencil_attachment().is_some());
    assert!(fbo.has_stencil());
    assert_eq!(packed.ref_count().count(), 2, "held by both the depth and stencil slots");
    Ok(())
}

#[test]
fn depth_texture_needs_support_before_3_0() -> anyhow::Result<()> {
    let fbo = framebuffer();
    let depth = common::texture_2d(1, InternalFormat::DepthComponent16, 16, 16);
    fbo.attach_texture(AttachmentPoint::Depth, &depth, ImageIndex::texture_2d(0))?;

    let bare = common::es2(Extensions::default());
    assert_eq!(fbo.check_status(&bare), FramebufferStatus::IncompleteAttachment);

    let with_depth_textures = common::es2(Extensions {
        depth_textures: true,
        ..Extensions::default()
    });
    assert_eq!(fbo.check_status(&with_depth_textures), FramebufferStatus::Complete);
    Ok(())
}

#[test]
fn non_zero_level_needs_render_mipmap_before_3_0() -> anyhow::Result<()> {
    let texture = Rc::new(Texture::new(Handle::new(1), TextureType::Texture2D));
    texture.set_image(TextureTarget::Texture2D, 0, InternalFormat::Rgba8, Extents::new(16, 16, 1))?;
    texture.generate_mipmap()?;

    let fbo = framebuffer();
    fbo.attach_texture(AttachmentPoint::Color(0), &texture, ImageIndex::texture_2d(1))?;

    let bare = common::es2(Extensions::default());
    assert_eq!(fbo.check_status(&bare), FramebufferStatus::IncompleteAttachment);

    let render_mipmap = common::es2(Extensions {
        fbo_render_mipmap: true,
        ..Extensions::default()
    });
    assert_eq!(fbo.check_status(&render_mipmap), FramebufferStatus::Complete);
    assert_eq!(fbo.check_status(&common::es3()), FramebufferStatus::Complete);
    Ok(())
}

#[test]
fn attached_layer_must_exist() -> anyhow::Result<()> {
    let ctx = common::es3();
    let array = Rc::new(Texture::new(Handle::new(1), TextureType::Texture2DArray));
    array.set_storage(1, InternalFormat::Rgba8, Extents::new(8, 8, 2))?;

    let fbo = framebuffer();
    fbo.attach_texture(AttachmentPoint::Color(0), &array, ImageIndex::texture_2d_array(0, Some(1)))?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Complete);

    fbo.attach_texture(AttachmentPoint::Color(0), &array, ImageIndex::texture_2d_array(0, Some(2)))?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::IncompleteAttachment);
    Ok(())
}

#[test]
fn cube_face_attachment_uses_face_size() -> anyhow::Result<()> {
    let ctx = common::es3();
    let cube = Rc::new(Texture::new(Handle::new(1), TextureType::CubeMap));
    cube.set_storage(1, InternalFormat::Rgba8, Extents::new(32, 32, 1))?;
    let color = common::renderbuffer(1, InternalFormat::Rgba8, 32, 32);

    let fbo = framebuffer();
    fbo.attach_texture(
        AttachmentPoint::Color(0),
        &cube,
        ImageIndex::texture_cube(CubeFace::NegativeZ, 0),
    )?;
    fbo.attach_renderbuffer(AttachmentPoint::Color(1), &color)?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Complete);

    let info = fbo.attachment_info(AttachmentPoint::Color(0));
    assert_eq!(info.cube_face, Some(CubeFace::NegativeZ));
    Ok(())
}

#[test]
fn two_faces_of_one_cube_map_are_distinct_images() -> anyhow::Result<()> {
    let ctx = common::es3();
    let cube = Rc::new(Texture::new(Handle::new(1), TextureType::CubeMap));
    cube.set_storage(1, InternalFormat::Rgba8, Extents::new(32, 32, 1))?;

    let fbo = framebuffer();
    fbo.attach_texture(
        AttachmentPoint::Color(0),
        &cube,
        ImageIndex::texture_cube(CubeFace::PositiveX, 0),
    )?;
    fbo.attach_texture(
        AttachmentPoint::Color(1),
        &cube,
        ImageIndex::texture_cube(CubeFace::NegativeX, 0),
    )?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Complete);

    fbo.attach_texture(
        AttachmentPoint::Color(1),
        &cube,
        ImageIndex::texture_cube(CubeFace::PositiveX, 0),
    )?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Unsupported);
    Ok(())
}

// ============================================================================
// Default framebuffer
// ============================================================================

#[test]
fn default_framebuffer_is_always_complete() {
    let ctx = common::es2(Extensions::default());
    let surface = Rc::new(
        Surface::new(640, 480, InternalFormat::Rgba8)
            .with_depth_stencil(InternalFormat::Depth24Stencil8)
            .with_samples(4),
    );
    let fbo = Framebuffer::new_default(&surface);

    assert!(fbo.is_default());
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Complete);
    assert_eq!(fbo.samples(&ctx), 4);
    assert!(fbo.has_stencil());
    assert_eq!(fbo.read_buffer(), DrawBuffer::Back);

    let info = fbo.attachment_info(AttachmentPoint::Color(0));
    assert_eq!(info.object_type, AttachmentObjectType::FramebufferDefault);
    assert_eq!(info.object_name, Handle::NONE);
    assert_eq!(info.red_size, 8);
}

#[test]
fn default_framebuffer_rejects_attachments() {
    let surface = Rc::new(Surface::new(64, 64, InternalFormat::Rgba8));
    let fbo = Framebuffer::new_default(&surface);
    let color = common::renderbuffer(1, InternalFormat::Rgba8, 64, 64);

    assert!(matches!(
        fbo.attach_renderbuffer(AttachmentPoint::Color(0), &color),
        Err(TesselError::InvalidOperation(_))
    ));
    assert!(fbo.set_read_buffer(DrawBuffer::ColorAttachment(0)).is_err());
    assert!(fbo.set_draw_buffers(&[DrawBuffer::None]).is_ok());
    assert!(fbo.stencil_attachment().is_none(), "the surface has no depth-stencil buffer");
}

// ============================================================================
// Status cache
// ============================================================================

#[test]
fn status_is_cached_until_an_input_changes() -> anyhow::Result<()> {
    common::init_logging();
    let ctx = common::es3();
    let fbo = framebuffer();
    let first = common::renderbuffer(1, InternalFormat::Rgba8, 64, 64);
    let second = common::renderbuffer(2, InternalFormat::Rgba8, 64, 64);
    fbo.attach_renderbuffer(AttachmentPoint::Color(0), &first)?;
    fbo.attach_renderbuffer(AttachmentPoint::Color(1), &second)?;

    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Complete);
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Complete);
    assert_eq!(fbo.status_computations(), 1);

    // Storage change of an attached object
    second.set_storage(InternalFormat::Rgba8, 32, 32);
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::IncompleteDimensions);
    assert_eq!(fbo.status_computations(), 2);

    // Detach
    fbo.detach(AttachmentPoint::Color(1))?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Complete);
    assert_eq!(fbo.status_computations(), 3);
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Complete);
    assert_eq!(fbo.status_computations(), 3);
    Ok(())
}

#[test]
fn capability_change_invalidates_the_status() -> anyhow::Result<()> {
    let mut ctx = common::es3();
    let fbo = framebuffer();
    let color = common::renderbuffer(1, InternalFormat::Rgba8, 64, 64);
    fbo.attach_renderbuffer(AttachmentPoint::Color(0), &color)?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Complete);

    ctx.set_texture_caps(InternalFormat::Rgba8, TextureCaps::TEXTURABLE);
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::IncompleteAttachment);
    assert_eq!(fbo.status_computations(), 2);
    Ok(())
}

#[test]
fn texture_image_change_invalidates_the_status() -> anyhow::Result<()> {
    let ctx = common::es3();
    let fbo = framebuffer();
    let texture = common::texture_2d(1, InternalFormat::Rgba8, 16, 16);
    fbo.attach_texture(AttachmentPoint::Color(0), &texture, ImageIndex::texture_2d(0))?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Complete);

    texture.set_image(TextureTarget::Texture2D, 0, InternalFormat::Rgba8, Extents::new(0, 0, 1))?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::IncompleteAttachment);
    Ok(())
}

#[test]
fn rebinding_to_a_new_object_recomputes_the_status() -> anyhow::Result<()> {
    let ctx = common::es3();
    let fbo = framebuffer();
    let first = common::texture_2d(1, InternalFormat::Rgba8, 64, 64);
    fbo.attach_texture(AttachmentPoint::Color(0), &first, ImageIndex::texture_2d(0))?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::Complete);
    assert_eq!(fbo.status_computations(), 1);

    fbo.detach(AttachmentPoint::Color(0))?;
    drop(first);

    // Same id, fresh object, which may land at the dropped one's address
    let second = Rc::new(Texture::new(Handle::new(1), TextureType::Texture2D));
    second.set_image(TextureTarget::Texture2D, 0, InternalFormat::Rgba8, Extents::new(0, 0, 1))?;
    fbo.attach_texture(AttachmentPoint::Color(0), &second, ImageIndex::texture_2d(0))?;
    assert_eq!(fbo.check_status(&ctx), FramebufferStatus::IncompleteAttachment);
    assert_eq!(fbo.status_computations(), 2);
    Ok(())
}

// ============================================================================
// Attachment bookkeeping
// ============================================================================

#[test]
fn attachments_hold_their_objects() -> anyhow::Result<()> {
    let fbo = framebuffer();
    let color = common::renderbuffer(1, InternalFormat::Rgba8, 8, 8);

    fbo.attach_renderbuffer(AttachmentPoint::Color(0), &color)?;
    assert_eq!(color.ref_count().count(), 1);

    // Rebinding the same object keeps exactly one hold
    fbo.attach_renderbuffer(AttachmentPoint::Color(0), &color)?;
    assert_eq!(color.ref_count().count(), 1);

    fbo.detach(AttachmentPoint::Color(0))?;
    assert_eq!(color.ref_count().count(), 0);
    Ok(())
}

#[test]
fn detach_by_handle_respects_object_kind() -> anyhow::Result<()> {
    let fbo = framebuffer();
    let texture = common::texture_2d(1, InternalFormat::Rgba8, 8, 8);
    let renderbuffer = common::renderbuffer(1, InternalFormat::Rgba8, 8, 8);
    fbo.attach_texture(AttachmentPoint::Color(0), &texture, ImageIndex::texture_2d(0))?;
    fbo.attach_renderbuffer(AttachmentPoint::Color(1), &renderbuffer)?;

    fbo.detach_renderbuffer(Handle::new(1));
    assert!(fbo.color_attachment(0).is_some(), "texture #1 is not renderbuffer #1");
    assert!(fbo.color_attachment(1).is_none());

    fbo.detach_texture(Handle::new(1));
    assert!(fbo.color_attachment(0).is_none());
    assert_eq!(texture.ref_count().count(), 0);
    assert_eq!(renderbuffer.ref_count().count(), 0);
    Ok(())
}

#[test]
fn attach_validates_the_binding_point_and_index() {
    let fbo = framebuffer();
    let texture = common::texture_2d(1, InternalFormat::Rgba8, 8, 8);
    let color = common::renderbuffer(1, InternalFormat::Rgba8, 8, 8);

    assert!(matches!(
        fbo.attach_renderbuffer(AttachmentPoint::Color(8), &color),
        Err(TesselError::InvalidValue(_))
    ));
    assert!(matches!(
        fbo.attach_texture(
            AttachmentPoint::Color(0),
            &texture,
            ImageIndex::texture_cube(CubeFace::PositiveX, 0)
        ),
        Err(TesselError::InvalidOperation(_))
    ));
    assert_eq!(color.ref_count().count(), 0, "rejected attachments hold nothing");
}

#[test]
fn attachment_info_describes_the_binding() -> anyhow::Result<()> {
    let fbo = framebuffer();
    let texture = Rc::new(Texture::new(Handle::new(7), TextureType::Texture2D));
    texture.set_storage(3, InternalFormat::Rgb565, Extents::new(16, 16, 1))?;
    fbo.attach_texture(AttachmentPoint::Color(2), &texture, ImageIndex::texture_2d(1))?;

    let info = fbo.attachment_info(AttachmentPoint::Color(2));
    assert_eq!(info.object_type, AttachmentObjectType::Texture);
    assert_eq!(info.object_name, Handle::new(7));
    assert_eq!(info.mip_level, 1);
    assert_eq!((info.red_size, info.green_size, info.blue_size), (5, 6, 5));
    assert_eq!(info.alpha_size, 0);

    let empty = fbo.attachment_info(AttachmentPoint::Depth);
    assert_eq!(empty, AttachmentInfo::default());
    assert_eq!(empty.object_type, AttachmentObjectType::None);

    let attachment = fbo.color_attachment(2).expect("attached");
    assert_eq!((attachment.width(), attachment.height()), (8, 8));
    Ok(())
}

// ============================================================================
// Draw & read buffers
// ============================================================================

#[test]
fn draw_buffers_enable_color_slots() -> anyhow::Result<()> {
    let fbo = framebuffer();
    let first = common::renderbuffer(1, InternalFormat::Rgba8, 8, 8);
    let second = common::renderbuffer(2, InternalFormat::Rgba8, 8, 8);
    fbo.attach_renderbuffer(AttachmentPoint::Color(0), &first)?;
    fbo.attach_renderbuffer(AttachmentPoint::Color(1), &second)?;

    // Initially only slot 0 is drawn to
    assert!(fbo.is_enabled_color_attachment(0));
    assert!(!fbo.is_enabled_color_attachment(1));
    assert!(!fbo.using_extended_draw_buffers());

    fbo.set_draw_buffers(&[DrawBuffer::None, DrawBuffer::ColorAttachment(1)])?;
    assert!(!fbo.is_enabled_color_attachment(0));
    assert!(fbo.is_enabled_color_attachment(1));
    assert!(fbo.using_extended_draw_buffers());
    assert_eq!(fbo.draw_buffer_state(1), DrawBuffer::ColorAttachment(1));
    assert_eq!(fbo.draw_buffer_state(2), DrawBuffer::None);

    fbo.set_draw_buffers(&[])?;
    assert!(!fbo.has_enabled_color_attachment());
    Ok(())
}

#[test]
fn draw_buffer_slot_must_select_its_own_attachment() {
    let fbo = framebuffer();
    assert!(matches!(
        fbo.set_draw_buffers(&[DrawBuffer::ColorAttachment(1)]),
        Err(TesselError::InvalidOperation(_))
    ));
    assert!(matches!(
        fbo.set_draw_buffers(&[DrawBuffer::Back]),
        Err(TesselError::InvalidOperation(_))
    ));
    assert!(matches!(
        fbo.set_draw_buffers(&[DrawBuffer::None; 9]),
        Err(TesselError::InvalidValue(_))
    ));
    assert_eq!(fbo.draw_buffer_state(0), DrawBuffer::ColorAttachment(0), "failed calls change nothing");
}

#[test]
fn read_buffer_selects_the_read_attachment() -> anyhow::Result<()> {
    let fbo = framebuffer();
    let first = common::renderbuffer(1, InternalFormat::Rgba8, 8, 8);
    let second = common::renderbuffer(2, InternalFormat::Rgba8, 8, 8);
    fbo.attach_renderbuffer(AttachmentPoint::Color(0), &first)?;
    fbo.attach_renderbuffer(AttachmentPoint::Color(3), &second)?;

    assert_eq!(fbo.read_color_attachment().map(|a| a.id()), Some(Handle::new(1)));

    fbo.set_read_buffer(DrawBuffer::ColorAttachment(3))?;
    assert_eq!(fbo.read_color_attachment().map(|a| a.id()), Some(Handle::new(2)));

    fbo.set_read_buffer(DrawBuffer::None)?;
    assert!(fbo.read_color_attachment().is_none());
    assert!(fbo.set_read_buffer(DrawBuffer::Back).is_err());
    assert_eq!(fbo.first_color_attachment().map(|a| a.id()), Some(Handle::new(1)));
    Ok(())
}
