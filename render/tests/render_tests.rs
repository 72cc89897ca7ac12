//! Integration tests for render object batching.
//!
//! # Test Categories
//!
//! - **Queue Tests**: bounded capacity and FIFO execution
//! - **Predicate Tests**: tag filtering at draw time
//! - **Binding Tests**: constants, textures, blend and draw dispatch
//! - **Directory Tests**: render types and render targets

mod common;

use glam::{Mat4, Vec3, Vec4};
use rstest::rstest;

use common::{create_context, create_material, create_quad, test_params};
use softgpu_graphics::{
    BlendFactor, BufferAccess, ComponentType, GraphicsError, PrimitiveType, RenderState,
    TextureFormat,
};
use softgpu_render::{
    Predicate, RenderError, RenderObject, USER_VERTEX_CONSTANT_REGISTER, WORLD_TRANSFORM_REGISTER,
};

const OPAQUE: u32 = 0x0A0A;
const TRANSPARENT: u32 = 0x7777;

// ============================================================================
// Queue Tests
// ============================================================================

#[test]
fn test_queue_full_keeps_existing_objects() {
    let (mut device, mut context) = create_context(test_params().with_max_instances(2));
    let material = create_material(&mut device, &mut context, &[]);

    let first = RenderObject::new(material).with_range(PrimitiveType::Points, 0, 1);
    let second = RenderObject::new(material).with_range(PrimitiveType::Lines, 0, 2);
    context.add_to_render(first.clone()).unwrap();
    context.add_to_render(second.clone()).unwrap();

    assert_eq!(
        context.add_to_render(RenderObject::new(material)),
        Err(RenderError::BufferIsFull)
    );
    assert_eq!(context.render_objects(), &[first, second]);

    context.clear_render_objects();
    assert!(context.render_objects().is_empty());
    context.add_to_render(RenderObject::new(material)).unwrap();
}

#[test]
fn test_objects_execute_in_queue_order() {
    let (mut device, mut context) = create_context(test_params());
    let material = create_material(&mut device, &mut context, &[]);

    for x in [1.0, 2.0, 3.0] {
        let object = RenderObject::new(material)
            .with_range(PrimitiveType::Points, 0, 1)
            .with_world_transform(Mat4::from_translation(Vec3::new(x, 0.0, 0.0)));
        context.add_to_render(object).unwrap();
    }

    let stats = context.draw(&mut device, None).unwrap();
    assert_eq!(stats.drawn, 3);
    assert_eq!(device.stats().draw_calls, 3);
    // Translation lives in the last column of the world transform.
    assert_eq!(
        device.vertex_constant(WORLD_TRANSFORM_REGISTER + 3),
        Some(Vec4::new(3.0, 0.0, 0.0, 1.0))
    );

    // The queue survives a draw.
    assert_eq!(context.render_objects().len(), 3);
}

// ============================================================================
// Predicate Tests
// ============================================================================

#[rstest]
#[case::no_predicate(None, 3, 0)]
#[case::empty_predicate(Some(vec![]), 3, 0)]
#[case::opaque_only(Some(vec![OPAQUE]), 1, 2)]
#[case::either_tag(Some(vec![OPAQUE, TRANSPARENT]), 2, 1)]
#[case::unknown_tag(Some(vec![0xDEAD]), 0, 3)]
fn test_predicate_filtering(
    #[case] tags: Option<Vec<u32>>,
    #[case] drawn: usize,
    #[case] filtered: usize,
) {
    let (mut device, mut context) = create_context(test_params());
    let opaque = create_material(&mut device, &mut context, &[OPAQUE]);
    let transparent = create_material(&mut device, &mut context, &[TRANSPARENT]);
    let untagged = create_material(&mut device, &mut context, &[]);
    for material in [opaque, transparent, untagged] {
        context.add_to_render(RenderObject::new(material)).unwrap();
    }

    let predicate = tags.map(|tags| Predicate::from_tags(&tags).unwrap());
    let stats = context.draw(&mut device, predicate.as_ref()).unwrap();
    assert_eq!(stats.drawn, drawn);
    assert_eq!(stats.filtered, filtered);
    assert_eq!(device.stats().draw_calls, drawn as u64);
}

#[test]
fn test_programs_unbound_after_draw() {
    let (mut device, mut context) = create_context(test_params());
    let opaque = create_material(&mut device, &mut context, &[OPAQUE]);
    context.add_to_render(RenderObject::new(opaque)).unwrap();

    let predicate = Predicate::from_tags(&[OPAQUE]).unwrap();
    assert_eq!(context.draw(&mut device, Some(&predicate)).unwrap().drawn, 1);
    assert_eq!(device.bound_vertex_program(), None);
    assert_eq!(device.bound_fragment_program(), None);
}

// ============================================================================
// Binding Tests
// ============================================================================

#[test]
fn test_object_constants_override_context_defaults() {
    let (mut device, mut context) = create_context(test_params());
    let material = create_material(&mut device, &mut context, &[]);
    let default_value = Vec4::new(1.0, 1.0, 1.0, 1.0);
    let override_value = Vec4::new(9.0, 8.0, 7.0, 6.0);
    context.set_vertex_constant(0, default_value).unwrap();
    context.set_fragment_constant(2, default_value).unwrap();

    let mut object = RenderObject::new(material);
    object.set_vertex_constant(0, override_value).unwrap();
    context.add_to_render(object).unwrap();
    context.draw(&mut device, None).unwrap();

    assert_eq!(
        device.vertex_constant(USER_VERTEX_CONSTANT_REGISTER),
        Some(override_value)
    );
    assert_eq!(device.fragment_constant(2), Some(default_value));

    // Without an override the context default is used.
    context.clear_render_objects();
    context.add_to_render(RenderObject::new(material)).unwrap();
    context.draw(&mut device, None).unwrap();
    assert_eq!(
        device.vertex_constant(USER_VERTEX_CONSTANT_REGISTER),
        Some(default_value)
    );
}

#[test]
fn test_object_constants_do_not_leak_into_next_object() {
    let (mut device, mut context) = create_context(test_params());
    let material = create_material(&mut device, &mut context, &[]);

    let mut first = RenderObject::new(material);
    first.set_vertex_constant(4, Vec4::splat(5.0)).unwrap();
    first.set_fragment_constant(1, Vec4::splat(6.0)).unwrap();
    context.add_to_render(first).unwrap();
    context.add_to_render(RenderObject::new(material)).unwrap();
    context.draw(&mut device, None).unwrap();

    assert_eq!(
        device.vertex_constant(USER_VERTEX_CONSTANT_REGISTER + 4),
        Some(Vec4::ZERO)
    );
    assert_eq!(device.fragment_constant(1), Some(Vec4::ZERO));
}

#[test]
fn test_reset_object_constant_falls_back_to_default() {
    let (mut device, mut context) = create_context(test_params());
    let material = create_material(&mut device, &mut context, &[]);
    context.set_fragment_constant(5, Vec4::ONE).unwrap();

    let mut object = RenderObject::new(material);
    object.set_fragment_constant(5, Vec4::ZERO).unwrap();
    object.reset_fragment_constant(5).unwrap();
    context.add_to_render(object).unwrap();
    context.draw(&mut device, None).unwrap();

    assert_eq!(device.fragment_constant(5), Some(Vec4::ONE));
}

#[test]
fn test_indexed_object_gathers_and_restores_streams() {
    let (mut device, mut context) = create_context(test_params());
    let material = create_material(&mut device, &mut context, &[]);
    let quad = create_quad(&mut device);

    let object = RenderObject::new(material)
        .with_geometry(quad.declaration, quad.vertex_buffer)
        .with_indices(quad.index_buffer, ComponentType::UnsignedShort)
        .with_range(PrimitiveType::Triangles, 0, 6);
    context.add_to_render(object).unwrap();
    context.draw(&mut device, None).unwrap();

    let stats = device.stats();
    assert_eq!(stats.indexed_draw_calls, 1);
    assert_eq!(stats.gathered_vertices, 6);
    assert!(device.vertex_stream(0).is_none());

    // Drawing twice works because the declaration was disabled.
    context.draw(&mut device, None).unwrap();
    assert_eq!(device.stats().indexed_draw_calls, 2);
}

#[test]
fn test_offset_indexed_object_uses_range_draw() {
    let (mut device, mut context) = create_context(test_params());
    let material = create_material(&mut device, &mut context, &[]);
    let quad = create_quad(&mut device);

    let object = RenderObject::new(material)
        .with_geometry(quad.declaration, quad.vertex_buffer)
        .with_indices(quad.index_buffer, ComponentType::UnsignedShort)
        .with_range(PrimitiveType::Triangles, 3, 3);
    context.add_to_render(object).unwrap();
    context.draw(&mut device, None).unwrap();

    let stats = device.stats();
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(stats.indexed_draw_calls, 0);
}

#[test]
fn test_textures_and_blend_are_restored() {
    let (mut device, mut context) = create_context(test_params());
    let material = create_material(&mut device, &mut context, &[]);
    let texture = device.new_texture().unwrap();
    device
        .set_texture_data(texture, 0, 2, 2, TextureFormat::Rgba, &[0; 16])
        .unwrap();

    let mut object = RenderObject::new(material)
        .with_blend(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
    object.set_texture(3, texture).unwrap();
    context.add_to_render(object).unwrap();
    context.draw(&mut device, None).unwrap();

    assert_eq!(device.bound_texture(3), None);
    assert!(!device.is_state_enabled(RenderState::Blend));
    assert_eq!(
        device.blend_func(),
        (BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha)
    );
}

#[test]
fn test_failed_draw_still_restores_bindings() {
    let (mut device, mut context) = create_context(test_params());
    let material = create_material(&mut device, &mut context, &[]);
    let quad = create_quad(&mut device);
    device
        .map_index_buffer(quad.index_buffer, BufferAccess::ReadOnly)
        .unwrap();

    let texture = device.new_texture().unwrap();

    let mut object = RenderObject::new(material)
        .with_geometry(quad.declaration, quad.vertex_buffer)
        .with_indices(quad.index_buffer, ComponentType::UnsignedShort)
        .with_range(PrimitiveType::Triangles, 0, 6)
        .with_blend(BlendFactor::One, BlendFactor::One);
    object.set_texture(0, texture).unwrap();
    context.add_to_render(object).unwrap();

    assert_eq!(
        context.draw(&mut device, None),
        Err(RenderError::Graphics(GraphicsError::BufferMapped))
    );
    assert!(device.vertex_stream(0).is_none());
    assert_eq!(device.bound_texture(0), None);
    assert!(!device.is_state_enabled(RenderState::Blend));
    assert_eq!(device.bound_vertex_program(), None);

    device.unmap_index_buffer(quad.index_buffer).unwrap();
    context.draw(&mut device, None).unwrap();
}

#[test]
fn test_stale_material_stops_draw() {
    let (mut device, mut context) = create_context(test_params());
    let kept = create_material(&mut device, &mut context, &[]);
    let deleted = create_material(&mut device, &mut context, &[]);
    context.add_to_render(RenderObject::new(kept)).unwrap();
    context.add_to_render(RenderObject::new(deleted)).unwrap();
    context.add_to_render(RenderObject::new(kept)).unwrap();
    context.delete_material(deleted).unwrap();

    assert_eq!(
        context.draw(&mut device, None),
        Err(RenderError::InvalidHandle("material"))
    );
    assert_eq!(device.stats().draw_calls, 1);
}

// ============================================================================
// Directory Tests
// ============================================================================

#[test]
fn test_draw_stats_per_render_type() {
    let (mut device, mut context) = create_context(test_params());
    let material = create_material(&mut device, &mut context, &[]);
    let sprites = context.register_render_type(0x5151).unwrap();
    let meshes = context.register_render_type(0x3E3E).unwrap();

    context
        .add_to_render(RenderObject::new(material).with_render_type(sprites))
        .unwrap();
    context
        .add_to_render(RenderObject::new(material).with_render_type(sprites))
        .unwrap();
    context
        .add_to_render(RenderObject::new(material).with_render_type(meshes))
        .unwrap();
    context.add_to_render(RenderObject::new(material)).unwrap();

    let stats = context.draw(&mut device, None).unwrap();
    assert_eq!(stats.drawn, 4);
    assert_eq!(stats.drawn_of_type(sprites), 2);
    assert_eq!(stats.drawn_of_type(meshes), 1);
}

#[test]
fn test_render_target_directory_last_registration_wins() {
    let (mut device, mut context) = create_context(test_params().with_max_render_targets(2));
    let shadow = device.new_render_target(16, 16, TextureFormat::Rgba).unwrap();
    let reflection = device.new_render_target(16, 16, TextureFormat::Rgba).unwrap();
    let bloom = device.new_render_target(8, 8, TextureFormat::Rgba).unwrap();

    context.register_render_target(shadow, 1).unwrap();
    context.register_render_target(reflection, 1).unwrap();
    assert_eq!(context.render_target(1), Some(reflection));

    context.register_render_target(bloom, 2).unwrap();
    assert_eq!(
        context.register_render_target(shadow, 3),
        Err(RenderError::OutOfResources("render targets"))
    );
    assert_eq!(context.render_target(2), Some(bloom));
    assert_eq!(context.render_target(3), None);
}

#[test]
fn test_debug_lists_are_bounded() {
    let (mut device, mut context) = create_context(test_params().with_max_debug_vertices(2));
    context
        .line_3d(Vec3::ZERO, Vec3::X, Vec4::ONE, Vec4::ONE)
        .unwrap();
    assert_eq!(
        context.line_3d(Vec3::ZERO, Vec3::Y, Vec4::ONE, Vec4::ONE),
        Err(RenderError::BufferIsFull)
    );

    let stats = context.draw_debug_3d(&mut device).unwrap();
    assert_eq!(stats.drawn, 1);
    context
        .line_3d(Vec3::ZERO, Vec3::Y, Vec4::ONE, Vec4::ONE)
        .unwrap();
}

#[test]
fn test_context_delete_leaves_client_resources() {
    let (mut device, context) = create_context(test_params());
    let quad = create_quad(&mut device);
    context.delete(&mut device).unwrap();

    let counts = device.resource_counts();
    assert_eq!(counts.vertex_buffers, 1);
    assert_eq!(counts.vertex_declarations, 1);
    assert_eq!(counts.index_buffers, 1);
    assert_eq!(counts.vertex_programs, 0);
    device.delete_index_buffer(quad.index_buffer).unwrap();
}
