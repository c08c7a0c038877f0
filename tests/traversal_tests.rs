//! Scene traversal tests: transparency deferral, shadow-pass skipping and
//! tolerance of empty meshes.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use glam::Mat4;

use ember::gpu::{MeshData, PrimitiveMode};
use ember::render::Mesh;
use ember::renderer::Renderer;
use ember::renderer::core::RenderCore;
use ember::renderer::pipeline::nodes::ShadowMapRenderer;
use ember::renderer::pipeline::{NodeRef, PassContext, clear, process};
use ember::renderer::settings::RendererOptions;
use ember::scene::{ObjectKind, Scene, SceneObject};

use common::RecordingDevice;

fn triangle(device: &Rc<RecordingDevice>) -> Rc<Mesh> {
    let data = MeshData {
        vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        texcoords: Vec::new(),
        mode: PrimitiveMode::Triangles,
    };
    Rc::new(Mesh::new(&device.handle(), "triangle", data).expect("mesh"))
}

fn test_core(device: &Rc<RecordingDevice>) -> RenderCore {
    RenderCore::new(&device.handle(), RendererOptions::default(), 640, 480)
        .expect("core construction on the stub device")
}

#[test]
fn transparent_subtree_is_deferred_not_drawn() {
    let device = RecordingDevice::new();
    let mut core = test_core(&device);

    let child = Rc::new(SceneObject {
        name: "child".into(),
        meshes: vec![triangle(&device)],
        ..SceneObject::default()
    });
    let root = Rc::new(SceneObject {
        name: "root".into(),
        opacity: 0.5,
        meshes: vec![triangle(&device)],
        children: vec![child],
        ..SceneObject::default()
    });

    device.clear_calls();
    core.draw_object(&root, false);

    // Root and child both queue; nothing rasterizes in the opaque pass.
    assert_eq!(core.transparency_list().len(), 2);
    assert_eq!(device.draw_count(), 0);
}

#[test]
fn deferred_objects_draw_in_the_transparency_pass() {
    let device = RecordingDevice::new();
    let mut core = test_core(&device);

    let mut scene = Scene::new();
    let child = Rc::new(SceneObject {
        name: "child".into(),
        meshes: vec![triangle(&device)],
        ..SceneObject::default()
    });
    scene.add(SceneObject {
        name: "root".into(),
        opacity: 0.5,
        meshes: vec![triangle(&device)],
        children: vec![child],
        ..SceneObject::default()
    });

    core.prepare_render_matrices(&scene);
    device.clear_calls();
    core.draw_scene_frame(&scene);

    // Both meshes draw exactly once, in the deferred pass.
    assert_eq!(device.draw_count(), 2);
    assert!(core.transparency_list().is_empty());
}

#[test]
fn shadow_pass_skips_camera_objects() {
    let device = RecordingDevice::new();
    let mut core = test_core(&device);

    let mut scene = Scene::new();
    let camera = scene.add(SceneObject {
        name: "camera".into(),
        kind: ObjectKind::Camera,
        meshes: vec![triangle(&device)],
        transform: Mat4::from_translation(glam::Vec3::new(0.0, 2.0, 5.0)),
        ..SceneObject::default()
    });
    scene.main_camera = Some(camera);
    scene.add(SceneObject {
        name: "box".into(),
        meshes: vec![triangle(&device)],
        ..SceneObject::default()
    });

    let shadow: NodeRef = Rc::new(RefCell::new(
        ShadowMapRenderer::new(&device.handle(), 256).expect("shadow buffer"),
    ));

    device.clear_calls();
    let mut ctx = PassContext {
        core: &mut core,
        scene: &scene,
    };
    clear(&shadow);
    process(&shadow, &mut ctx);

    // Only the box's mesh reaches the device.
    assert_eq!(device.draw_count(), 1);
}

#[test]
fn zero_vertex_mesh_is_not_fatal() {
    let device = RecordingDevice::new();
    let mut core = test_core(&device);

    let empty = Rc::new(
        Mesh::new(&device.handle(), "empty", MeshData::default()).expect("empty mesh is legal"),
    );
    let obj = Rc::new(SceneObject {
        name: "hollow".into(),
        meshes: vec![empty],
        ..SceneObject::default()
    });

    device.clear_calls();
    core.draw_object(&obj, false);
    assert_eq!(device.draw_count(), 0);
}

#[test]
fn billboard_and_panorama_select_their_shaders() {
    let device = RecordingDevice::new();
    let mut core = test_core(&device);

    let billboard = Rc::new(SceneObject {
        name: "sprite".into(),
        kind: ObjectKind::Billboard,
        meshes: vec![triangle(&device)],
        ..SceneObject::default()
    });

    core.draw_object(&billboard, false);
    // The pushed shader must have been popped again.
    assert_eq!(
        core.current_shader(),
        RendererOptions::default().default_shader
    );
}

#[test]
fn selected_objects_get_a_highlight_pass() {
    let device = RecordingDevice::new();
    let mut core = test_core(&device);

    let mut scene = Scene::new();
    let obj = scene.add(SceneObject {
        name: "picked".into(),
        meshes: vec![triangle(&device)],
        ..SceneObject::default()
    });
    scene.selected_objects.push(obj);

    core.prepare_render_matrices(&scene);
    device.clear_calls();
    core.draw_scene_frame(&scene);

    // Main pass + highlight pass.
    assert_eq!(device.draw_count(), 2);
}

#[test]
fn render_to_texture_draws_one_scene_frame_offscreen() {
    let device = RecordingDevice::new();
    let mut renderer = Renderer::new(&device.handle(), RendererOptions::default(), 320, 240)
        .expect("renderer");

    let mut scene = Scene::new();
    scene.add(SceneObject {
        name: "box".into(),
        meshes: vec![triangle(&device)],
        ..SceneObject::default()
    });

    let buffer = renderer
        .render_to_texture(&scene, 128, 128)
        .expect("offscreen frame");
    assert_eq!(buffer.width(), 128);
    assert_eq!(buffer.height(), 128);
    assert_eq!(renderer.frame_stats().scene_draws, 1);
}
