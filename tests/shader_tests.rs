//! Shader binding layer tests: uniform degradation, light selection and
//! object-scope state discipline.

mod common;

use std::rc::Rc;

use glam::{Mat4, Vec3};

use ember::gpu::{RenderState, UniformData};
use ember::render::{CubeMap, Texture};
use ember::renderer::core::RenderEnv;
use ember::renderer::settings::RendererOptions;
use ember::renderer::shader::{
    SceneShader, ShaderProgram, ShadowMapShader, StandardShader, UniformBinding,
};
use ember::scene::{Material, Scene, SceneObject};

use common::{Call, RecordingDevice};

fn test_env(device: &Rc<RecordingDevice>) -> RenderEnv {
    RenderEnv {
        device: device.handle(),
        options: RendererOptions::default(),
        canvas_width: 640,
        canvas_height: 480,
        projection_view: Mat4::IDENTITY,
        view_matrix: Mat4::IDENTITY,
        camera_location: Vec3::ZERO,
        empty_texture: Texture::empty(&device.handle()).expect("placeholder"),
        empty_cubemap: CubeMap::empty(&device.handle()).expect("placeholder"),
        default_sun_color: Vec3::new(0.21, 0.14, 0.05),
    }
}

fn emissive_at(x: f32) -> SceneObject {
    SceneObject {
        transform: Mat4::from_translation(Vec3::new(x, 0.0, 0.0)),
        mat: Some(Material {
            emission: Some(1.0),
            color: Some(Vec3::ONE),
            ..Material::default()
        }),
        ..SceneObject::default()
    }
}

#[test]
fn absent_uniform_binding_is_a_silent_no_op() {
    let device = RecordingDevice::with_no_uniforms();
    let program = ShaderProgram::create(&device.handle(), "probe", "", "", false)
        .expect("stub programs always link");

    let binding: UniformBinding<f32> = program.bind_uniform("doesNotExist");
    assert!(!binding.is_bound());

    device.clear_calls();
    for i in 0..1000 {
        binding.set(i as f32);
    }
    assert!(
        device
            .calls()
            .iter()
            .all(|c| !matches!(c, Call::SetUniform(_, _)))
    );
}

#[test]
fn light_selection_caps_and_sorts_by_distance() {
    let device = RecordingDevice::new();
    let mut shader = StandardShader::create(&device.handle(), false).expect("shader");

    let mut scene = Scene::new();
    for i in 1..=20 {
        scene.add(emissive_at(i as f32));
    }
    // Out of range, must be discarded entirely.
    scene.add(emissive_at(60.0));

    shader.check_scene_light_sources(&scene, Vec3::ZERO);

    let sources = shader.light_sources();
    assert_eq!(sources.len(), 15);
    for pair in sources.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
    assert!(sources.iter().all(|s| s.distance <= 15.0));
}

#[test]
fn begin_scene_uploads_the_capped_light_count() {
    let device = RecordingDevice::new();
    let mut shader = StandardShader::create(&device.handle(), false).expect("shader");
    let env = test_env(&device);

    let mut scene = Scene::new();
    for i in 1..=20 {
        scene.add(emissive_at(i as f32));
    }

    device.clear_calls();
    shader.begin_scene(&scene, &env);
    assert_eq!(device.last_uniform("lightCount"), Some(UniformData::Int(15)));
    shader.end_scene(&env);
}

#[test]
fn invisible_and_non_emissive_objects_are_not_light_sources() {
    let device = RecordingDevice::new();
    let mut shader = StandardShader::create(&device.handle(), false).expect("shader");

    let mut scene = Scene::new();
    let mut hidden = emissive_at(1.0);
    hidden.visible = false;
    scene.add(hidden);
    scene.add(SceneObject {
        mat: Some(Material {
            color: Some(Vec3::ONE),
            ..Material::default()
        }),
        ..SceneObject::default()
    });

    shader.check_scene_light_sources(&scene, Vec3::ZERO);
    assert!(shader.light_sources().is_empty());
}

#[test]
fn shadow_pass_can_nest_inside_an_open_scene() {
    let device = RecordingDevice::new();
    let mut standard = StandardShader::create(&device.handle(), false).expect("shader");
    let mut shadow = ShadowMapShader::create(&device.handle(), false).expect("shader");
    let env = test_env(&device);
    let scene = Scene::new();

    standard.begin_scene(&scene, &env);
    assert_eq!(standard.scope().scene_depth(), 1);

    // A shadow pass re-enters scene traversal on its own shader instance
    // while the main pass's scene stays open.
    shadow.begin_scene(&scene, &env);
    shadow.end_scene(&env);

    assert_eq!(standard.scope().scene_depth(), 1);
    standard.end_scene(&env);
    assert_eq!(standard.scope().scene_depth(), 0);
}

#[test]
fn end_object_resets_blend_state_unconditionally() {
    let device = RecordingDevice::new();
    let mut shader = StandardShader::create(&device.handle(), false).expect("shader");
    let env = test_env(&device);

    let opaque = SceneObject::default();

    device.clear_calls();
    shader.begin_object(&opaque, &env);
    assert!(
        device
            .calls()
            .iter()
            .all(|c| *c != Call::SetRenderState(RenderState::Blend, true)),
        "opaque object must not enable blending"
    );

    device.clear_calls();
    shader.end_object(&opaque, &env);
    let calls = device.calls();
    assert!(calls.contains(&Call::SetRenderState(RenderState::Blend, false)));
    assert!(calls.contains(&Call::SetRenderState(RenderState::DepthTest, true)));
}

#[test]
fn transparent_object_enables_blending_and_uploads_opacity() {
    let device = RecordingDevice::new();
    let mut shader = StandardShader::create(&device.handle(), false).expect("shader");
    let env = test_env(&device);

    let translucent = SceneObject {
        opacity: 0.3,
        ..SceneObject::default()
    };

    device.clear_calls();
    shader.begin_object(&translucent, &env);
    assert!(
        device
            .calls()
            .contains(&Call::SetRenderState(RenderState::Blend, true))
    );
    assert_eq!(device.last_uniform("opacity"), Some(UniformData::Float(0.3)));
    shader.end_object(&translucent, &env);
}
