//! Simple Shader
//!
//! Untextured-or-diffuse shading with sun light only; the cheap fallback
//! for scenes that don't need the standard shader's material stack.

use glam::{Mat4, Vec2, Vec3};

use crate::errors::Result;
use crate::gpu::{DeviceRc, RenderState, TextureKind};
use crate::renderer::core::RenderEnv;
use crate::scene::{Scene, SceneObject};

use super::program::ShaderProgram;
use super::uniform::{TextureSlot, UniformBinding};
use super::{ScopeStack, SceneShader, units};

const DEFAULT_COLOR: Vec3 = Vec3::new(0.7, 0.7, 0.7);
const DEFAULT_TILING: Vec2 = Vec2::ONE;

pub struct SimpleShader {
    program: ShaderProgram,
    scope: ScopeStack,
    project_view: UniformBinding<Mat4>,
    model: UniformBinding<Mat4>,
    normal_matrix: UniformBinding<Mat4>,
    sun_dir: UniformBinding<Vec3>,
    sun_light: UniformBinding<Vec3>,
    color: UniformBinding<Vec3>,
    tex_tiling: UniformBinding<Vec2>,
    opacity: UniformBinding<f32>,
    diffuse: TextureSlot,
}

impl SimpleShader {
    pub fn create(device: &DeviceRc, strict: bool) -> Result<Self> {
        let program = ShaderProgram::create(
            device,
            "simple",
            include_str!("../../shaders/simple.vert"),
            include_str!("../../shaders/simple.frag"),
            strict,
        )?;
        program.activate();
        let project_view = program.bind_uniform("projectViewMatrix");
        let model = program.bind_uniform("modelMatrix");
        let normal_matrix = program.bind_uniform("normalMatrix");
        let sun_dir = program.bind_uniform("sundir");
        let sun_light = program.bind_uniform("sunlight");
        let color = program.bind_uniform("color");
        let tex_tiling = program.bind_uniform("texTiling");
        let opacity = program.bind_uniform("opacity");
        let diffuse = program.bind_texture_slot(
            "diffuseMap",
            "hasDiffuseMap",
            units::DIFFUSE,
            TextureKind::Texture2D,
        );
        program.deactivate();

        Ok(Self {
            program,
            scope: ScopeStack::default(),
            project_view,
            model,
            normal_matrix,
            sun_dir,
            sun_light,
            color,
            tex_tiling,
            opacity,
            diffuse,
        })
    }
}

impl SceneShader for SimpleShader {
    fn program(&self) -> &ShaderProgram {
        &self.program
    }

    fn begin_scene(&mut self, scene: &Scene, env: &RenderEnv) {
        self.scope.enter_scene();
        self.project_view.set(env.projection_view);

        if let Some(sun) = &scene.sun {
            let dir = sun.world_location().normalize_or_zero();
            self.sun_dir.set(dir);
            let color = sun
                .mat
                .as_ref()
                .and_then(|m| m.color)
                .unwrap_or(env.default_sun_color);
            self.sun_light.set(color * dir.dot(Vec3::Y));
        }
    }

    fn end_scene(&mut self, _env: &RenderEnv) {
        self.scope.leave_scene();
    }

    fn begin_object(&mut self, obj: &SceneObject, env: &RenderEnv) {
        self.scope.enter_object();

        self.model.set(obj.transform);
        self.normal_matrix
            .set(obj.transform.inverse().transpose());

        let mat = obj.mat.as_ref();
        let texture = mat.and_then(|m| m.tex.as_ref()).map(|t| t.id());
        self.diffuse.apply(texture, env.empty_texture.id());

        self.color
            .set(mat.and_then(|m| m.color).unwrap_or(DEFAULT_COLOR));
        self.tex_tiling
            .set(mat.and_then(|m| m.tex_tiling).unwrap_or(DEFAULT_TILING));

        let opacity = obj.effective_opacity();
        if opacity < 1.0 {
            env.device.set_render_state(RenderState::Blend, true);
            self.opacity.set(opacity);
        } else {
            self.opacity.set(1.0);
        }
    }

    fn end_object(&mut self, _obj: &SceneObject, env: &RenderEnv) {
        env.device.set_render_state(RenderState::Blend, false);
        self.scope.leave_object();
    }
}
