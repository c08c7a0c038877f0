//! Viewer Shader
//!
//! Unlit textured shading with a baked lightmap, used by model-viewer style
//! scenes. Semi-transparent objects draw blended with the depth test off.

use glam::{Mat4, Vec2, Vec3};

use crate::errors::Result;
use crate::gpu::{DeviceRc, RenderState, TextureKind};
use crate::renderer::core::RenderEnv;
use crate::scene::SceneObject;

use super::program::ShaderProgram;
use super::uniform::{TextureSlot, UniformBinding};
use super::{ScopeStack, SceneShader, units};

const DEFAULT_COLOR: Vec3 = Vec3::new(0.7, 0.7, 0.7);
const DEFAULT_TILING: Vec2 = Vec2::ONE;

pub struct ViewerShader {
    program: ShaderProgram,
    scope: ScopeStack,
    project_view_model: UniformBinding<Mat4>,
    color: UniformBinding<Vec3>,
    tex_tiling: UniformBinding<Vec2>,
    opacity: UniformBinding<f32>,
    diffuse: TextureSlot,
    lightmap: TextureSlot,
}

impl ViewerShader {
    pub fn create(device: &DeviceRc, strict: bool) -> Result<Self> {
        let program = ShaderProgram::create(
            device,
            "viewer",
            include_str!("../../shaders/viewer.vert"),
            include_str!("../../shaders/viewer.frag"),
            strict,
        )?;
        program.activate();
        let project_view_model = program.bind_uniform("projectViewModelMatrix");
        let color = program.bind_uniform("color");
        let tex_tiling = program.bind_uniform("texTiling");
        let opacity = program.bind_uniform("opacity");
        let diffuse = program.bind_texture_slot(
            "diffuseMap",
            "hasDiffuseMap",
            units::DIFFUSE,
            TextureKind::Texture2D,
        );
        let lightmap = program.bind_texture_slot(
            "lightMap",
            "hasLightMap",
            units::NORMAL_MAP,
            TextureKind::Texture2D,
        );
        program.deactivate();

        Ok(Self {
            program,
            scope: ScopeStack::default(),
            project_view_model,
            color,
            tex_tiling,
            opacity,
            diffuse,
            lightmap,
        })
    }
}

impl SceneShader for ViewerShader {
    fn program(&self) -> &ShaderProgram {
        &self.program
    }

    fn begin_object(&mut self, obj: &SceneObject, env: &RenderEnv) {
        self.scope.enter_object();

        self.project_view_model
            .set(env.projection_view * obj.transform);

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
            env.device.set_render_state(RenderState::DepthTest, false);
            self.opacity.set(opacity);
        } else {
            self.opacity.set(1.0);
        }

        let lightmap = mat.and_then(|m| m.lightmap.as_ref()).map(|t| t.id());
        self.lightmap.apply(lightmap, env.empty_texture.id());
    }

    fn end_object(&mut self, _obj: &SceneObject, env: &RenderEnv) {
        env.device.set_render_state(RenderState::Blend, false);
        env.device.set_render_state(RenderState::DepthTest, true);
        self.scope.leave_object();
    }
}
