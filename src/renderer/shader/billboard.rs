//! Billboard Shader
//!
//! Camera-facing textured quads. Always blended; the draw order produced by
//! transparency deferral takes care of layering.

use glam::{Mat4, Vec3};

use crate::errors::Result;
use crate::gpu::{DeviceRc, RenderState, TextureKind};
use crate::renderer::core::RenderEnv;
use crate::scene::SceneObject;

use super::program::ShaderProgram;
use super::uniform::{TextureSlot, UniformBinding};
use super::{ScopeStack, SceneShader, units};

const DEFAULT_COLOR: Vec3 = Vec3::new(0.7, 0.7, 0.7);

pub struct BillboardShader {
    program: ShaderProgram,
    scope: ScopeStack,
    project_view_model: UniformBinding<Mat4>,
    color: UniformBinding<Vec3>,
    opacity: UniformBinding<f32>,
    diffuse: TextureSlot,
}

impl BillboardShader {
    pub fn create(device: &DeviceRc, strict: bool) -> Result<Self> {
        let program = ShaderProgram::create(
            device,
            "billboard",
            include_str!("../../shaders/billboard.vert"),
            include_str!("../../shaders/billboard.frag"),
            strict,
        )?;
        program.activate();
        let project_view_model = program.bind_uniform("projectViewModelMatrix");
        let color = program.bind_uniform("color");
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
            project_view_model,
            color,
            opacity,
            diffuse,
        })
    }
}

impl SceneShader for BillboardShader {
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

        let color = mat.and_then(|m| m.color).unwrap_or(DEFAULT_COLOR);
        self.color.set(color);

        self.opacity.set(obj.effective_opacity());

        env.device.set_render_state(RenderState::Blend, true);
    }

    fn end_object(&mut self, _obj: &SceneObject, env: &RenderEnv) {
        env.device.set_render_state(RenderState::Blend, false);
        self.scope.leave_object();
    }
}
