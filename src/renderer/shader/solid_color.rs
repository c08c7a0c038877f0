//! Solid Color Shader
//!
//! Flat single-color fill, used by the selection-highlight passes. Blending
//! is enabled and the depth test disabled for the duration of the object so
//! the highlight reads through geometry.

use glam::{Vec3, Vec4};

use crate::errors::Result;
use crate::gpu::{DeviceRc, RenderState};
use crate::renderer::core::RenderEnv;
use crate::scene::SceneObject;

use super::program::ShaderProgram;
use super::uniform::UniformBinding;
use super::{ScopeStack, SceneShader};

const DEFAULT_COLOR: Vec4 = Vec4::new(0.8, 0.8, 0.8, 1.0);

pub struct SolidColorShader {
    program: ShaderProgram,
    scope: ScopeStack,
    color_uniform: UniformBinding<Vec4>,
    project_view_model: UniformBinding<glam::Mat4>,
    /// Color for the next objects, set by the highlight passes.
    pub color: Option<Vec4>,
}

impl SolidColorShader {
    pub fn create(device: &DeviceRc, strict: bool) -> Result<Self> {
        let program = ShaderProgram::create(
            device,
            "solidcolor",
            include_str!("../../shaders/solidcolor.vert"),
            include_str!("../../shaders/solidcolor.frag"),
            strict,
        )?;
        program.activate();
        let color_uniform = program.bind_uniform("color");
        let project_view_model = program.bind_uniform("projectViewModelMatrix");
        program.deactivate();

        Ok(Self {
            program,
            scope: ScopeStack::default(),
            color_uniform,
            project_view_model,
            color: None,
        })
    }
}

impl SceneShader for SolidColorShader {
    fn program(&self) -> &ShaderProgram {
        &self.program
    }

    fn begin_object(&mut self, obj: &SceneObject, env: &RenderEnv) {
        self.scope.enter_object();

        // Per-object shader override color wins over the pass color.
        let color = obj
            .shader
            .as_ref()
            .and_then(|s| s.color)
            .map(|c: Vec3| c.extend(1.0))
            .or(self.color)
            .unwrap_or(DEFAULT_COLOR);
        self.color_uniform.set(color);

        self.project_view_model
            .set(env.projection_view * obj.transform);

        env.device.set_render_state(RenderState::Blend, true);
        env.device.set_render_state(RenderState::DepthTest, false);
    }

    fn end_object(&mut self, _obj: &SceneObject, env: &RenderEnv) {
        env.device.set_render_state(RenderState::Blend, false);
        env.device.set_render_state(RenderState::DepthTest, true);
        self.scope.leave_object();
    }
}
