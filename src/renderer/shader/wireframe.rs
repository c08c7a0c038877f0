//! Wireframe Shader
//!
//! Flat-color line rendering, selected by the renderer-level wireframe
//! toggle or a per-object flag.

use glam::{Mat4, Vec3};

use crate::errors::Result;
use crate::gpu::DeviceRc;
use crate::renderer::core::RenderEnv;
use crate::scene::SceneObject;

use super::program::ShaderProgram;
use super::uniform::UniformBinding;
use super::{ScopeStack, SceneShader};

const DEFAULT_COLOR: Vec3 = Vec3::new(0.2, 0.2, 0.2);

pub struct WireframeShader {
    program: ShaderProgram,
    scope: ScopeStack,
    color: UniformBinding<Vec3>,
    project_view_model: UniformBinding<Mat4>,
}

impl WireframeShader {
    pub fn create(device: &DeviceRc, strict: bool) -> Result<Self> {
        let program = ShaderProgram::create(
            device,
            "wireframe",
            include_str!("../../shaders/wireframe.vert"),
            include_str!("../../shaders/wireframe.frag"),
            strict,
        )?;
        program.activate();
        let color = program.bind_uniform("color");
        let project_view_model = program.bind_uniform("projectViewModelMatrix");
        program.deactivate();

        Ok(Self {
            program,
            scope: ScopeStack::default(),
            color,
            project_view_model,
        })
    }
}

impl SceneShader for WireframeShader {
    fn program(&self) -> &ShaderProgram {
        &self.program
    }

    fn begin_object(&mut self, obj: &SceneObject, env: &RenderEnv) {
        self.scope.enter_object();
        self.project_view_model
            .set(env.projection_view * obj.transform);
        let color = obj
            .shader
            .as_ref()
            .and_then(|s| s.color)
            .unwrap_or(DEFAULT_COLOR);
        self.color.set(color);
    }

    fn end_object(&mut self, _obj: &SceneObject, _env: &RenderEnv) {
        self.scope.leave_object();
    }
}
