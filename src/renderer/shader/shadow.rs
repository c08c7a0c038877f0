//! Shadow Map Shader
//!
//! Depth-only rasterization of scene geometry for the shadow pass. Uses the
//! same begin/end protocol as every other variant so the shadow pass can
//! re-enter scene traversal while the main pass's scene is open on a
//! different shader instance.

use glam::Mat4;

use crate::errors::Result;
use crate::gpu::DeviceRc;
use crate::renderer::core::RenderEnv;
use crate::scene::{Scene, SceneObject};

use super::program::ShaderProgram;
use super::uniform::UniformBinding;
use super::{ScopeStack, SceneShader};

pub struct ShadowMapShader {
    program: ShaderProgram,
    scope: ScopeStack,
    project_view: UniformBinding<Mat4>,
    model: UniformBinding<Mat4>,
}

impl ShadowMapShader {
    pub fn create(device: &DeviceRc, strict: bool) -> Result<Self> {
        let program = ShaderProgram::create(
            device,
            "shadowmap",
            include_str!("../../shaders/shadowmap.vert"),
            include_str!("../../shaders/shadowmap.frag"),
            strict,
        )?;
        program.activate();
        let project_view = program.bind_uniform("projectViewMatrix");
        let model = program.bind_uniform("modelMatrix");
        program.deactivate();

        Ok(Self {
            program,
            scope: ScopeStack::default(),
            project_view,
            model,
        })
    }

    #[cfg(test)]
    pub(crate) fn scene_depth(&self) -> usize {
        self.scope.scene_depth()
    }
}

impl SceneShader for ShadowMapShader {
    fn program(&self) -> &ShaderProgram {
        &self.program
    }

    fn begin_scene(&mut self, _scene: &Scene, env: &RenderEnv) {
        self.scope.enter_scene();
        self.project_view.set(env.projection_view);
    }

    fn end_scene(&mut self, _env: &RenderEnv) {
        self.scope.leave_scene();
    }

    fn begin_object(&mut self, obj: &SceneObject, _env: &RenderEnv) {
        self.scope.enter_object();
        self.model.set(obj.transform);
    }

    fn end_object(&mut self, _obj: &SceneObject, _env: &RenderEnv) {
        self.scope.leave_object();
    }
}
