//! Panorama Shader
//!
//! Draws an inside-out environment sphere from a cube map. Front faces are
//! culled for the duration of the object since the camera sits inside the
//! geometry.

use glam::Mat4;

use crate::errors::Result;
use crate::gpu::{CullFace, DeviceRc, TextureKind};
use crate::renderer::core::RenderEnv;
use crate::scene::SceneObject;

use super::program::ShaderProgram;
use super::uniform::{TextureSlot, UniformBinding};
use super::{ScopeStack, SceneShader, units};

pub struct PanoramaShader {
    program: ShaderProgram,
    scope: ScopeStack,
    project_view_model: UniformBinding<Mat4>,
    cube: TextureSlot,
}

impl PanoramaShader {
    pub fn create(device: &DeviceRc, strict: bool) -> Result<Self> {
        let program = ShaderProgram::create(
            device,
            "panorama",
            include_str!("../../shaders/panorama.vert"),
            include_str!("../../shaders/panorama.frag"),
            strict,
        )?;
        program.activate();
        let project_view_model = program.bind_uniform("projectViewModelMatrix");
        let cube = program.bind_texture_slot(
            "cubeMap",
            "hasCubeMap",
            units::DIFFUSE,
            TextureKind::CubeMap,
        );
        program.deactivate();

        Ok(Self {
            program,
            scope: ScopeStack::default(),
            project_view_model,
            cube,
        })
    }
}

impl SceneShader for PanoramaShader {
    fn program(&self) -> &ShaderProgram {
        &self.program
    }

    fn begin_object(&mut self, obj: &SceneObject, env: &RenderEnv) {
        self.scope.enter_object();

        self.project_view_model
            .set(env.projection_view * obj.transform);

        let cube = obj
            .mat
            .as_ref()
            .and_then(|m| m.cube.as_ref())
            .map(|c| c.id());
        self.cube.apply(cube, env.empty_cubemap.id());

        env.device.set_cull_face(CullFace::Front);
    }

    fn end_object(&mut self, _obj: &SceneObject, env: &RenderEnv) {
        env.device.set_cull_face(CullFace::Back);
        self.scope.leave_object();
    }
}
