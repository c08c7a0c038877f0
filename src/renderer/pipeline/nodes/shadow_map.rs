//! Shadow pass: depth-only scene render into a square offscreen buffer,
//! sampled later by the standard shader.

use std::any::Any;

use crate::errors::Result;
use crate::gpu::{DeviceRc, TextureId};
use crate::render::FrameBuffer;
use crate::renderer::pipeline::{NodeState, PassContext, PipelineNode};
use crate::renderer::shader::{SceneShader, ShaderKind};
use crate::scene::{ObjectKind, ObjectRef};

pub struct ShadowMapRenderer {
    state: NodeState,
    buffer: FrameBuffer,
}

impl ShadowMapRenderer {
    pub fn new(device: &DeviceRc, resolution: u32) -> Result<Self> {
        Ok(Self {
            state: NodeState::default(),
            buffer: FrameBuffer::new(device, resolution, resolution, true)?,
        })
    }

    #[must_use]
    pub fn resolution(&self) -> u32 {
        self.buffer.width()
    }

    fn draw_object(ctx: &mut PassContext<'_>, obj: &ObjectRef) {
        if !obj.visible || obj.kind == ObjectKind::Camera {
            return;
        }

        let core = &mut *ctx.core;
        core.shaders.shadow_map.begin_object(obj, &core.env);

        // Only plain geometry casts; billboards and panoramas do not.
        if obj.kind == ObjectKind::Generic && core.env.options.enable_draw_mesh {
            for mesh in &obj.meshes {
                core.shaders.shadow_map.begin_mesh(mesh, &core.env);
                mesh.draw();
                core.shaders.shadow_map.end_mesh(&core.env);
            }
        }

        for child in &obj.children {
            Self::draw_object(ctx, child);
        }

        let core = &mut *ctx.core;
        core.shaders.shadow_map.end_object(obj, &core.env);
    }
}

impl PipelineNode for ShadowMapRenderer {
    fn name(&self) -> &str {
        "shadow-map"
    }

    fn state(&self) -> &NodeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut NodeState {
        &mut self.state
    }

    fn render(&mut self, ctx: &mut PassContext<'_>) {
        let (target, size) = (self.buffer.id(), self.buffer.width());
        ctx.with_framebuffer(target, size, size, |ctx| {
            ctx.core.clear_viewport();
            ctx.core.prepare_render_matrices(ctx.scene);
            ctx.core.use_shader(ShaderKind::ShadowMap);
            {
                let core = &mut *ctx.core;
                core.shaders.shadow_map.begin_scene(ctx.scene, &core.env);
            }
            for obj in &ctx.scene.objects {
                Self::draw_object(ctx, obj);
            }
            {
                let core = &mut *ctx.core;
                core.shaders.shadow_map.end_scene(&core.env);
            }
            ctx.core.disuse_current_shader();
        });
    }

    fn output(&self) -> Option<TextureId> {
        Some(self.buffer.texture())
    }

    fn has_texture_output(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
