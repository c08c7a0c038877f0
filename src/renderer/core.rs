//! Renderer Core
//!
//! [`RenderCore`] owns the process-wide GPU binding state the draw path
//! mutates: the shader stack, the framebuffer stack and the per-frame
//! transparency list. Every component that binds a shader or framebuffer
//! goes through the stacks here, so the prior binding is always restored
//! on exit.
//!
//! [`RenderEnv`] is the read-only side handed to shader hooks: device
//! handle, options, frame matrices and the shared placeholder textures.

use std::mem;

use glam::{Mat4, Vec3, Vec4};

use crate::errors::Result;
use crate::gpu::{DeviceRc, FramebufferId};
use crate::render::{CubeMap, Texture};
use crate::renderer::pipeline::NodeRef;
use crate::renderer::settings::RendererOptions;
use crate::renderer::shader::{SceneShader, ShaderKind, ShaderSet};
use crate::scene::{ObjectKind, ObjectRef, Scene};

const HIGHLIGHT_COLOR: Vec4 = Vec4::new(0.1, 0.6, 1.0, 0.5);
const HIGHLIGHT_CHILD_COLOR: Vec4 = Vec4::new(0.1, 1.0, 0.6, 0.5);

/// Frame context read by every shader hook.
pub struct RenderEnv {
    pub device: DeviceRc,
    pub options: RendererOptions,
    pub canvas_width: u32,
    pub canvas_height: u32,

    /// Combined projection * view of the frame being drawn.
    pub projection_view: Mat4,
    /// Extra view transform composed ahead of the camera (e.g. orbit
    /// interaction), identity by default.
    pub view_matrix: Mat4,
    pub camera_location: Vec3,

    /// Placeholders bound while a real asset is absent, so shaders can
    /// sample unconditionally.
    pub empty_texture: Texture,
    pub empty_cubemap: CubeMap,
    /// Sun color used when the sun object carries no material color.
    pub default_sun_color: Vec3,
}

/// Per-frame diagnostics, reset at the top of every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameStats {
    /// Pipeline node render bodies executed.
    pub render_passes: u32,
    /// Full scene traversals; more than one per frame is suspicious.
    pub scene_draws: u32,
}

impl FrameStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub struct RenderCore {
    pub env: RenderEnv,
    pub shaders: ShaderSet,
    pub frame_stats: FrameStats,
    /// Node blitted behind the scene by offscreen and direct passes.
    pub background: Option<NodeRef>,
    /// Renderer-wide wireframe override.
    pub wireframe: bool,

    shader_stack: Vec<ShaderKind>,
    framebuffer_stack: Vec<(FramebufferId, u32, u32)>,
    transparency_list: Vec<ObjectRef>,
}

impl RenderCore {
    pub fn new(
        device: &DeviceRc,
        options: RendererOptions,
        canvas_width: u32,
        canvas_height: u32,
    ) -> Result<Self> {
        let shaders = ShaderSet::create(device, options.strict_shaders)?;
        let default_shader = options.default_shader;
        let env = RenderEnv {
            device: device.clone(),
            options,
            canvas_width,
            canvas_height,
            projection_view: Mat4::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            camera_location: Vec3::ZERO,
            empty_texture: Texture::empty(device)?,
            empty_cubemap: CubeMap::empty(device)?,
            default_sun_color: Vec3::new(0.21, 0.14, 0.05),
        };
        Ok(Self {
            env,
            shaders,
            frame_stats: FrameStats::default(),
            background: None,
            wireframe: false,
            shader_stack: vec![default_shader],
            framebuffer_stack: Vec::new(),
            transparency_list: Vec::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.env.canvas_width = width;
        self.env.canvas_height = height;
    }

    // --- Shader stack ------------------------------------------------------

    /// Pushes and activates a shader. Paired with
    /// [`disuse_current_shader`](Self::disuse_current_shader).
    pub fn use_shader(&mut self, kind: ShaderKind) {
        self.shaders.get(kind).program().activate();
        self.shader_stack.push(kind);
    }

    #[must_use]
    pub fn current_shader(&self) -> ShaderKind {
        self.shader_stack
            .last()
            .copied()
            .unwrap_or(self.env.options.default_shader)
    }

    /// Pops the active shader and re-activates the one beneath it. The
    /// bottom (default) entry is never popped.
    pub fn disuse_current_shader(&mut self) {
        if self.shader_stack.len() <= 1 {
            return;
        }
        if let Some(popped) = self.shader_stack.pop() {
            self.shaders.get(popped).program().deactivate();
        }
        let top = self.current_shader();
        self.shaders.get(top).program().activate();
    }

    // --- Framebuffer stack -------------------------------------------------

    /// Binds an offscreen target. Paired with
    /// [`pop_framebuffer`](Self::pop_framebuffer); pipeline nodes use the
    /// scoped wrapper on
    /// [`PassContext`](crate::renderer::pipeline::PassContext) instead of
    /// calling these directly.
    pub fn push_framebuffer(&mut self, framebuffer: FramebufferId, width: u32, height: u32) {
        self.env.device.bind_framebuffer(Some(framebuffer));
        self.env.device.set_viewport(width, height);
        self.framebuffer_stack.push((framebuffer, width, height));
    }

    /// Restores the previously bound target, or the canvas when the stack
    /// empties.
    pub fn pop_framebuffer(&mut self) {
        self.framebuffer_stack.pop();
        match self.framebuffer_stack.last() {
            Some(&(framebuffer, width, height)) => {
                self.env.device.bind_framebuffer(Some(framebuffer));
                self.env.device.set_viewport(width, height);
            }
            None => {
                self.env.device.bind_framebuffer(None);
                self.set_canvas_viewport();
            }
        }
    }

    #[must_use]
    pub fn framebuffer_depth(&self) -> usize {
        self.framebuffer_stack.len()
    }

    pub fn set_canvas_viewport(&self) {
        self.env
            .device
            .set_viewport(self.env.canvas_width, self.env.canvas_height);
    }

    /// Clears color and depth of the current target with the configured
    /// back color.
    pub fn clear_viewport(&self) {
        self.env.device.clear(self.env.options.back_color);
    }

    // --- Frame setup -------------------------------------------------------

    /// Computes the frame's projection-view matrix and camera location
    /// from the scene's main camera (falling back to the configured
    /// default perspective).
    pub fn prepare_render_matrices(&mut self, scene: &Scene) {
        let camera = scene.main_camera.as_ref();

        let params = camera
            .and_then(|c| c.camera)
            .unwrap_or(crate::scene::CameraParams {
                field_of_view: self.env.options.perspective.angle,
                near: self.env.options.perspective.near,
                far: self.env.options.perspective.far,
            });

        let aspect = if self.env.canvas_height == 0 {
            1.0
        } else {
            self.env.canvas_width as f32 / self.env.canvas_height as f32
        };
        let projection = Mat4::perspective_rh_gl(
            params.field_of_view.to_radians(),
            aspect,
            params.near,
            params.far,
        );

        let camera_view = camera.map_or(Mat4::IDENTITY, |c| c.transform.inverse());
        self.env.projection_view = projection * self.env.view_matrix * camera_view;
        self.env.camera_location = camera.map_or(Vec3::ZERO, |c| c.world_location());
    }

    // --- Scene traversal ---------------------------------------------------

    /// Draws the whole scene into the current target: opaque pass,
    /// deferred transparency pass, then selection highlights.
    pub fn draw_scene_frame(&mut self, scene: &Scene) {
        self.frame_stats.scene_draws += 1;
        if self.frame_stats.scene_draws > 1 {
            log::warn!(
                "scene drawn {} times this frame",
                self.frame_stats.scene_draws
            );
        }

        self.transparency_list.clear();

        let kind = self.current_shader();
        self.shaders.get(kind).program().activate();
        self.shaders.get_mut(kind).begin_scene(scene, &self.env);

        for obj in &scene.objects {
            self.draw_object(obj, false);
        }

        // Transparent objects draw after every opaque one, each on its
        // own (descendants were enqueued separately).
        let deferred = mem::take(&mut self.transparency_list);
        for obj in &deferred {
            self.draw_object(obj, true);
        }

        for obj in &scene.selected_objects {
            self.draw_highlight_object(obj, HIGHLIGHT_COLOR);
            if self.env.options.enable_highlight_selected_children {
                for child in &obj.children {
                    self.draw_highlight_object(child, HIGHLIGHT_CHILD_COLOR);
                }
            }
        }

        let kind = self.current_shader();
        self.shaders.get_mut(kind).end_scene(&self.env);
    }

    #[must_use]
    pub fn transparency_list(&self) -> &[ObjectRef] {
        &self.transparency_list
    }

    fn enqueue_transparent(&mut self, obj: &ObjectRef) {
        self.transparency_list.push(obj.clone());
        for child in &obj.children {
            if child.visible {
                self.enqueue_transparent(child);
            }
        }
    }

    /// Draws one object (and, outside the transparency pass, its
    /// subtree) with the appropriate shader.
    pub fn draw_object(&mut self, obj: &ObjectRef, transparency_pass: bool) {
        if !obj.visible {
            return;
        }

        // Partially transparent subtrees draw after the opaque pass.
        if !transparency_pass && obj.effective_opacity() < 1.0 {
            self.enqueue_transparent(obj);
            return;
        }

        let pushed = if let Some(overridden) = &obj.shader {
            Some(overridden.kind)
        } else if self.wireframe || obj.wireframe {
            Some(ShaderKind::Wireframe)
        } else {
            match obj.kind {
                ObjectKind::Billboard => Some(ShaderKind::Billboard),
                ObjectKind::Panorama => Some(ShaderKind::Panorama),
                ObjectKind::Generic | ObjectKind::Camera => None,
            }
        };
        if let Some(kind) = pushed {
            self.use_shader(kind);
        }

        let kind = self.current_shader();
        self.shaders.get_mut(kind).begin_object(obj, &self.env);

        if self.env.options.enable_custom_draw
            && let Some(hook) = &obj.on_draw
        {
            hook(&*self.env.device);
        }

        if self.env.options.enable_draw_mesh {
            for mesh in &obj.meshes {
                if mesh.meta().vertex_count == 0 {
                    log::warn!("empty mesh on object `{}`", obj.name);
                }
                self.shaders.get_mut(kind).begin_mesh(mesh, &self.env);
                mesh.draw();
                self.shaders.get_mut(kind).end_mesh(&self.env);
            }
        }

        if !transparency_pass {
            for child in &obj.children {
                self.draw_object(child, false);
            }
        }

        self.shaders.get_mut(kind).end_object(obj, &self.env);

        if pushed.is_some() {
            self.disuse_current_shader();
        }
    }

    fn draw_highlight_object(&mut self, obj: &ObjectRef, color: Vec4) {
        if !obj.visible {
            return;
        }
        self.use_shader(ShaderKind::SolidColor);
        self.shaders.solid_color.color = Some(color);
        self.shaders.solid_color.begin_object(obj, &self.env);
        for mesh in &obj.meshes {
            mesh.draw();
        }
        self.shaders.solid_color.end_object(obj, &self.env);
        self.shaders.solid_color.color = None;
        self.disuse_current_shader();
    }
}
