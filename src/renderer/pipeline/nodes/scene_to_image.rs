//! Scene-to-texture pass: the main scene rasterization when the frame is
//! post-processed instead of drawn straight to the canvas.

use std::any::Any;

use crate::render::FrameBuffer;
use crate::renderer::pipeline::{NodeEdges, NodeRef, NodeState, PassContext, PipelineNode, process};

/// Renders the scene into an owned framebuffer and exposes the color
/// attachment. Tracks the canvas size by default; a fixed resolution can
/// be requested instead (used by [`super::preview`] tiles and
/// render-to-texture).
pub struct SceneToImageRenderer {
    state: NodeState,
    auto_size: bool,
    width: u32,
    height: u32,
    buffer: Option<FrameBuffer>,
    shadow_map_input: Option<NodeRef>,
    overlays: Vec<NodeRef>,
}

impl SceneToImageRenderer {
    /// Canvas-sized scene pass; the buffer follows resizes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: NodeState::default(),
            auto_size: true,
            width: 0,
            height: 0,
            buffer: None,
            shadow_map_input: None,
            overlays: Vec::new(),
        }
    }

    /// Fixed-resolution scene pass.
    #[must_use]
    pub fn with_resolution(width: u32, height: u32) -> Self {
        Self {
            state: NodeState::default(),
            auto_size: false,
            width,
            height,
            buffer: None,
            shadow_map_input: None,
            overlays: Vec::new(),
        }
    }

    /// Wires the 2D shadow pass whose output is injected into the standard
    /// shader for the duration of the scene draw.
    pub fn set_shadow_map_input(&mut self, node: Option<NodeRef>) {
        self.shadow_map_input = node;
    }

    /// Adds a node rendered inside this node's framebuffer, after the
    /// scene itself (e.g. a background or overlay layer).
    pub fn add_overlay(&mut self, node: NodeRef) {
        self.overlays.push(node);
    }

    #[must_use]
    pub fn shadow_map_input(&self) -> Option<&NodeRef> {
        self.shadow_map_input.as_ref()
    }
}

impl Default for SceneToImageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineNode for SceneToImageRenderer {
    fn name(&self) -> &str {
        "scene-to-image"
    }

    fn state(&self) -> &NodeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut NodeState {
        &mut self.state
    }

    fn inputs(&self) -> NodeEdges {
        self.shadow_map_input.iter().cloned().collect()
    }

    fn nested(&self) -> NodeEdges {
        self.overlays.iter().cloned().collect()
    }

    fn render(&mut self, ctx: &mut PassContext<'_>) {
        let (width, height) = if self.auto_size {
            (ctx.core.env.canvas_width, ctx.core.env.canvas_height)
        } else {
            (self.width, self.height)
        };

        let stale = self
            .buffer
            .as_ref()
            .is_none_or(|b| b.width() != width || b.height() != height);
        if stale {
            match FrameBuffer::new(&ctx.core.env.device, width, height, true) {
                Ok(buffer) => self.buffer = Some(buffer),
                Err(err) => {
                    log::error!("scene buffer {width}x{height} unavailable: {err}");
                    self.buffer = None;
                    return;
                }
            }
        }
        let Some(buffer) = &self.buffer else { return };

        let shadow_tex = self
            .shadow_map_input
            .as_ref()
            .and_then(|node| node.borrow().output());
        ctx.core.shaders.standard.set_shadow_map_2d(shadow_tex);

        let target = buffer.id();
        let overlays = self.overlays.clone();
        ctx.with_framebuffer(target, width, height, |ctx| {
            ctx.render_background();
            ctx.render_frame();
            for overlay in &overlays {
                process(overlay, ctx);
            }
        });

        // The injected map must not leak into later scene passes.
        ctx.core.shaders.standard.set_shadow_map_2d(None);
    }

    fn output(&self) -> Option<crate::gpu::TextureId> {
        self.buffer.as_ref().map(FrameBuffer::texture)
    }

    fn has_texture_output(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
