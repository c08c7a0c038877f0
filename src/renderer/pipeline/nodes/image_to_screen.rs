//! Final compositor: blits a texture (optionally blended with a second
//! layer) to the current render target, usually the canvas.

use std::any::Any;

use crate::errors::{EmberError, Result};
use crate::gpu::DeviceRc;
use crate::render::Mesh;
use crate::renderer::pipeline::{NodeEdges, NodeRef, NodeState, PassContext, PipelineNode};
use crate::renderer::shader::{FilterMode, ShaderKind};

pub struct ImageToScreenRenderer {
    state: NodeState,
    quad: Mesh,
    input: Option<NodeRef>,
    tex2_input: Option<NodeRef>,
    auto_size: bool,
    width: u32,
    height: u32,
    /// Output gamma correction applied while compositing.
    pub gamma: f32,
    pub antialias: bool,
}

impl ImageToScreenRenderer {
    /// Canvas-sized compositor. `flip_v` mirrors the sampled texture; set
    /// it when the input is a framebuffer attachment drawn to the canvas.
    pub fn new(device: &DeviceRc, flip_v: bool) -> Result<Self> {
        Ok(Self {
            state: NodeState::default(),
            quad: Mesh::screen_quad(device, -1.0, -1.0, 2.0, 2.0, flip_v)?,
            input: None,
            tex2_input: None,
            auto_size: true,
            width: 0,
            height: 0,
            gamma: 1.0,
            antialias: false,
        })
    }

    /// Compositor with a fixed output resolution.
    pub fn with_resolution(
        device: &DeviceRc,
        flip_v: bool,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let mut node = Self::new(device, flip_v)?;
        node.auto_size = false;
        node.width = width;
        node.height = height;
        Ok(node)
    }

    pub fn set_input(&mut self, node: &NodeRef) -> Result<()> {
        if !node.borrow().has_texture_output() {
            return Err(EmberError::PipelineContract(format!(
                "compositor wired to `{}`, which produces no texture",
                node.borrow().name()
            )));
        }
        self.input = Some(node.clone());
        Ok(())
    }

    /// Optional additive second layer (the bloom output).
    pub fn set_tex2_input(&mut self, node: Option<NodeRef>) -> Result<()> {
        if let Some(node) = &node
            && !node.borrow().has_texture_output()
        {
            return Err(EmberError::PipelineContract(format!(
                "compositor second layer wired to `{}`, which produces no texture",
                node.borrow().name()
            )));
        }
        self.tex2_input = node;
        Ok(())
    }

    #[must_use]
    pub fn input(&self) -> Option<&NodeRef> {
        self.input.as_ref()
    }

    #[must_use]
    pub fn tex2_input(&self) -> Option<&NodeRef> {
        self.tex2_input.as_ref()
    }
}

impl PipelineNode for ImageToScreenRenderer {
    fn name(&self) -> &str {
        "image-to-screen"
    }

    fn state(&self) -> &NodeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut NodeState {
        &mut self.state
    }

    fn inputs(&self) -> NodeEdges {
        self.input.iter().chain(self.tex2_input.iter()).cloned().collect()
    }

    fn render(&mut self, ctx: &mut PassContext<'_>) {
        let Some(source) = self.input.as_ref().and_then(|n| n.borrow().output()) else {
            return;
        };
        let tex2 = self.tex2_input.as_ref().and_then(|n| n.borrow().output());

        let (width, height) = if self.auto_size {
            (ctx.core.env.canvas_width, ctx.core.env.canvas_height)
        } else {
            (self.width, self.height)
        };

        ctx.core.use_shader(ShaderKind::Screen);
        {
            let core = &mut *ctx.core;
            let screen = &core.shaders.screen;
            screen.set_texture(source);
            screen.set_tex2(tex2, core.env.empty_texture.id());
            // The screen program is shared with the filter passes; reset
            // their state before compositing.
            screen.set_filter(FilterMode::None);
            screen.set_vertical(false);
            screen.set_gamma(self.gamma);
            screen.set_antialias(self.antialias);
            screen.set_resolution(width, height);
            core.env.device.set_viewport(width, height);
        }

        self.quad.draw();

        ctx.core.shaders.screen.clear_texture();
        ctx.core.disuse_current_shader();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
