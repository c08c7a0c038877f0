//! Single full-screen filter pass over an input texture.

use std::any::Any;

use crate::errors::{EmberError, Result};
use crate::gpu::{DeviceRc, TextureId};
use crate::render::{FrameBuffer, Mesh};
use crate::renderer::pipeline::{NodeEdges, NodeRef, NodeState, PassContext, PipelineNode};
use crate::renderer::shader::{FilterMode, ShaderKind};

/// Applies one [`FilterMode`] to the input node's texture, producing a new
/// texture at the node's own resolution. Filter buffers carry no depth.
pub struct ImageFilterRenderer {
    state: NodeState,
    buffer: FrameBuffer,
    quad: Mesh,
    filter: FilterMode,
    /// Output gamma applied by the shader; 1.0 leaves colors untouched.
    pub gamma: f32,
    input: Option<NodeRef>,
}

impl ImageFilterRenderer {
    /// `flip_v` mirrors the sampled texture vertically, needed when the
    /// input is a framebuffer attachment consumed by another offscreen
    /// pass.
    pub fn new(
        device: &DeviceRc,
        width: u32,
        height: u32,
        filter: FilterMode,
        flip_v: bool,
    ) -> Result<Self> {
        Ok(Self {
            state: NodeState::default(),
            buffer: FrameBuffer::new(device, width, height, false)?,
            quad: Mesh::screen_quad(device, -1.0, -1.0, 2.0, 2.0, flip_v)?,
            filter,
            gamma: 1.0,
            input: None,
        })
    }

    /// Wires the producer. Fails fast when the node cannot produce a
    /// texture, instead of skipping silently every frame.
    pub fn set_input(&mut self, node: &NodeRef) -> Result<()> {
        if !node.borrow().has_texture_output() {
            return Err(EmberError::PipelineContract(format!(
                "filter `{}` wired to `{}`, which produces no texture",
                self.filter_tag_name(),
                node.borrow().name()
            )));
        }
        self.input = Some(node.clone());
        Ok(())
    }

    #[must_use]
    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    #[must_use]
    pub fn input(&self) -> Option<&NodeRef> {
        self.input.as_ref()
    }

    #[must_use]
    pub fn output_texture(&self) -> TextureId {
        self.buffer.texture()
    }

    fn filter_tag_name(&self) -> &'static str {
        match self.filter {
            FilterMode::None => "none",
            FilterMode::LinearInterp => "linear-interp",
            FilterMode::BlurHorizontal => "blur-hor",
            FilterMode::BlurVertical => "blur-ver",
            FilterMode::LightPass => "light-pass",
            FilterMode::GaussBlur3 => "guass-blur3",
            FilterMode::GaussBlur5 => "guass-blur5",
        }
    }

    /// Runs the pass on an explicit source texture. Used directly by
    /// [`super::blur::BlurRenderer`] to chain its owned stages without
    /// graph edges.
    pub(crate) fn run(&mut self, ctx: &mut PassContext<'_>, source: TextureId) {
        let (width, height) = (self.buffer.width(), self.buffer.height());

        ctx.core.use_shader(ShaderKind::Screen);
        {
            let core = &mut *ctx.core;
            let screen = &core.shaders.screen;
            screen.set_texture(source);
            screen.set_tex2(None, core.env.empty_texture.id());
            screen.set_filter(self.filter);
            screen.set_vertical(self.filter == FilterMode::BlurVertical);
            screen.set_gamma(self.gamma);
            screen.set_antialias(false);
            screen.set_resolution(width, height);
        }

        let target = self.buffer.id();
        ctx.with_framebuffer(target, width, height, |ctx| {
            ctx.core.clear_viewport();
            self.quad.draw();
        });

        ctx.core.shaders.screen.clear_texture();
        ctx.core.disuse_current_shader();
    }
}

impl PipelineNode for ImageFilterRenderer {
    fn name(&self) -> &str {
        "image-filter"
    }

    fn state(&self) -> &NodeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut NodeState {
        &mut self.state
    }

    fn inputs(&self) -> NodeEdges {
        self.input.iter().cloned().collect()
    }

    fn render(&mut self, ctx: &mut PassContext<'_>) {
        let Some(source) = self.input.as_ref().and_then(|n| n.borrow().output()) else {
            return;
        };
        self.run(ctx, source);
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
