//! Separable blur: a fixed horizontal-then-vertical filter chain.

use std::any::Any;

use crate::errors::{EmberError, Result};
use crate::gpu::{DeviceRc, TextureId};
use crate::renderer::pipeline::{NodeEdges, NodeRef, NodeState, PassContext, PipelineNode};
use crate::renderer::shader::FilterMode;

use super::image_filter::ImageFilterRenderer;

/// Two-stage box blur over the input texture. The stages are owned and
/// fixed at construction; the node presents itself to the graph as a
/// single pass with one input and one output.
pub struct BlurRenderer {
    state: NodeState,
    input: Option<NodeRef>,
    horizontal: ImageFilterRenderer,
    vertical: ImageFilterRenderer,
    gamma: f32,
}

impl BlurRenderer {
    pub fn new(device: &DeviceRc, width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            state: NodeState::default(),
            input: None,
            horizontal: ImageFilterRenderer::new(
                device,
                width,
                height,
                FilterMode::BlurHorizontal,
                false,
            )?,
            vertical: ImageFilterRenderer::new(
                device,
                width,
                height,
                FilterMode::BlurVertical,
                false,
            )?,
            gamma: 1.0,
        })
    }

    pub fn set_input(&mut self, node: &NodeRef) -> Result<()> {
        if !node.borrow().has_texture_output() {
            return Err(EmberError::PipelineContract(format!(
                "blur wired to `{}`, which produces no texture",
                node.borrow().name()
            )));
        }
        self.input = Some(node.clone());
        Ok(())
    }

    /// Gamma applied by the final (vertical) stage.
    pub fn set_gamma(&mut self, gamma: f32) {
        self.gamma = gamma;
    }

    #[must_use]
    pub fn input(&self) -> Option<&NodeRef> {
        self.input.as_ref()
    }
}

impl PipelineNode for BlurRenderer {
    fn name(&self) -> &str {
        "blur"
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
        self.vertical.gamma = self.gamma;
        self.horizontal.run(ctx, source);
        let mid = self.horizontal.output_texture();
        self.vertical.run(ctx, mid);
    }

    fn output(&self) -> Option<TextureId> {
        Some(self.vertical.output_texture())
    }

    fn has_texture_output(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
