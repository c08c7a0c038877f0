//! Constant texture source, e.g. a background image fed into a compositor.

use std::any::Any;
use std::rc::Rc;

use crate::gpu::TextureId;
use crate::render::Texture;
use crate::renderer::pipeline::{NodeState, PassContext, PipelineNode};

pub struct ImageSource {
    state: NodeState,
    texture: Rc<Texture>,
}

impl ImageSource {
    #[must_use]
    pub fn new(texture: Rc<Texture>) -> Self {
        Self {
            state: NodeState::default(),
            texture,
        }
    }
}

impl PipelineNode for ImageSource {
    fn name(&self) -> &str {
        "image-source"
    }

    fn state(&self) -> &NodeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut NodeState {
        &mut self.state
    }

    fn render(&mut self, _ctx: &mut PassContext<'_>) {}

    fn output(&self) -> Option<TextureId> {
        Some(self.texture.id())
    }

    fn has_texture_output(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
