//! Direct-to-screen scene pass, used when no post-processing or shadow
//! stage is enabled.

use std::any::Any;

use crate::renderer::pipeline::{NodeState, PassContext, PipelineNode};

pub struct DefaultRenderer {
    state: NodeState,
}

impl DefaultRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: NodeState::default(),
        }
    }
}

impl Default for DefaultRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineNode for DefaultRenderer {
    fn name(&self) -> &str {
        "default"
    }

    fn state(&self) -> &NodeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut NodeState {
        &mut self.state
    }

    fn render(&mut self, ctx: &mut PassContext<'_>) {
        ctx.core.set_canvas_viewport();
        ctx.render_background();
        ctx.render_frame();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
