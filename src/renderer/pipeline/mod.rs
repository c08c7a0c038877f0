//! Render Pipeline Graph
//!
//! Frames are produced by a small DAG of [`PipelineNode`]s: each node wraps
//! one render operation, exposes the texture it produced, and is memoized
//! per frame by a `rendered` flag. Evaluation is post-order: [`process`]
//! recursively processes a node's producer edges before invoking its own
//! render body, so a node with several consumers still renders exactly once
//! per frame.
//!
//! There is no dirty tracking. [`clear`] must be called on every root
//! before each frame's [`process`]; a skipped clear reuses stale output and
//! is a programming error, not a recoverable condition.
//!
//! Edge kinds:
//! - `inputs()` lists producer edges, processed before the node renders.
//! - `nested()` lists nodes the node drives *inside* its own render body
//!   (e.g. overlays rendered into its framebuffer, preview tiles); they
//!   participate in clearing but not in pre-ordering.

pub mod builder;
pub mod nodes;

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::gpu::{FramebufferId, TextureId};
use crate::renderer::core::RenderCore;
use crate::scene::Scene;

/// Shared handle to a pipeline node.
pub type NodeRef = Rc<RefCell<dyn PipelineNode>>;

/// Edge list, inline-sized for the common one-or-two-producer case.
pub type NodeEdges = SmallVec<[NodeRef; 2]>;

/// Per-frame memoization flag.
#[derive(Debug, Default)]
pub struct NodeState {
    rendered: bool,
}

impl NodeState {
    #[inline]
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.rendered
    }
}

/// Everything a render body needs: the shared renderer state plus the
/// scene being drawn this frame.
pub struct PassContext<'a> {
    pub core: &'a mut RenderCore,
    pub scene: &'a Scene,
}

impl PassContext<'_> {
    /// Runs `body` with the given framebuffer bound, restoring the
    /// previous target (and viewport) afterwards even when the body
    /// renders nested passes.
    pub fn with_framebuffer(
        &mut self,
        framebuffer: FramebufferId,
        width: u32,
        height: u32,
        body: impl FnOnce(&mut Self),
    ) {
        self.core.push_framebuffer(framebuffer, width, height);
        body(self);
        self.core.pop_framebuffer();
    }

    /// Draws the background layer: the configured background image node if
    /// one exists, a plain clear otherwise.
    pub fn render_background(&mut self) {
        if let Some(bg) = self.core.background.clone() {
            clear(&bg);
            process(&bg, self);
        } else {
            self.core.clear_viewport();
        }
    }

    /// Prepares the frame matrices and runs the full scene traversal into
    /// the current target.
    pub fn render_frame(&mut self) {
        self.core.prepare_render_matrices(self.scene);
        self.core.draw_scene_frame(self.scene);
    }
}

/// One stage of the render graph.
pub trait PipelineNode {
    /// Stable name used in logs and tests.
    fn name(&self) -> &str;

    fn state(&self) -> &NodeState;
    fn state_mut(&mut self) -> &mut NodeState;

    /// Producer edges, processed before this node renders.
    fn inputs(&self) -> NodeEdges {
        NodeEdges::new()
    }

    /// Nodes driven inside this node's render body; cleared transitively
    /// but not pre-processed.
    fn nested(&self) -> NodeEdges {
        NodeEdges::new()
    }

    /// The actual GPU work. Nodes whose required input has produced no
    /// texture yet must skip silently.
    fn render(&mut self, ctx: &mut PassContext<'_>);

    /// Texture produced by this node, if any was rendered yet.
    fn output(&self) -> Option<TextureId> {
        None
    }

    /// Whether this node ever produces a texture. Wiring contracts check
    /// this at assignment time.
    fn has_texture_output(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;
}

/// Memoized post-order evaluation. Processes producer edges first, then
/// renders, then marks the node done for this frame.
pub fn process(node: &NodeRef, ctx: &mut PassContext<'_>) {
    if node.borrow().state().is_rendered() {
        return;
    }

    let inputs = node.borrow().inputs();
    for input in &inputs {
        process(input, ctx);
    }

    let mut n = node.borrow_mut();
    n.render(ctx);
    n.state_mut().rendered = true;
    ctx.core.frame_stats.render_passes += 1;
}

/// Resets the memoization flag transitively through every edge.
pub fn clear(node: &NodeRef) {
    node.borrow_mut().state_mut().rendered = false;

    let (inputs, nested) = {
        let n = node.borrow();
        (n.inputs(), n.nested())
    };
    for edge in inputs.iter().chain(nested.iter()) {
        clear(edge);
    }
}
