//! Debug grid that tiles the outputs of several nodes onto the canvas.

use std::any::Any;

use crate::errors::Result;
use crate::gpu::DeviceRc;
use crate::render::Mesh;
use crate::renderer::pipeline::{
    NodeEdges, NodeRef, NodeState, PassContext, PipelineNode, process,
};
use crate::renderer::shader::{FilterMode, ShaderKind};

/// Renders each child node, then blits its output into a grid cell.
/// Children are nested edges: this node drives them itself so their
/// framebuffer passes happen before the canvas blits.
pub struct MultipleImagePreviewRenderer {
    state: NodeState,
    rows: u32,
    columns: u32,
    children: Vec<NodeRef>,
    tiles: Vec<Mesh>,
}

impl MultipleImagePreviewRenderer {
    #[must_use]
    pub fn new(rows: u32, columns: u32) -> Self {
        Self {
            state: NodeState::default(),
            rows: rows.max(1),
            columns: columns.max(1),
            children: Vec::new(),
            tiles: Vec::new(),
        }
    }

    /// Adds a texture-producing node to the next free grid cell. Cells
    /// fill left to right, bottom to top; extra nodes beyond the grid are
    /// rejected by the wiring contract.
    pub fn add_preview(&mut self, device: &DeviceRc, node: &NodeRef) -> Result<()> {
        if !node.borrow().has_texture_output() {
            return Err(crate::errors::EmberError::PipelineContract(format!(
                "preview wired to `{}`, which produces no texture",
                node.borrow().name()
            )));
        }
        let index = self.children.len() as u32;
        if index >= self.rows * self.columns {
            return Err(crate::errors::EmberError::PipelineContract(format!(
                "preview grid {}x{} is full",
                self.rows, self.columns
            )));
        }

        let tile_w = 2.0 / self.columns as f32;
        let tile_h = 2.0 / self.rows as f32;
        let x = -1.0 + (index % self.columns) as f32 * tile_w;
        let y = -1.0 + (index / self.columns) as f32 * tile_h;

        self.tiles
            .push(Mesh::screen_quad(device, x, y, tile_w, tile_h, true)?);
        self.children.push(node.clone());
        Ok(())
    }
}

impl PipelineNode for MultipleImagePreviewRenderer {
    fn name(&self) -> &str {
        "preview"
    }

    fn state(&self) -> &NodeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut NodeState {
        &mut self.state
    }

    fn nested(&self) -> NodeEdges {
        self.children.iter().cloned().collect()
    }

    fn render(&mut self, ctx: &mut PassContext<'_>) {
        let (width, height) = (ctx.core.env.canvas_width, ctx.core.env.canvas_height);

        for (child, tile) in self.children.iter().zip(&self.tiles) {
            process(child, ctx);
            let Some(texture) = child.borrow().output() else {
                continue;
            };

            ctx.core.use_shader(ShaderKind::Screen);
            {
                let core = &mut *ctx.core;
                let screen = &core.shaders.screen;
                screen.set_texture(texture);
                screen.set_tex2(None, core.env.empty_texture.id());
                screen.set_filter(FilterMode::None);
                screen.set_vertical(false);
                screen.set_gamma(1.0);
                screen.set_antialias(false);
                screen.set_resolution(width, height);
                core.env.device.set_viewport(width, height);
            }
            tile.draw();
            ctx.core.shaders.screen.clear_texture();
            ctx.core.disuse_current_shader();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
