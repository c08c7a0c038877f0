//! Renderer
//!
//! [`Renderer`] ties the pieces together: it owns the [`RenderCore`]
//! (shader set, binding stacks, frame context) and the root nodes of the
//! render pipeline graph. A frame is `clear()` on every root followed by
//! `process()` on every root; everything else (offscreen passes, bloom,
//! shadows, compositing) is expressed inside the graph.

pub mod core;
pub mod pipeline;
pub mod settings;
pub mod shader;

use std::rc::Rc;

use glam::Mat4;

use crate::errors::Result;
use crate::gpu::DeviceRc;
use crate::render::{FrameBuffer, Texture};
use crate::scene::Scene;

use self::core::{FrameStats, RenderCore};
use self::pipeline::{NodeRef, PassContext, builder};
use self::settings::RendererOptions;

pub struct Renderer {
    core: RenderCore,
    pipeline: Vec<NodeRef>,
}

impl Renderer {
    pub fn new(
        device: &DeviceRc,
        options: RendererOptions,
        canvas_width: u32,
        canvas_height: u32,
    ) -> Result<Self> {
        let core = RenderCore::new(device, options, canvas_width, canvas_height)?;
        let pipeline =
            builder::create_pipeline(device, &core.env.options, canvas_width, canvas_height)?;
        Ok(Self { core, pipeline })
    }

    /// Renders one frame of `scene` to the canvas.
    pub fn render(&mut self, scene: &Scene) {
        self.core.frame_stats.reset();
        for node in &self.pipeline {
            pipeline::clear(node);
        }
        let mut ctx = PassContext {
            core: &mut self.core,
            scene,
        };
        for node in &self.pipeline {
            pipeline::process(node, &mut ctx);
        }
    }

    /// Renders one frame of `scene` into a fresh offscreen buffer instead
    /// of the canvas, bypassing the post-processing graph.
    pub fn render_to_texture(
        &mut self,
        scene: &Scene,
        width: u32,
        height: u32,
    ) -> Result<FrameBuffer> {
        let buffer = FrameBuffer::new(&self.core.env.device, width, height, true)?;
        self.core.frame_stats.reset();
        let mut ctx = PassContext {
            core: &mut self.core,
            scene,
        };
        ctx.with_framebuffer(buffer.id(), width, height, |ctx| {
            ctx.render_background();
            ctx.render_frame();
        });
        Ok(buffer)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.core.resize(width, height);
    }

    /// Rebuilds the pipeline graph from the current options. Required
    /// after changing any graph-shaping option.
    pub fn rebuild_pipeline(&mut self) -> Result<()> {
        self.pipeline = builder::create_pipeline(
            &self.core.env.device,
            &self.core.env.options,
            self.core.env.canvas_width,
            self.core.env.canvas_height,
        )?;
        Ok(())
    }

    /// Sets a background image blitted behind every scene pass.
    pub fn set_background_image(&mut self, texture: Rc<Texture>) -> Result<()> {
        self.core.background = Some(builder::create_background(
            &self.core.env.device,
            texture,
        )?);
        Ok(())
    }

    pub fn clear_background_image(&mut self) {
        self.core.background = None;
    }

    pub fn set_view_matrix(&mut self, view: Mat4) {
        self.core.env.view_matrix = view;
    }

    pub fn set_wireframe(&mut self, enabled: bool) {
        self.core.wireframe = enabled;
    }

    #[must_use]
    pub fn options(&self) -> &RendererOptions {
        &self.core.env.options
    }

    pub fn options_mut(&mut self) -> &mut RendererOptions {
        &mut self.core.env.options
    }

    #[must_use]
    pub fn pipeline(&self) -> &[NodeRef] {
        &self.pipeline
    }

    #[must_use]
    pub fn frame_stats(&self) -> FrameStats {
        self.core.frame_stats
    }

    #[must_use]
    pub fn core(&self) -> &RenderCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut RenderCore {
        &mut self.core
    }
}
