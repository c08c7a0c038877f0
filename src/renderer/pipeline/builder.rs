//! Pipeline assembly: maps [`RendererOptions`] onto a concrete node graph.
//!
//! Shapes produced:
//! - neither post-processing nor shadows: a single [`DefaultRenderer`];
//! - otherwise: optional shadow pass -> scene-to-image -> optional
//!   downsample + blur bloom chain -> final compositor, which is the sole
//!   root returned.

use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::Result;
use crate::gpu::DeviceRc;
use crate::render::Texture;
use crate::renderer::settings::RendererOptions;
use crate::renderer::shader::FilterMode;

use super::NodeRef;
use super::nodes::{
    BlurRenderer, DefaultRenderer, ImageFilterRenderer, ImageSource, ImageToScreenRenderer,
    SceneToImageRenderer, ShadowMapRenderer,
};

/// Builds the root node list for the given options.
pub fn create_pipeline(
    device: &DeviceRc,
    options: &RendererOptions,
    canvas_width: u32,
    canvas_height: u32,
) -> Result<Vec<NodeRef>> {
    if !options.uses_offscreen_pipeline() {
        let root: NodeRef = Rc::new(RefCell::new(DefaultRenderer::new()));
        return Ok(vec![root]);
    }

    let shadow: Option<NodeRef> = if options.enable_shadow {
        let node = ShadowMapRenderer::new(device, options.shadow_quality.resolution)?;
        Some(Rc::new(RefCell::new(node)))
    } else {
        None
    };

    let mut scene = SceneToImageRenderer::new();
    scene.set_shadow_map_input(shadow);
    let scene: NodeRef = Rc::new(RefCell::new(scene));

    let blur: Option<NodeRef> = if options.bloom.enabled {
        // Bloom renders at a fraction of the canvas size.
        let bloom_w = ((canvas_width as f32 * options.bloom.threshold) as u32).max(1);
        let bloom_h = ((canvas_height as f32 * options.bloom.threshold) as u32).max(1);

        let mut small =
            ImageFilterRenderer::new(device, bloom_w, bloom_h, FilterMode::LinearInterp, true)?;
        small.gamma = options.bloom.gamma;
        small.set_input(&scene)?;
        let small: NodeRef = Rc::new(RefCell::new(small));

        let mut blur = BlurRenderer::new(device, bloom_w, bloom_h)?;
        blur.set_input(&small)?;
        Some(Rc::new(RefCell::new(blur)))
    } else {
        None
    };

    let mut compositor = ImageToScreenRenderer::new(device, true)?;
    compositor.set_input(&scene)?;
    compositor.set_tex2_input(blur)?;
    compositor.gamma = options.postprocess_gamma;
    compositor.antialias = options.enable_antialias;

    let root: NodeRef = Rc::new(RefCell::new(compositor));
    Ok(vec![root])
}

/// Background node: a constant texture blitted into the current target
/// before the scene draws over it.
pub fn create_background(device: &DeviceRc, texture: Rc<Texture>) -> Result<NodeRef> {
    let source: NodeRef = Rc::new(RefCell::new(ImageSource::new(texture)));
    let mut blit = ImageToScreenRenderer::new(device, false)?;
    blit.set_input(&source)?;
    blit.antialias = false;
    Ok(Rc::new(RefCell::new(blit)))
}
