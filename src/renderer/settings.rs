//! Renderer Options & Pipeline Configuration
//!
//! This module defines the configuration surface consumed by pipeline
//! assembly ([`crate::renderer::pipeline::builder`]) and by the scene
//! traversal.
//!
//! Every option maps deterministically onto the shape of the render graph:
//!
//! | Option                     | Effect on the graph                        |
//! |----------------------------|--------------------------------------------|
//! | `enable_postprocess`       | scene renders offscreen, composited last   |
//! | `enable_shadow`            | shadow-map pass wired before the scene     |
//! | `bloom.enabled`            | downsample filter + two-stage blur chain   |
//! | neither of the above       | single direct-to-screen scene pass         |
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use ember::RendererOptions;
//!
//! // Default: post-processing with bloom, no shadows.
//! let options = RendererOptions::default();
//!
//! // Bare scene pass straight to the screen:
//! let options = RendererOptions {
//!     enable_postprocess: false,
//!     ..Default::default()
//! };
//! ```

use crate::renderer::shader::ShaderKind;

// ---------------------------------------------------------------------------
// Option groups
// ---------------------------------------------------------------------------

/// Shadow-map pass quality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowQuality {
    /// Side length of the square shadow framebuffer, in pixels.
    pub resolution: u32,
}

impl Default for ShadowQuality {
    fn default() -> Self {
        Self { resolution: 1024 }
    }
}

/// Bloom (glow) post-processing effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomEffect {
    pub enabled: bool,
    /// Downsample factor of the bloom buffers relative to the canvas,
    /// in `(0, 1]`. Smaller is cheaper and blurrier.
    pub threshold: f32,
    /// Gamma applied by the light-pass extraction filter.
    pub gamma: f32,
}

impl Default for BloomEffect {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.1,
            gamma: 1.5,
        }
    }
}

/// Default projection used when the scene's camera carries no parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perspective {
    /// Vertical field of view in degrees.
    pub angle: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Perspective {
    fn default() -> Self {
        Self {
            angle: 50.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

// ---------------------------------------------------------------------------
// RendererOptions
// ---------------------------------------------------------------------------

/// Top-level renderer configuration.
///
/// Changing pipeline-shaping fields (`enable_postprocess`, `enable_shadow`,
/// `bloom`) after construction requires rebuilding the pipeline via
/// [`crate::renderer::Renderer::rebuild_pipeline`].
#[derive(Clone)]
pub struct RendererOptions {
    /// Render the scene offscreen and composite through the screen shader.
    pub enable_postprocess: bool,
    /// Wire a shadow-map pass ahead of the scene pass.
    pub enable_shadow: bool,
    pub shadow_quality: ShadowQuality,
    pub bloom: BloomEffect,
    /// Gamma applied by the final compositor.
    pub postprocess_gamma: f32,
    /// Post-process antialiasing in the final compositor.
    pub enable_antialias: bool,
    /// Clear color of the frame, RGBA.
    pub back_color: [f32; 4],

    pub enable_lighting: bool,
    pub enable_lightmap: bool,
    pub enable_normal_map: bool,
    pub enable_env_map: bool,
    /// Master switch for mesh draws (diagnostics).
    pub enable_draw_mesh: bool,
    /// Invoke per-object custom draw hooks.
    pub enable_custom_draw: bool,
    /// Highlight descendants of selected objects, not just the objects.
    pub enable_highlight_selected_children: bool,

    /// Shader used for objects without an override.
    pub default_shader: ShaderKind,
    pub perspective: Perspective,

    /// Upgrade shader compile/link failures from logged-and-unusable to
    /// hard errors at renderer construction.
    pub strict_shaders: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            enable_postprocess: true,
            enable_shadow: false,
            shadow_quality: ShadowQuality::default(),
            bloom: BloomEffect::default(),
            postprocess_gamma: 1.2,
            enable_antialias: false,
            back_color: [0.93, 0.93, 0.93, 1.0],
            enable_lighting: true,
            enable_lightmap: true,
            enable_normal_map: true,
            enable_env_map: true,
            enable_draw_mesh: true,
            enable_custom_draw: true,
            enable_highlight_selected_children: true,
            default_shader: ShaderKind::Standard,
            perspective: Perspective::default(),
            strict_shaders: false,
        }
    }
}

impl RendererOptions {
    /// True when the frame goes through any offscreen stage.
    #[inline]
    #[must_use]
    pub fn uses_offscreen_pipeline(&self) -> bool {
        self.enable_postprocess || self.enable_shadow
    }
}
