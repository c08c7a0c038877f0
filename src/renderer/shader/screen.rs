//! Screen / Image Filter Shader
//!
//! One program serves every full-screen pass: plain blits, the bloom
//! light-pass extraction, the separable blur stages and the final
//! compositor. The pass picks a [`FilterMode`] and the fragment shader
//! branches on its integer constant.

use glam::Vec2;

use crate::errors::Result;
use crate::gpu::{DeviceRc, TextureId, TextureKind};
use crate::render::Mesh;
use crate::renderer::core::RenderEnv;

use super::program::ShaderProgram;
use super::uniform::{TextureSlot, UniformBinding};
use super::{ScopeStack, SceneShader, units};

/// Full-screen filter selector. Parsed from the tags used in pipeline
/// configuration, uploaded as an integer shader constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    None,
    LinearInterp,
    BlurHorizontal,
    BlurVertical,
    LightPass,
    GaussBlur3,
    GaussBlur5,
}

impl FilterMode {
    /// Parses a configuration tag. Unknown tags warn and fall back to
    /// `None` (pass-through).
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "none" => Self::None,
            "linear-interp" => Self::LinearInterp,
            "blur-hor" => Self::BlurHorizontal,
            "blur-ver" => Self::BlurVertical,
            "light-pass" => Self::LightPass,
            "guass-blur3" => Self::GaussBlur3,
            "guass-blur5" => Self::GaussBlur5,
            other => {
                log::warn!("unknown filter tag `{other}`, using pass-through");
                Self::None
            }
        }
    }

    /// Integer constant matching the fragment shader's branch table.
    #[must_use]
    pub fn shader_constant(self) -> i32 {
        match self {
            Self::None => 0,
            Self::LinearInterp => 1,
            Self::BlurHorizontal => 2,
            Self::BlurVertical => 3,
            Self::LightPass => 4,
            Self::GaussBlur3 => 5,
            Self::GaussBlur5 => 6,
        }
    }
}

pub struct ScreenShader {
    device: DeviceRc,
    program: ShaderProgram,
    scope: ScopeStack,
    tex2: TextureSlot,
    resolution: UniformBinding<Vec2>,
    filter_type: UniformBinding<i32>,
    is_vertical: UniformBinding<bool>,
    gamma: UniformBinding<f32>,
    antialias: UniformBinding<bool>,
}

impl ScreenShader {
    pub fn create(device: &DeviceRc, strict: bool) -> Result<Self> {
        let program = ShaderProgram::create(
            device,
            "screen",
            include_str!("../../shaders/screen.vert"),
            include_str!("../../shaders/screen.frag"),
            strict,
        )?;
        program.activate();

        let sampler: UniformBinding<i32> = program.bind_uniform("tex");
        sampler.set(0);
        let tex2 = program.bind_texture_slot(
            "tex2",
            "hasTex2",
            units::SCREEN_TEX2,
            TextureKind::Texture2D,
        );
        let resolution = program.bind_uniform("resolution");
        let filter_type = program.bind_uniform("filterType");
        let is_vertical = program.bind_uniform("isVertical");
        let gamma = program.bind_uniform("gammaFactor");
        let antialias = program.bind_uniform("enableAntialias");

        // Sensible defaults so a pass that sets nothing blits unchanged.
        filter_type.set(FilterMode::None.shader_constant());
        is_vertical.set(false);
        gamma.set(1.0);
        antialias.set(false);

        program.deactivate();

        Ok(Self {
            device: device.clone(),
            program,
            scope: ScopeStack::default(),
            tex2,
            resolution,
            filter_type,
            is_vertical,
            gamma,
            antialias,
        })
    }

    /// Binds the primary input on unit 0.
    pub fn set_texture(&self, texture: TextureId) {
        self.device
            .bind_texture(units::DIFFUSE, TextureKind::Texture2D, Some(texture));
    }

    pub fn clear_texture(&self) {
        self.device
            .bind_texture(units::DIFFUSE, TextureKind::Texture2D, None);
    }

    /// Binds (or clears) the secondary input, e.g. the bloom layer.
    pub fn set_tex2(&self, texture: Option<TextureId>, placeholder: TextureId) {
        self.tex2.apply(texture, placeholder);
    }

    pub fn set_resolution(&self, width: u32, height: u32) {
        self.resolution
            .set(Vec2::new(width as f32, height as f32));
    }

    pub fn set_filter(&self, mode: FilterMode) {
        self.filter_type.set(mode.shader_constant());
    }

    pub fn set_vertical(&self, vertical: bool) {
        self.is_vertical.set(vertical);
    }

    pub fn set_gamma(&self, gamma: f32) {
        self.gamma.set(gamma);
    }

    pub fn set_antialias(&self, enabled: bool) {
        self.antialias.set(enabled);
    }
}

impl SceneShader for ScreenShader {
    fn program(&self) -> &ShaderProgram {
        &self.program
    }

    fn begin_mesh(&mut self, _mesh: &Mesh, _env: &RenderEnv) {
        self.scope.enter_mesh();
    }

    fn end_mesh(&mut self, _env: &RenderEnv) {
        self.scope.leave_mesh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_tags_map_to_shader_constants() {
        let cases = [
            ("none", 0),
            ("linear-interp", 1),
            ("blur-hor", 2),
            ("blur-ver", 3),
            ("light-pass", 4),
            ("guass-blur3", 5),
            ("guass-blur5", 6),
        ];
        for (tag, constant) in cases {
            assert_eq!(FilterMode::from_tag(tag).shader_constant(), constant, "tag {tag}");
        }
    }

    #[test]
    fn unknown_tag_falls_back_to_pass_through() {
        assert_eq!(FilterMode::from_tag("sepia"), FilterMode::None);
    }
}
