//! Shader Layer
//!
//! Every draw goes through a [`SceneShader`]: a compiled program plus the
//! per-scene / per-object / per-mesh binding hooks that feed it. The set of
//! variants is closed ([`ShaderKind`]) and lives in one [`ShaderSet`], so
//! shader selection is an enum dispatch rather than dynamic lookup.
//!
//! Scope discipline: `begin_scene`/`end_scene` and `begin_object`/
//! `end_object` are strictly paired and nested (scene ⊃ object ⊃ mesh).
//! Variants track nesting with [`ScopeStack`], which asserts balance in
//! debug builds. GPU state toggled in `begin_object` is reset
//! unconditionally in `end_object`, so a variant's reset is idempotent.

pub mod billboard;
pub mod panorama;
pub mod program;
pub mod screen;
pub mod shadow;
pub mod simple;
pub mod solid_color;
pub mod standard;
pub mod uniform;
pub mod viewer;
pub mod wireframe;

use crate::errors::Result;
use crate::gpu::DeviceRc;
use crate::render::Mesh;
use crate::renderer::core::RenderEnv;
use crate::scene::{Scene, SceneObject};

pub use billboard::BillboardShader;
pub use panorama::PanoramaShader;
pub use program::ShaderProgram;
pub use screen::{FilterMode, ScreenShader};
pub use shadow::ShadowMapShader;
pub use simple::SimpleShader;
pub use solid_color::SolidColorShader;
pub use standard::StandardShader;
pub use uniform::{BoundsBinding, TextureSlot, UniformBinding, UniformValue};
pub use viewer::ViewerShader;
pub use wireframe::WireframeShader;

/// Fixed texture unit assignments shared by the shader variants.
pub mod units {
    pub const DIFFUSE: u32 = 0;
    pub const NORMAL_MAP: u32 = 1;
    pub const LIGHTMAP: u32 = 2;
    pub const ENV_MAP: u32 = 3;
    pub const REF_MAP: u32 = 4;
    pub const SHADOW_MAP: u32 = 5;
    pub const SHADOW_MAP_2D: u32 = 6;
    /// Secondary input of the screen shader.
    pub const SCREEN_TEX2: u32 = 1;
}

/// Identifies one shader variant in the closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Standard,
    Simple,
    Billboard,
    SolidColor,
    Panorama,
    Viewer,
    Wireframe,
    Screen,
    ShadowMap,
}

/// Begin/end nesting tracker embedded in each variant.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scene_depth: usize,
    object_depth: usize,
    in_mesh: bool,
}

impl ScopeStack {
    pub fn enter_scene(&mut self) {
        self.scene_depth += 1;
    }

    pub fn leave_scene(&mut self) {
        debug_assert!(self.object_depth == 0, "end_scene inside an open object scope");
        debug_assert!(self.scene_depth > 0, "unbalanced end_scene");
        self.scene_depth = self.scene_depth.saturating_sub(1);
    }

    pub fn enter_object(&mut self) {
        self.object_depth += 1;
    }

    pub fn leave_object(&mut self) {
        debug_assert!(self.object_depth > 0, "unbalanced end_object");
        self.object_depth = self.object_depth.saturating_sub(1);
    }

    pub fn enter_mesh(&mut self) {
        self.in_mesh = true;
    }

    pub fn leave_mesh(&mut self) {
        self.in_mesh = false;
    }

    #[inline]
    #[must_use]
    pub fn scene_depth(&self) -> usize {
        self.scene_depth
    }

    #[inline]
    #[must_use]
    pub fn object_depth(&self) -> usize {
        self.object_depth
    }
}

/// The per-scene / per-object / per-mesh binding protocol.
///
/// A variant only overrides the hooks it has state for; the defaults are
/// no-ops. Callers activate the program through the renderer's shader stack
/// before invoking any hook.
pub trait SceneShader {
    fn program(&self) -> &ShaderProgram;

    fn begin_scene(&mut self, scene: &Scene, env: &RenderEnv) {
        let _ = (scene, env);
    }

    fn end_scene(&mut self, env: &RenderEnv) {
        let _ = env;
    }

    fn begin_object(&mut self, obj: &SceneObject, env: &RenderEnv) {
        let _ = (obj, env);
    }

    fn end_object(&mut self, obj: &SceneObject, env: &RenderEnv) {
        let _ = (obj, env);
    }

    fn begin_mesh(&mut self, mesh: &Mesh, env: &RenderEnv) {
        let _ = (mesh, env);
    }

    fn end_mesh(&mut self, env: &RenderEnv) {
        let _ = env;
    }
}

/// All shader variants, compiled once at renderer construction.
pub struct ShaderSet {
    pub standard: StandardShader,
    pub simple: SimpleShader,
    pub billboard: BillboardShader,
    pub solid_color: SolidColorShader,
    pub panorama: PanoramaShader,
    pub viewer: ViewerShader,
    pub wireframe: WireframeShader,
    pub screen: ScreenShader,
    pub shadow_map: ShadowMapShader,
}

impl ShaderSet {
    /// Compiles every variant. In non-strict mode a failed program is
    /// logged and its variant draws nothing.
    pub fn create(device: &DeviceRc, strict: bool) -> Result<Self> {
        Ok(Self {
            standard: StandardShader::create(device, strict)?,
            simple: SimpleShader::create(device, strict)?,
            billboard: BillboardShader::create(device, strict)?,
            solid_color: SolidColorShader::create(device, strict)?,
            panorama: PanoramaShader::create(device, strict)?,
            viewer: ViewerShader::create(device, strict)?,
            wireframe: WireframeShader::create(device, strict)?,
            screen: ScreenShader::create(device, strict)?,
            shadow_map: ShadowMapShader::create(device, strict)?,
        })
    }

    #[must_use]
    pub fn get(&self, kind: ShaderKind) -> &dyn SceneShader {
        match kind {
            ShaderKind::Standard => &self.standard,
            ShaderKind::Simple => &self.simple,
            ShaderKind::Billboard => &self.billboard,
            ShaderKind::SolidColor => &self.solid_color,
            ShaderKind::Panorama => &self.panorama,
            ShaderKind::Viewer => &self.viewer,
            ShaderKind::Wireframe => &self.wireframe,
            ShaderKind::Screen => &self.screen,
            ShaderKind::ShadowMap => &self.shadow_map,
        }
    }

    pub fn get_mut(&mut self, kind: ShaderKind) -> &mut dyn SceneShader {
        match kind {
            ShaderKind::Standard => &mut self.standard,
            ShaderKind::Simple => &mut self.simple,
            ShaderKind::Billboard => &mut self.billboard,
            ShaderKind::SolidColor => &mut self.solid_color,
            ShaderKind::Panorama => &mut self.panorama,
            ShaderKind::Viewer => &mut self.viewer,
            ShaderKind::Wireframe => &mut self.wireframe,
            ShaderKind::Screen => &mut self.screen,
            ShaderKind::ShadowMap => &mut self.shadow_map,
        }
    }
}
