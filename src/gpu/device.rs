//! GPU Device Trait
//!
//! [`GpuDevice`] is the seam between the renderer and the graphics API.
//! It models the GL-style machine the pipeline is built on: linked shader
//! programs with named uniform locations, numbered texture units, a single
//! bound framebuffer, and a handful of global raster-state toggles.
//!
//! # Design
//!
//! - All methods take `&self`; backends use interior mutability. The engine
//!   is single-threaded per frame, so shared access is `Rc`, not `Arc`.
//! - Resources are referred to by opaque slotmap keys so a stub backend can
//!   allocate handles without any GPU.
//! - Uniform uploads are funneled through one [`UniformData`] enum, which
//!   keeps the trait object-safe and makes uniform traffic easy to spy on
//!   in tests.

use std::rc::Rc;

use crate::errors::Result;

slotmap::new_key_type! {
    /// Handle to a linked shader program.
    pub struct ProgramId;
    /// Handle to a texture object (2D or cube).
    pub struct TextureId;
    /// Handle to an offscreen framebuffer.
    pub struct FramebufferId;
    /// Handle to an uploaded mesh (vertex buffers + layout).
    pub struct MeshId;
}

/// Backend-assigned dense index of a resolved uniform within a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Shared handle to the device in use. The engine is single-threaded;
/// every subsystem that needs the GPU holds one of these.
pub type DeviceRc = Rc<dyn GpuDevice>;

/// Vertex + fragment source pair handed to [`GpuDevice::create_program`].
#[derive(Debug, Clone)]
pub struct ProgramSource<'a> {
    /// Program name, used in logs and error reports.
    pub name: &'a str,
    /// Vertex shader source (GLSL).
    pub vertex: &'a str,
    /// Fragment shader source (GLSL).
    pub fragment: &'a str,
}

/// Distinguishes 2D textures from cube maps at bind time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    /// Standard 2D texture.
    Texture2D,
    /// Six-faced cube map.
    CubeMap,
}

/// Texture creation descriptor.
///
/// `pixels: None` allocates uninitialized storage — used for the shared
/// "empty" placeholder textures and for framebuffer color attachments.
#[derive(Debug, Clone)]
pub struct TextureDesc<'a> {
    pub kind: TextureKind,
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 pixel data, or `None` for uninitialized storage.
    pub pixels: Option<&'a [u8]>,
}

/// Framebuffer creation descriptor.
#[derive(Debug, Clone, Copy)]
pub struct FramebufferDesc {
    pub width: u32,
    pub height: u32,
    /// Whether to attach a depth renderbuffer. Filter-only passes skip it.
    pub depth: bool,
}

/// A created framebuffer together with its color attachment.
#[derive(Debug, Clone, Copy)]
pub struct FramebufferTarget {
    pub framebuffer: FramebufferId,
    /// Color attachment; this is what downstream pipeline nodes sample.
    pub texture: TextureId,
}

/// CPU-side mesh data uploaded once via [`GpuDevice::create_mesh`].
///
/// Attribute streams are tightly packed and indexed by the fixed layout
/// convention: 0 = position (vec3), 1 = normal (vec3), 2 = texcoord (vec2).
/// Empty streams are simply not uploaded.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub normals: Vec<f32>,
    pub texcoords: Vec<f32>,
    pub mode: PrimitiveMode,
}

/// Primitive assembly mode for draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveMode {
    #[default]
    Triangles,
    TriangleStrip,
    Lines,
}

/// Toggleable global raster state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Blend,
    DepthTest,
}

/// Face culling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullFace {
    Back,
    Front,
    None,
}

/// One uniform upload. Matrices are column-major, matching glam's memory
/// layout and GL's expectation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformData {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
}

/// The graphics device seam.
///
/// See the module docs for the overall design. Contract highlights:
///
/// - [`uniform_location`](Self::uniform_location) returns `None` for names
///   the linked program does not expose; callers must degrade to a no-op
///   (the uniform layer handles this).
/// - [`bind_framebuffer`](Self::bind_framebuffer) with `None` restores the
///   default (on-screen) target. Nesting discipline is the caller's job —
///   [`crate::renderer::core::RenderCore`] keeps the bind stack.
/// - [`draw_mesh`](Self::draw_mesh) draws with whatever program, textures
///   and state are currently bound.
pub trait GpuDevice {
    // --- Shader programs -------------------------------------------------
    fn create_program(&self, source: &ProgramSource<'_>) -> Result<ProgramId>;
    fn delete_program(&self, program: ProgramId);
    fn use_program(&self, program: Option<ProgramId>);
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    fn set_uniform(&self, location: UniformLocation, value: UniformData);

    // --- Textures --------------------------------------------------------
    fn create_texture(&self, desc: &TextureDesc<'_>) -> Result<TextureId>;
    fn delete_texture(&self, texture: TextureId);
    /// Binds `texture` (or unbinds, with `None`) on the given texture unit.
    fn bind_texture(&self, unit: u32, kind: TextureKind, texture: Option<TextureId>);

    // --- Framebuffers ----------------------------------------------------
    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<FramebufferTarget>;
    fn delete_framebuffer(&self, framebuffer: FramebufferId);
    fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>);

    // --- Meshes ----------------------------------------------------------
    fn create_mesh(&self, data: &MeshData) -> Result<MeshId>;
    fn delete_mesh(&self, mesh: MeshId);
    fn draw_mesh(&self, mesh: MeshId, mode: PrimitiveMode, vertex_count: u32);

    // --- Global state ----------------------------------------------------
    fn set_render_state(&self, state: RenderState, enabled: bool);
    fn set_cull_face(&self, cull: CullFace);
    fn set_viewport(&self, width: u32, height: u32);
    /// Clears color and depth of the currently bound target.
    fn clear(&self, color: [f32; 4]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_data_is_small() {
        // UniformData travels on every set() call; keep it register-friendly.
        assert!(std::mem::size_of::<UniformData>() <= 72);
    }
}
