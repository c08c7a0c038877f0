//! GPU Device Abstraction
//!
//! Everything the renderer does on the GPU flows through the [`GpuDevice`]
//! trait. The production backend ([`glow_backend::GlowDevice`]) talks to
//! OpenGL 3.3; tests substitute a recording stub so pipeline ordering,
//! uniform uploads and draw calls can be asserted without a GPU.

pub mod device;
pub mod glow_backend;

pub use device::{
    CullFace, DeviceRc, FramebufferDesc, FramebufferId, FramebufferTarget, GpuDevice, MeshData,
    MeshId, PrimitiveMode, ProgramId, ProgramSource, RenderState, TextureDesc, TextureId,
    TextureKind, UniformData, UniformLocation,
};
pub use glow_backend::GlowDevice;
