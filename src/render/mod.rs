//! Render Resources
//!
//! Thin owning wrappers over the raw [`crate::gpu`] handles: textures and
//! cube maps with unit-scoped bind/unbind, offscreen framebuffers, and
//! meshes. Each wrapper holds the shared device handle and releases its GPU
//! object on drop.

pub mod framebuffer;
pub mod mesh;
pub mod texture;

pub use framebuffer::FrameBuffer;
pub use mesh::{Mesh, MeshMeta};
pub use texture::{CubeMap, Texture};
