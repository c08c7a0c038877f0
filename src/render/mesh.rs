//! Meshes
//!
//! [`Mesh`] owns uploaded vertex streams and draws with whatever program
//! and state are currently bound. The fixed attribute layout is
//! 0 = position, 1 = normal, 2 = texcoord; streams a mesh does not carry
//! are simply absent.
//!
//! [`Mesh::screen_quad`] builds the unit-space triangle strip used by every
//! full-screen filter and compositor pass.

use std::rc::Rc;

use crate::errors::Result;
use crate::gpu::{DeviceRc, MeshData, MeshId, PrimitiveMode};
use crate::render::Texture;

/// Per-mesh metadata kept CPU-side.
#[derive(Debug, Clone, Default)]
pub struct MeshMeta {
    pub name: String,
    pub vertex_count: u32,
    /// Number of texcoord channels baked into the mesh.
    pub uv_count: u32,
}

pub struct Mesh {
    device: DeviceRc,
    id: Option<MeshId>,
    mode: PrimitiveMode,
    meta: MeshMeta,
    /// Mesh-level baked lightmap, used when the owning object has none.
    pub lightmap: Option<Rc<Texture>>,
}

impl Mesh {
    /// Uploads the given streams. A mesh with zero vertices is legal and
    /// allocates nothing; drawing it no-ops with a warning.
    pub fn new(device: &DeviceRc, name: &str, data: MeshData) -> Result<Self> {
        let vertex_count = (data.vertices.len() / 3) as u32;
        let uv_count = u32::from(!data.texcoords.is_empty());
        let mode = data.mode;
        let id = if vertex_count == 0 {
            None
        } else {
            Some(device.create_mesh(&data)?)
        };
        Ok(Self {
            device: device.clone(),
            id,
            mode,
            meta: MeshMeta {
                name: name.to_owned(),
                vertex_count,
                uv_count,
            },
            lightmap: None,
        })
    }

    /// Screen-space quad covering `[x, x+w] x [y, y+h]` in clip-like unit
    /// coordinates, as a 4-vertex triangle strip. `flip_v` mirrors the
    /// texture vertically, used when sampling framebuffer attachments.
    pub fn screen_quad(
        device: &DeviceRc,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        flip_v: bool,
    ) -> Result<Self> {
        #[rustfmt::skip]
        let vertices = vec![
            x,     y + h, 0.0,
            x,     y,     0.0,
            x + w, y + h, 0.0,
            x + w, y,     0.0,
        ];
        let texcoords = if flip_v {
            vec![0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0]
        } else {
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0]
        };
        Self::new(
            device,
            "screen-quad",
            MeshData {
                vertices,
                normals: Vec::new(),
                texcoords,
                mode: PrimitiveMode::TriangleStrip,
            },
        )
    }

    #[inline]
    #[must_use]
    pub fn meta(&self) -> &MeshMeta {
        &self.meta
    }

    /// Issues the draw call. Empty meshes no-op; the traversal warns with
    /// the owning object's name.
    pub fn draw(&self) {
        let Some(id) = self.id else {
            return;
        };
        self.device.draw_mesh(id, self.mode, self.meta.vertex_count);
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        if let Some(id) = self.id {
            self.device.delete_mesh(id);
        }
    }
}
