//! Textures
//!
//! [`Texture`] and [`CubeMap`] own a GPU texture object and expose the
//! unit-scoped `use_on` / `disuse_on` pair the shader layer binds through.
//! Both also provide 1x1 transparent placeholders ("empty" textures) so
//! shaders can sample unconditionally while a real asset is still loading.

use crate::errors::Result;
use crate::gpu::{DeviceRc, TextureDesc, TextureId, TextureKind};

/// A 2D RGBA8 texture.
pub struct Texture {
    device: DeviceRc,
    id: TextureId,
    width: u32,
    height: u32,
}

impl Texture {
    /// Uploads tightly packed RGBA8 pixels.
    pub fn from_pixels(device: &DeviceRc, width: u32, height: u32, pixels: &[u8]) -> Result<Self> {
        let id = device.create_texture(&TextureDesc {
            kind: TextureKind::Texture2D,
            width,
            height,
            pixels: Some(pixels),
        })?;
        Ok(Self {
            device: device.clone(),
            id,
            width,
            height,
        })
    }

    /// 1x1 fully transparent placeholder.
    pub fn empty(device: &DeviceRc) -> Result<Self> {
        Self::from_pixels(device, 1, 1, &[0, 0, 0, 0])
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> TextureId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Binds this texture on the given unit.
    pub fn use_on(&self, unit: u32) {
        self.device
            .bind_texture(unit, TextureKind::Texture2D, Some(self.id));
    }

    /// Unbinds whatever 2D texture is on the given unit.
    pub fn disuse_on(&self, unit: u32) {
        self.device.bind_texture(unit, TextureKind::Texture2D, None);
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.device.delete_texture(self.id);
    }
}

/// A six-faced cube map, used for environment/reflection sampling and the
/// scene's baked shadow cube.
pub struct CubeMap {
    device: DeviceRc,
    id: TextureId,
}

impl CubeMap {
    /// Allocates a cube map with every face set to the same RGBA8 data.
    pub fn from_face_pixels(device: &DeviceRc, size: u32, pixels: &[u8]) -> Result<Self> {
        let id = device.create_texture(&TextureDesc {
            kind: TextureKind::CubeMap,
            width: size,
            height: size,
            pixels: Some(pixels),
        })?;
        Ok(Self {
            device: device.clone(),
            id,
        })
    }

    /// 1x1 fully transparent placeholder cube.
    pub fn empty(device: &DeviceRc) -> Result<Self> {
        Self::from_face_pixels(device, 1, &[0, 0, 0, 0])
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn use_on(&self, unit: u32) {
        self.device
            .bind_texture(unit, TextureKind::CubeMap, Some(self.id));
    }

    pub fn disuse_on(&self, unit: u32) {
        self.device.bind_texture(unit, TextureKind::CubeMap, None);
    }
}

impl Drop for CubeMap {
    fn drop(&mut self) {
        self.device.delete_texture(self.id);
    }
}
