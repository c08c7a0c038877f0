//! Offscreen Framebuffers
//!
//! [`FrameBuffer`] owns a GPU framebuffer with a color attachment (and an
//! optional depth buffer for scene passes; filter passes skip it). Binding
//! is not done here: the renderer's framebuffer stack
//! ([`crate::renderer::core::RenderCore::with_framebuffer`]) pairs every
//! bind with a restore of the previous target, which replaces the manual
//! use/disuse discipline.

use crate::errors::Result;
use crate::gpu::{DeviceRc, FramebufferDesc, FramebufferId, TextureId};

pub struct FrameBuffer {
    device: DeviceRc,
    id: FramebufferId,
    texture: TextureId,
    width: u32,
    height: u32,
}

impl FrameBuffer {
    pub fn new(device: &DeviceRc, width: u32, height: u32, depth: bool) -> Result<Self> {
        let target = device.create_framebuffer(&FramebufferDesc {
            width,
            height,
            depth,
        })?;
        Ok(Self {
            device: device.clone(),
            id: target.framebuffer,
            texture: target.texture,
            width,
            height,
        })
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> FramebufferId {
        self.id
    }

    /// Color attachment sampled by downstream pipeline nodes.
    #[inline]
    #[must_use]
    pub fn texture(&self) -> TextureId {
        self.texture
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
}

impl Drop for FrameBuffer {
    fn drop(&mut self) {
        // The backend releases the color attachment with the framebuffer.
        self.device.delete_framebuffer(self.id);
    }
}
