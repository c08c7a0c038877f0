//! Uniform Bindings
//!
//! [`UniformBinding`] ties a named shader variable to a typed GPU set
//! operation. Resolution happens once, at bind time; a name the linked
//! program does not expose yields a binding whose `set` is a no-op (a
//! one-time debug log is emitted by [`super::program::ShaderProgram`]).
//!
//! [`TextureSlot`] pairs a sampler pinned to a fixed texture unit with its
//! `has…` bool companion; [`BoundsBinding`] is the `.min/.max/.origin` vec3
//! composite used for bounding-box uniforms.

use std::marker::PhantomData;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::gpu::{DeviceRc, TextureId, TextureKind, UniformData, UniformLocation};
use crate::scene::BoundingBox;

/// Value types that can travel through [`UniformBinding::set`].
pub trait UniformValue {
    fn into_uniform(self) -> UniformData;
}

impl UniformValue for bool {
    fn into_uniform(self) -> UniformData {
        UniformData::Bool(self)
    }
}

impl UniformValue for i32 {
    fn into_uniform(self) -> UniformData {
        UniformData::Int(self)
    }
}

impl UniformValue for f32 {
    fn into_uniform(self) -> UniformData {
        UniformData::Float(self)
    }
}

impl UniformValue for [f32; 2] {
    fn into_uniform(self) -> UniformData {
        UniformData::Vec2(self)
    }
}

impl UniformValue for Vec2 {
    fn into_uniform(self) -> UniformData {
        UniformData::Vec2(self.to_array())
    }
}

impl UniformValue for [f32; 3] {
    fn into_uniform(self) -> UniformData {
        UniformData::Vec3(self)
    }
}

impl UniformValue for Vec3 {
    fn into_uniform(self) -> UniformData {
        UniformData::Vec3(self.to_array())
    }
}

impl UniformValue for [f32; 4] {
    fn into_uniform(self) -> UniformData {
        UniformData::Vec4(self)
    }
}

impl UniformValue for Vec4 {
    fn into_uniform(self) -> UniformData {
        UniformData::Vec4(self.to_array())
    }
}

impl UniformValue for Mat3 {
    fn into_uniform(self) -> UniformData {
        UniformData::Mat3(self.to_cols_array())
    }
}

impl UniformValue for Mat4 {
    fn into_uniform(self) -> UniformData {
        UniformData::Mat4(self.to_cols_array())
    }
}

/// Typed handle to one shader uniform. `set` on an unresolved binding is a
/// no-op, never a fault.
pub struct UniformBinding<T: UniformValue> {
    device: DeviceRc,
    location: Option<UniformLocation>,
    _value: PhantomData<fn(T)>,
}

impl<T: UniformValue> UniformBinding<T> {
    pub(super) fn new(device: DeviceRc, location: Option<UniformLocation>) -> Self {
        Self {
            device,
            location,
            _value: PhantomData,
        }
    }

    /// Whether the name resolved in the linked program.
    #[inline]
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.location.is_some()
    }

    pub fn set(&self, value: T) {
        if let Some(location) = self.location {
            self.device.set_uniform(location, value.into_uniform());
        }
    }
}

/// A sampler uniform pinned to a fixed texture unit, with its `has…` bool
/// companion. The sampler index is uploaded once at bind time; `apply`
/// only switches what is bound on the unit.
pub struct TextureSlot {
    device: DeviceRc,
    unit: u32,
    kind: TextureKind,
    has: UniformBinding<bool>,
}

impl TextureSlot {
    pub(super) fn new(
        device: DeviceRc,
        unit: u32,
        kind: TextureKind,
        has: UniformBinding<bool>,
    ) -> Self {
        Self {
            device,
            unit,
            kind,
            has,
        }
    }

    /// Binds `texture` and flags presence, or binds the shared placeholder
    /// and flags absence. The placeholder keeps shader-side sampling
    /// unconditional.
    pub fn apply(&self, texture: Option<TextureId>, placeholder: TextureId) {
        match texture {
            Some(tex) => {
                self.device.bind_texture(self.unit, self.kind, Some(tex));
                self.has.set(true);
            }
            None => {
                self.device
                    .bind_texture(self.unit, self.kind, Some(placeholder));
                self.has.set(false);
            }
        }
    }

    /// Unbinds the unit entirely.
    pub fn clear(&self) {
        self.device.bind_texture(self.unit, self.kind, None);
    }
}

/// Composite binding for a bounding-box uniform struct.
pub struct BoundsBinding {
    min: UniformBinding<Vec3>,
    max: UniformBinding<Vec3>,
    origin: UniformBinding<Vec3>,
}

impl BoundsBinding {
    pub(super) fn new(
        min: UniformBinding<Vec3>,
        max: UniformBinding<Vec3>,
        origin: UniformBinding<Vec3>,
    ) -> Self {
        Self { min, max, origin }
    }

    pub fn set(&self, bounds: &BoundingBox) {
        self.min.set(bounds.min);
        self.max.set(bounds.max);
        self.origin.set(bounds.origin());
    }
}
