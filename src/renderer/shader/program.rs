//! Shader Programs
//!
//! [`ShaderProgram`] wraps one compiled+linked GPU program. Compile or link
//! failure is logged and leaves the program unusable; draws through an
//! unusable program silently do nothing. `strict` mode upgrades the failure
//! to a hard error for callers that prefer to fail fast.

use std::cell::RefCell;

use rustc_hash::FxHashSet;

use crate::errors::Result;
use crate::gpu::{DeviceRc, ProgramId, ProgramSource, TextureKind};

use super::uniform::{BoundsBinding, TextureSlot, UniformBinding, UniformValue};

pub struct ShaderProgram {
    device: DeviceRc,
    name: String,
    id: Option<ProgramId>,
    warned: RefCell<FxHashSet<String>>,
}

impl ShaderProgram {
    /// Compiles and links. In non-strict mode a failure logs at error level
    /// and yields an unusable program instead of an `Err`.
    pub fn create(
        device: &DeviceRc,
        name: &str,
        vertex: &str,
        fragment: &str,
        strict: bool,
    ) -> Result<Self> {
        let id = match device.create_program(&ProgramSource {
            name,
            vertex,
            fragment,
        }) {
            Ok(id) => Some(id),
            Err(err) if !strict => {
                log::error!("shader `{name}` unusable: {err}");
                None
            }
            Err(err) => return Err(err),
        };

        Ok(Self {
            device: device.clone(),
            name: name.to_owned(),
            id,
            warned: RefCell::new(FxHashSet::default()),
        })
    }

    #[inline]
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.id.is_some()
    }

    /// Makes this program current. Unusable programs unbind instead, so
    /// subsequent draws are harmless no-ops.
    pub fn activate(&self) {
        self.device.use_program(self.id);
    }

    pub fn deactivate(&self) {
        self.device.use_program(None);
    }

    /// Resolves a named uniform into a typed binding. Absent names degrade
    /// to a no-op binding with a one-time debug log.
    pub fn bind_uniform<T: UniformValue>(&self, name: &str) -> UniformBinding<T> {
        let location = self
            .id
            .and_then(|id| self.device.uniform_location(id, name));
        if location.is_none() && self.warned.borrow_mut().insert(name.to_owned()) {
            log::debug!("shader `{}`: uniform `{name}` not found", self.name);
        }
        UniformBinding::new(self.device.clone(), location)
    }

    /// Binds a sampler to a fixed texture unit and resolves its `has…`
    /// companion. The sampler index is uploaded immediately; the program
    /// must be active.
    pub fn bind_texture_slot(
        &self,
        name: &str,
        has_name: &str,
        unit: u32,
        kind: TextureKind,
    ) -> TextureSlot {
        let sampler: UniformBinding<i32> = self.bind_uniform(name);
        sampler.set(unit as i32);
        let has = self.bind_uniform(has_name);
        TextureSlot::new(self.device.clone(), unit, kind, has)
    }

    /// Resolves the `.min/.max/.origin` members of a bounding-box uniform.
    pub fn bind_bounds(&self, name: &str) -> BoundsBinding {
        BoundsBinding::new(
            self.bind_uniform(&format!("{name}.min")),
            self.bind_uniform(&format!("{name}.max")),
            self.bind_uniform(&format!("{name}.origin")),
        )
    }
}
