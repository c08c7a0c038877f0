//! Scene Model
//!
//! The renderer-facing scene description: a flat list of root objects, each
//! an immutable-during-render tree of [`SceneObject`]s. Authoring, loading
//! and animation live outside the engine; the structures here are what the
//! traversal in [`crate::renderer`] reads.
//!
//! Objects are shared as `Rc` ([`ObjectRef`]) so the per-frame transparency
//! and light-selection lists can hold them without lifetimes threading
//! through the renderer.

pub mod bounding_box;

use std::rc::Rc;

use glam::{Mat4, Vec2, Vec3};

use crate::gpu::GpuDevice;
use crate::render::{CubeMap, Mesh, Texture};
use crate::renderer::shader::ShaderKind;
pub use bounding_box::BoundingBox;

/// Shared handle to a scene object.
pub type ObjectRef = Rc<SceneObject>;

/// Object category tag; drives default shader selection and pass skipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectKind {
    #[default]
    Generic,
    /// Cameras are never rasterized (shadow pass skips them explicitly).
    Camera,
    /// Camera-facing quad, drawn with the billboard shader.
    Billboard,
    /// Inside-out environment sphere, drawn with the panorama shader.
    Panorama,
}

/// Tagged material description. Every field is optional; absent fields fall
/// back to shader defaults at bind time, so partially specified materials
/// never need per-draw type sniffing.
#[derive(Clone, Default)]
pub struct Material {
    pub tex: Option<Rc<Texture>>,
    /// Cube-map diffuse, sampled by the panorama shader.
    pub cube: Option<Rc<CubeMap>>,
    pub color: Option<Vec3>,
    pub tex_tiling: Option<Vec2>,
    pub roughness: Option<f32>,
    pub glossy: Option<f32>,
    pub emission: Option<f32>,
    /// 0 = fully opaque, 1 = fully transparent.
    pub transparency: Option<f32>,
    pub normal_map: Option<Rc<Texture>>,
    pub normal_mipmap: Option<f32>,
    pub normal_intensity: Option<f32>,
    pub lightmap: Option<Rc<Texture>>,
    pub refmap: Option<Rc<CubeMap>>,
}

/// Per-object shader override.
#[derive(Debug, Clone, Copy)]
pub struct ShaderOverride {
    pub kind: ShaderKind,
    /// Color handed to shaders that take one (e.g. solid color).
    pub color: Option<Vec3>,
}

/// Projection parameters for camera objects.
#[derive(Debug, Clone, Copy)]
pub struct CameraParams {
    /// Vertical field of view in degrees.
    pub field_of_view: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            field_of_view: 50.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// One node of the scene tree.
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub visible: bool,
    /// Object-level opacity; multiplied with material transparency.
    pub opacity: f32,
    /// Per-object wireframe override.
    pub wireframe: bool,
    /// World transform. Composition with parents is an authoring concern.
    pub transform: Mat4,
    pub mat: Option<Material>,
    pub meshes: Vec<Rc<Mesh>>,
    pub children: Vec<ObjectRef>,
    pub shader: Option<ShaderOverride>,
    pub receive_light: bool,
    /// World-space bounds when the object owns geometry.
    pub bounds: Option<BoundingBox>,
    pub camera: Option<CameraParams>,
    /// Optional raw-device hook invoked between `begin_object` and the
    /// object's mesh draws, when custom drawing is enabled in options.
    pub on_draw: Option<Box<dyn Fn(&dyn GpuDevice)>>,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: ObjectKind::Generic,
            visible: true,
            opacity: 1.0,
            wireframe: false,
            transform: Mat4::IDENTITY,
            mat: None,
            meshes: Vec::new(),
            children: Vec::new(),
            shader: None,
            receive_light: true,
            bounds: None,
            camera: None,
            on_draw: None,
        }
    }
}

impl SceneObject {
    /// Opacity actually used for blending: object opacity scaled by the
    /// material's transparency, clamped to `[0, 1]`.
    #[must_use]
    pub fn effective_opacity(&self) -> f32 {
        let transparency = self
            .mat
            .as_ref()
            .and_then(|m| m.transparency)
            .unwrap_or(0.0);
        (self.opacity * (1.0 - transparency)).clamp(0.0, 1.0)
    }

    /// Representative world location: bounding-box center when the object
    /// owns geometry, the transform origin otherwise.
    #[must_use]
    pub fn world_location(&self) -> Vec3 {
        if !self.meshes.is_empty() {
            if let Some(bounds) = &self.bounds {
                return bounds.origin();
            }
        }
        self.transform.w_axis.truncate()
    }
}

/// Baked shadow lookup carried by a scene: a cube map sampled within the
/// bounds it was baked for.
pub struct ShadowMapInfo {
    pub texture: Rc<CubeMap>,
    pub bounds: BoundingBox,
}

/// What the renderer consumes each frame.
#[derive(Default)]
pub struct Scene {
    pub objects: Vec<ObjectRef>,
    pub main_camera: Option<ObjectRef>,
    /// Directional light descriptor; its transform origin gives the
    /// direction, its material color the light color.
    pub sun: Option<ObjectRef>,
    pub shadow_map: Option<ShadowMapInfo>,
    /// Objects drawn again with the highlight pass after the main pass.
    pub selected_objects: Vec<ObjectRef>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: SceneObject) -> ObjectRef {
        let obj = Rc::new(object);
        self.objects.push(Rc::clone(&obj));
        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_opacity_combines_object_and_material() {
        let mut obj = SceneObject {
            opacity: 0.5,
            ..SceneObject::default()
        };
        assert!((obj.effective_opacity() - 0.5).abs() < 1e-6);

        obj.mat = Some(Material {
            transparency: Some(0.5),
            ..Material::default()
        });
        assert!((obj.effective_opacity() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn effective_opacity_is_clamped() {
        let obj = SceneObject {
            opacity: 3.0,
            ..SceneObject::default()
        };
        assert!((obj.effective_opacity() - 1.0).abs() < 1e-6);

        let obj = SceneObject {
            opacity: 1.0,
            mat: Some(Material {
                transparency: Some(2.0),
                ..Material::default()
            }),
            ..SceneObject::default()
        };
        assert!((obj.effective_opacity() - 0.0).abs() < 1e-6);
    }

    #[test]
    fn world_location_prefers_bounds_center_with_geometry() {
        let obj = SceneObject {
            transform: Mat4::from_translation(Vec3::new(9.0, 9.0, 9.0)),
            ..SceneObject::default()
        };
        // No meshes: transform origin wins even when bounds exist.
        assert_eq!(obj.world_location(), Vec3::new(9.0, 9.0, 9.0));
    }
}
