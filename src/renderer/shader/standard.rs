//! Standard Shader
//!
//! The full material pipeline: diffuse/normal/light maps, environment and
//! reflection cubes, baked cube shadows plus the optional 2D shadow map
//! injected by the shadow pass, sun light and a capped set of emissive
//! point lights selected per scene.
//!
//! # Light selection
//!
//! Emissive objects are collected once per `begin_scene`, insertion-sorted
//! by distance to the camera, discarded beyond [`LIGHT_MAX_DISTANCE`] and
//! capped at [`LIGHT_MAX_COUNT`]. The resulting list is uploaded once per
//! scene, not per object.

use glam::{Mat3, Mat4, Vec2, Vec3};

use crate::errors::Result;
use crate::gpu::{DeviceRc, RenderState, TextureId, TextureKind};
use crate::render::Mesh;
use crate::renderer::core::RenderEnv;
use crate::scene::{BoundingBox, ObjectRef, Scene, SceneObject};

use super::program::ShaderProgram;
use super::uniform::{BoundsBinding, TextureSlot, UniformBinding};
use super::{ScopeStack, SceneShader, units};

/// Most emissive objects uploaded per scene.
pub const LIGHT_MAX_COUNT: usize = 15;
/// Emissive objects farther than this from the camera are ignored.
pub const LIGHT_MAX_DISTANCE: f32 = 50.0;

const DEFAULT_COLOR: Vec3 = Vec3::new(0.7, 0.7, 0.7);
const DEFAULT_TILING: Vec2 = Vec2::ONE;
const DEFAULT_ROUGHNESS: f32 = 0.5;

/// One selected emissive object.
#[derive(Debug, Clone, Copy)]
pub struct LightSource {
    pub pos: Vec3,
    /// Material color premultiplied by emission strength.
    pub color: Vec3,
    pub distance: f32,
}

struct LightUniform {
    pos: UniformBinding<Vec3>,
    color: UniformBinding<Vec3>,
}

pub struct StandardShader {
    program: ShaderProgram,
    scope: ScopeStack,

    project_view: UniformBinding<Mat4>,
    model: UniformBinding<Mat4>,
    model3x3: UniformBinding<Mat3>,
    normal_matrix: UniformBinding<Mat4>,

    sun_dir: UniformBinding<Vec3>,
    sun_light: UniformBinding<Vec3>,
    camera_loc: UniformBinding<Vec3>,

    receive_light: UniformBinding<bool>,
    opacity: UniformBinding<f32>,
    color: UniformBinding<Vec3>,
    tex_tiling: UniformBinding<Vec2>,
    roughness: UniformBinding<f32>,
    glossy: UniformBinding<f32>,
    emission: UniformBinding<f32>,
    normal_mipmap: UniformBinding<f32>,
    normal_intensity: UniformBinding<f32>,
    has_uv2: UniformBinding<bool>,

    diffuse: TextureSlot,
    normal_map: TextureSlot,
    lightmap: TextureSlot,
    env_map: TextureSlot,
    ref_map: TextureSlot,
    ref_map_type: UniformBinding<i32>,
    ref_map_bounds: BoundsBinding,
    shadow_cube: TextureSlot,
    shadow_bounds: BoundsBinding,
    shadow_2d: TextureSlot,

    light_uniforms: Vec<LightUniform>,
    light_count: UniformBinding<i32>,
    light_sources: Vec<LightSource>,

    /// Texture injected by the shadow pipeline node for the duration of
    /// the scene draw it feeds.
    shadow_map_2d: Option<TextureId>,
    /// Set while the current object carries its own lightmap, so meshes
    /// don't override it with their baked one.
    object_lightmap_bound: bool,
}

impl StandardShader {
    pub fn create(device: &DeviceRc, strict: bool) -> Result<Self> {
        let program = ShaderProgram::create(
            device,
            "standard",
            include_str!("../../shaders/standard.vert"),
            include_str!("../../shaders/standard.frag"),
            strict,
        )?;
        program.activate();

        let project_view = program.bind_uniform("projectViewMatrix");
        let model = program.bind_uniform("modelMatrix");
        let model3x3 = program.bind_uniform("modelMatrix3x3");
        let normal_matrix = program.bind_uniform("normalMatrix");

        let sun_dir = program.bind_uniform("sundir");
        let sun_light = program.bind_uniform("sunlight");
        let camera_loc = program.bind_uniform("camera.loc");

        let receive_light = program.bind_uniform("receiveLight");
        let opacity = program.bind_uniform("opacity");
        let color = program.bind_uniform("color");
        let tex_tiling = program.bind_uniform("texTiling");
        let roughness = program.bind_uniform("roughness");
        let glossy = program.bind_uniform("glossy");
        let emission = program.bind_uniform("emission");
        let normal_mipmap = program.bind_uniform("normalMipmap");
        let normal_intensity = program.bind_uniform("normalIntensity");
        let has_uv2 = program.bind_uniform("hasUV2");

        let diffuse = program.bind_texture_slot(
            "diffuseMap",
            "hasDiffuseMap",
            units::DIFFUSE,
            TextureKind::Texture2D,
        );
        let normal_map = program.bind_texture_slot(
            "normalMap",
            "hasNormalMap",
            units::NORMAL_MAP,
            TextureKind::Texture2D,
        );
        let lightmap = program.bind_texture_slot(
            "lightMap",
            "hasLightMap",
            units::LIGHTMAP,
            TextureKind::Texture2D,
        );
        let env_map = program.bind_texture_slot(
            "envMap",
            "hasEnvMap",
            units::ENV_MAP,
            TextureKind::CubeMap,
        );
        let ref_map = program.bind_texture_slot(
            "refMap",
            "hasRefMap",
            units::REF_MAP,
            TextureKind::CubeMap,
        );
        let ref_map_type = program.bind_uniform("refMapType");
        let ref_map_bounds = program.bind_bounds("refMapBox");
        let shadow_cube = program.bind_texture_slot(
            "shadowMap",
            "hasShadowMap",
            units::SHADOW_MAP,
            TextureKind::CubeMap,
        );
        let shadow_bounds = program.bind_bounds("shadowMapBox");
        let shadow_2d = program.bind_texture_slot(
            "shadowMap2D",
            "hasShadowMap2D",
            units::SHADOW_MAP_2D,
            TextureKind::Texture2D,
        );

        // Resolve light array members until the program stops exposing
        // them, so the CPU-side table matches the compiled array size.
        let mut light_uniforms = Vec::new();
        for i in 0..LIGHT_MAX_COUNT {
            let pos: UniformBinding<Vec3> = program.bind_uniform(&format!("lights[{i}].pos"));
            if !pos.is_bound() {
                break;
            }
            let color = program.bind_uniform(&format!("lights[{i}].color"));
            light_uniforms.push(LightUniform { pos, color });
        }
        let light_count = program.bind_uniform("lightCount");

        program.deactivate();

        Ok(Self {
            program,
            scope: ScopeStack::default(),
            project_view,
            model,
            model3x3,
            normal_matrix,
            sun_dir,
            sun_light,
            camera_loc,
            receive_light,
            opacity,
            color,
            tex_tiling,
            roughness,
            glossy,
            emission,
            normal_mipmap,
            normal_intensity,
            has_uv2,
            diffuse,
            normal_map,
            lightmap,
            env_map,
            ref_map,
            ref_map_type,
            ref_map_bounds,
            shadow_cube,
            shadow_bounds,
            shadow_2d,
            light_uniforms,
            light_count,
            light_sources: Vec::new(),
            shadow_map_2d: None,
            object_lightmap_bound: false,
        })
    }

    /// Injects (or clears) the shadow texture produced by the shadow-map
    /// pipeline node. Applied at the next `begin_scene`.
    pub fn set_shadow_map_2d(&mut self, texture: Option<TextureId>) {
        self.shadow_map_2d = texture;
    }

    #[must_use]
    pub fn shadow_map_2d(&self) -> Option<TextureId> {
        self.shadow_map_2d
    }

    #[must_use]
    pub fn light_sources(&self) -> &[LightSource] {
        &self.light_sources
    }

    #[must_use]
    pub fn scope(&self) -> &ScopeStack {
        &self.scope
    }

    /// Rebuilds the capped, distance-sorted emissive-object list.
    pub fn check_scene_light_sources(&mut self, scene: &Scene, camera_location: Vec3) {
        self.light_sources.clear();
        for obj in &scene.objects {
            self.scan_light_sources(obj, camera_location);
        }
        self.light_sources.truncate(LIGHT_MAX_COUNT);
    }

    fn scan_light_sources(&mut self, obj: &ObjectRef, camera_location: Vec3) {
        if obj.visible {
            if let Some(mat) = &obj.mat {
                if let Some(emission) = mat.emission {
                    if emission > 0.0 {
                        let pos = obj.world_location();
                        let distance = (pos - camera_location).length();
                        if distance <= LIGHT_MAX_DISTANCE {
                            let color = mat
                                .color
                                .map_or(Vec3::splat(emission), |c| c * emission);
                            let source = LightSource {
                                pos,
                                color,
                                distance,
                            };
                            let slot = self
                                .light_sources
                                .iter()
                                .take(LIGHT_MAX_COUNT)
                                .position(|l| distance < l.distance);
                            match slot {
                                Some(i) => self.light_sources.insert(i, source),
                                None => self.light_sources.push(source),
                            }
                        }
                    }
                }
            }
        }
        for child in &obj.children {
            self.scan_light_sources(child, camera_location);
        }
    }
}

impl SceneShader for StandardShader {
    fn program(&self) -> &ShaderProgram {
        &self.program
    }

    fn begin_scene(&mut self, scene: &Scene, env: &RenderEnv) {
        self.scope.enter_scene();

        self.project_view.set(env.projection_view);

        let camera_location = scene
            .main_camera
            .as_ref()
            .map_or(Vec3::ZERO, |c| c.world_location());
        self.camera_loc.set(camera_location);

        // Lights, uploaded once per scene.
        let light_count = if env.options.enable_lighting {
            self.check_scene_light_sources(scene, camera_location);
            let count = self.light_sources.len().min(self.light_uniforms.len());
            for i in 0..count {
                let source = self.light_sources[i];
                let uniform = &self.light_uniforms[i];
                uniform.pos.set(source.pos);
                uniform.color.set(source.color);
            }
            count
        } else {
            0
        };
        self.light_count.set(light_count as i32);

        // Sun.
        if let Some(sun) = &scene.sun {
            let dir = sun.world_location().normalize_or_zero();
            self.sun_dir.set(dir);
            let color = sun
                .mat
                .as_ref()
                .and_then(|m| m.color)
                .unwrap_or(env.default_sun_color);
            self.sun_light.set(color * dir.dot(Vec3::Y));
        }

        // Baked shadow cube.
        match &scene.shadow_map {
            Some(info) => {
                self.shadow_cube
                    .apply(Some(info.texture.id()), env.empty_cubemap.id());
                self.shadow_bounds.set(&info.bounds);
            }
            None => {
                self.shadow_cube.apply(None, env.empty_cubemap.id());
            }
        }

        // Shadow map injected by the pipeline, if any.
        self.shadow_2d
            .apply(self.shadow_map_2d, env.empty_texture.id());
    }

    fn end_scene(&mut self, _env: &RenderEnv) {
        self.scope.leave_scene();
    }

    fn begin_object(&mut self, obj: &SceneObject, env: &RenderEnv) {
        self.scope.enter_object();

        self.model.set(obj.transform);
        self.normal_matrix.set(obj.transform.inverse().transpose());
        self.receive_light.set(obj.receive_light);

        let mat = obj.mat.as_ref();

        // Diffuse.
        let texture = mat.and_then(|m| m.tex.as_ref()).map(|t| t.id());
        self.diffuse.apply(texture, env.empty_texture.id());

        // Normal map.
        let normal_map = mat.and_then(|m| m.normal_map.as_ref()).map(|t| t.id());
        if env.options.enable_normal_map && normal_map.is_some() {
            self.normal_map.apply(normal_map, env.empty_texture.id());
            self.model3x3.set(Mat3::from_mat4(obj.transform));
            let mipmap = mat
                .and_then(|m| m.normal_mipmap)
                .map_or(0.0, |v| -v.clamp(0.0, 5.0) * 5.0);
            self.normal_mipmap.set(mipmap);
            self.normal_intensity
                .set(mat.and_then(|m| m.normal_intensity).unwrap_or(1.0));
        } else {
            self.normal_map.apply(None, env.empty_texture.id());
        }

        // Lightmap (object level; meshes may supply their own).
        let lightmap = mat.and_then(|m| m.lightmap.as_ref()).map(|t| t.id());
        self.object_lightmap_bound = env.options.enable_lightmap && lightmap.is_some();
        if self.object_lightmap_bound {
            self.lightmap.apply(lightmap, env.empty_texture.id());
        } else {
            self.lightmap.apply(None, env.empty_texture.id());
        }

        // Reflection cube.
        let refmap = mat.and_then(|m| m.refmap.as_ref());
        if env.options.enable_env_map && refmap.is_some() {
            self.ref_map
                .apply(refmap.map(|c| c.id()), env.empty_cubemap.id());
            match &obj.bounds {
                Some(bounds) => {
                    self.ref_map_bounds.set(bounds);
                    self.ref_map_type.set(2);
                }
                None => {
                    self.ref_map_bounds.set(&BoundingBox::default());
                    self.ref_map_type.set(1);
                }
            }
        } else {
            self.ref_map.apply(None, env.empty_cubemap.id());
            self.ref_map_type.set(0);
        }

        // Scalar material state.
        self.color
            .set(mat.and_then(|m| m.color).unwrap_or(DEFAULT_COLOR));
        self.tex_tiling
            .set(mat.and_then(|m| m.tex_tiling).unwrap_or(DEFAULT_TILING));
        self.roughness
            .set(mat.and_then(|m| m.roughness).unwrap_or(DEFAULT_ROUGHNESS));
        self.glossy.set(mat.and_then(|m| m.glossy).unwrap_or(0.0));
        self.emission
            .set(mat.and_then(|m| m.emission).unwrap_or(0.0));

        let opacity = obj.effective_opacity();
        if opacity < 1.0 {
            env.device.set_render_state(RenderState::Blend, true);
            self.opacity.set(opacity);
        } else {
            self.opacity.set(1.0);
        }
    }

    fn end_object(&mut self, _obj: &SceneObject, env: &RenderEnv) {
        self.diffuse.clear();
        self.normal_map.clear();
        self.lightmap.clear();
        self.ref_map.clear();

        // Idempotent reset regardless of what begin_object toggled.
        env.device.set_render_state(RenderState::Blend, false);
        env.device.set_render_state(RenderState::DepthTest, true);

        self.object_lightmap_bound = false;
        self.scope.leave_object();
    }

    fn begin_mesh(&mut self, mesh: &Mesh, env: &RenderEnv) {
        self.scope.enter_mesh();

        self.has_uv2.set(mesh.meta().uv_count > 1);

        // Mesh-level lightmap fallback when the object carries none.
        if !self.object_lightmap_bound {
            let baked = if env.options.enable_lightmap {
                mesh.lightmap.as_ref().map(|t| t.id())
            } else {
                None
            };
            self.lightmap.apply(baked, env.empty_texture.id());
        }
    }

    fn end_mesh(&mut self, _env: &RenderEnv) {
        self.scope.leave_mesh();
    }
}
