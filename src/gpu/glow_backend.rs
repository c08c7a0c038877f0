//! OpenGL Backend
//!
//! [`GlowDevice`] implements [`GpuDevice`] on top of `glow` (OpenGL 3.3
//! core). All GL objects live in slotmaps keyed by the engine's opaque
//! handles; uniform locations are interned into a dense table so the
//! engine-side [`UniformLocation`] stays a plain `u32` index.
//!
//! # Safety
//!
//! Every `glow` call is unsafe. The unsafety is contained here: the caller
//! must only guarantee that the `glow::Context` passed to [`GlowDevice::new`]
//! is current on the calling thread for the lifetime of the device, which is
//! also why the device is shared via `Rc` and not `Arc`.

use std::cell::RefCell;

use glow::HasContext;
use slotmap::SlotMap;

use super::device::{
    CullFace, FramebufferDesc, FramebufferId, FramebufferTarget, GpuDevice, MeshData, MeshId,
    PrimitiveMode, ProgramId, ProgramSource, RenderState, TextureDesc, TextureId, TextureKind,
    UniformData, UniformLocation,
};
use crate::errors::{EmberError, Result};

type GlProgram = <glow::Context as HasContext>::Program;
type GlTexture = <glow::Context as HasContext>::Texture;
type GlFramebuffer = <glow::Context as HasContext>::Framebuffer;
type GlRenderbuffer = <glow::Context as HasContext>::Renderbuffer;
type GlBuffer = <glow::Context as HasContext>::Buffer;
type GlVertexArray = <glow::Context as HasContext>::VertexArray;
type GlUniformLocation = <glow::Context as HasContext>::UniformLocation;

struct ProgramEntry {
    raw: GlProgram,
}

struct TextureEntry {
    raw: GlTexture,
    kind: TextureKind,
}

struct FramebufferEntry {
    raw: GlFramebuffer,
    depth: Option<GlRenderbuffer>,
    color: TextureId,
}

struct MeshEntry {
    vao: GlVertexArray,
    buffers: Vec<GlBuffer>,
}

/// Production [`GpuDevice`] over OpenGL 3.3.
pub struct GlowDevice {
    gl: glow::Context,
    programs: RefCell<SlotMap<ProgramId, ProgramEntry>>,
    textures: RefCell<SlotMap<TextureId, TextureEntry>>,
    framebuffers: RefCell<SlotMap<FramebufferId, FramebufferEntry>>,
    meshes: RefCell<SlotMap<MeshId, MeshEntry>>,
    locations: RefCell<Vec<GlUniformLocation>>,
}

impl GlowDevice {
    /// Wraps a current GL context and applies the engine's baseline raster
    /// state (depth test LEQUAL, back-face culling, premultiplied-friendly
    /// blend function).
    #[must_use]
    pub fn new(gl: glow::Context) -> Self {
        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LEQUAL);
            gl.enable(glow::CULL_FACE);
            gl.cull_face(glow::BACK);
            gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }

        Self {
            gl,
            programs: RefCell::new(SlotMap::with_key()),
            textures: RefCell::new(SlotMap::with_key()),
            framebuffers: RefCell::new(SlotMap::with_key()),
            meshes: RefCell::new(SlotMap::with_key()),
            locations: RefCell::new(Vec::new()),
        }
    }

    fn compile_stage(&self, stage: u32, src: &str, name: &str) -> Result<<glow::Context as HasContext>::Shader> {
        let gl = &self.gl;
        unsafe {
            let shader = gl
                .create_shader(stage)
                .map_err(EmberError::GpuResource)?;
            gl.shader_source(shader, src);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(EmberError::ShaderCompile {
                    name: name.to_owned(),
                    log,
                });
            }
            Ok(shader)
        }
    }

    fn create_texture_storage(&self, desc: &TextureDesc<'_>) -> Result<GlTexture> {
        let gl = &self.gl;
        let w = desc.width.max(1) as i32;
        let h = desc.height.max(1) as i32;

        unsafe {
            let tex = gl.create_texture().map_err(EmberError::GpuResource)?;
            match desc.kind {
                TextureKind::Texture2D => {
                    gl.bind_texture(glow::TEXTURE_2D, Some(tex));
                    set_default_params(gl, glow::TEXTURE_2D);
                    gl.tex_image_2d(
                        glow::TEXTURE_2D,
                        0,
                        glow::RGBA8 as i32,
                        w,
                        h,
                        0,
                        glow::RGBA,
                        glow::UNSIGNED_BYTE,
                        glow::PixelUnpackData::Slice(desc.pixels),
                    );
                    gl.bind_texture(glow::TEXTURE_2D, None);
                }
                TextureKind::CubeMap => {
                    gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(tex));
                    set_default_params(gl, glow::TEXTURE_CUBE_MAP);
                    for face in 0..6 {
                        gl.tex_image_2d(
                            glow::TEXTURE_CUBE_MAP_POSITIVE_X + face,
                            0,
                            glow::RGBA8 as i32,
                            w,
                            h,
                            0,
                            glow::RGBA,
                            glow::UNSIGNED_BYTE,
                            glow::PixelUnpackData::Slice(desc.pixels),
                        );
                    }
                    gl.bind_texture(glow::TEXTURE_CUBE_MAP, None);
                }
            }
            Ok(tex)
        }
    }

    fn upload_stream(&self, index: u32, components: i32, data: &[f32], buffers: &mut Vec<GlBuffer>) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let gl = &self.gl;
        unsafe {
            let vbo = gl.create_buffer().map_err(EmberError::GpuResource)?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            let bytes = core::slice::from_raw_parts(
                data.as_ptr().cast::<u8>(),
                std::mem::size_of_val(data),
            );
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bytes, glow::STATIC_DRAW);
            gl.enable_vertex_attrib_array(index);
            gl.vertex_attrib_pointer_f32(index, components, glow::FLOAT, false, 0, 0);
            buffers.push(vbo);
        }
        Ok(())
    }
}

fn set_default_params(gl: &glow::Context, target: u32) {
    unsafe {
        gl.tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
    }
}

const fn primitive(mode: PrimitiveMode) -> u32 {
    match mode {
        PrimitiveMode::Triangles => glow::TRIANGLES,
        PrimitiveMode::TriangleStrip => glow::TRIANGLE_STRIP,
        PrimitiveMode::Lines => glow::LINES,
    }
}

impl GpuDevice for GlowDevice {
    fn create_program(&self, source: &ProgramSource<'_>) -> Result<ProgramId> {
        let gl = &self.gl;
        let vs = self.compile_stage(glow::VERTEX_SHADER, source.vertex, source.name)?;
        let fs = match self.compile_stage(glow::FRAGMENT_SHADER, source.fragment, source.name) {
            Ok(fs) => fs,
            Err(e) => {
                unsafe { gl.delete_shader(vs) };
                return Err(e);
            }
        };

        unsafe {
            let program = gl.create_program().map_err(EmberError::GpuResource)?;
            gl.attach_shader(program, vs);
            gl.attach_shader(program, fs);
            gl.link_program(program);
            gl.delete_shader(vs);
            gl.delete_shader(fs);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(EmberError::ShaderLink {
                    name: source.name.to_owned(),
                    log,
                });
            }

            Ok(self.programs.borrow_mut().insert(ProgramEntry { raw: program }))
        }
    }

    fn delete_program(&self, program: ProgramId) {
        if let Some(entry) = self.programs.borrow_mut().remove(program) {
            unsafe { self.gl.delete_program(entry.raw) };
        }
    }

    fn use_program(&self, program: Option<ProgramId>) {
        let programs = self.programs.borrow();
        let raw = program.and_then(|p| programs.get(p)).map(|e| e.raw);
        unsafe { self.gl.use_program(raw) };
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let programs = self.programs.borrow();
        let entry = programs.get(program)?;
        let raw = unsafe { self.gl.get_uniform_location(entry.raw, name) }?;
        let mut locations = self.locations.borrow_mut();
        locations.push(raw);
        Some(UniformLocation((locations.len() - 1) as u32))
    }

    fn set_uniform(&self, location: UniformLocation, value: UniformData) {
        let locations = self.locations.borrow();
        let Some(loc) = locations.get(location.0 as usize) else {
            return;
        };
        let gl = &self.gl;
        unsafe {
            match value {
                UniformData::Bool(v) => gl.uniform_1_i32(Some(loc), i32::from(v)),
                UniformData::Int(v) => gl.uniform_1_i32(Some(loc), v),
                UniformData::Float(v) => gl.uniform_1_f32(Some(loc), v),
                UniformData::Vec2(v) => gl.uniform_2_f32_slice(Some(loc), &v),
                UniformData::Vec3(v) => gl.uniform_3_f32_slice(Some(loc), &v),
                UniformData::Vec4(v) => gl.uniform_4_f32_slice(Some(loc), &v),
                UniformData::Mat3(v) => gl.uniform_matrix_3_f32_slice(Some(loc), false, &v),
                UniformData::Mat4(v) => gl.uniform_matrix_4_f32_slice(Some(loc), false, &v),
            }
        }
    }

    fn create_texture(&self, desc: &TextureDesc<'_>) -> Result<TextureId> {
        let raw = self.create_texture_storage(desc)?;
        Ok(self
            .textures
            .borrow_mut()
            .insert(TextureEntry { raw, kind: desc.kind }))
    }

    fn delete_texture(&self, texture: TextureId) {
        if let Some(entry) = self.textures.borrow_mut().remove(texture) {
            unsafe { self.gl.delete_texture(entry.raw) };
        }
    }

    fn bind_texture(&self, unit: u32, kind: TextureKind, texture: Option<TextureId>) {
        let target = match kind {
            TextureKind::Texture2D => glow::TEXTURE_2D,
            TextureKind::CubeMap => glow::TEXTURE_CUBE_MAP,
        };
        let textures = self.textures.borrow();
        let raw = texture.and_then(|t| textures.get(t)).map(|e| e.raw);
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(target, raw);
        }
    }

    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<FramebufferTarget> {
        let gl = &self.gl;
        let color = self.create_texture(&TextureDesc {
            kind: TextureKind::Texture2D,
            width: desc.width,
            height: desc.height,
            pixels: None,
        })?;
        let color_raw = self.textures.borrow()[color].raw;

        unsafe {
            let fbo = gl.create_framebuffer().map_err(EmberError::GpuResource)?;
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(color_raw),
                0,
            );

            let depth = if desc.depth {
                let rb = gl.create_renderbuffer().map_err(EmberError::GpuResource)?;
                gl.bind_renderbuffer(glow::RENDERBUFFER, Some(rb));
                gl.renderbuffer_storage(
                    glow::RENDERBUFFER,
                    glow::DEPTH_COMPONENT24,
                    desc.width.max(1) as i32,
                    desc.height.max(1) as i32,
                );
                gl.framebuffer_renderbuffer(
                    glow::FRAMEBUFFER,
                    glow::DEPTH_ATTACHMENT,
                    glow::RENDERBUFFER,
                    Some(rb),
                );
                gl.bind_renderbuffer(glow::RENDERBUFFER, None);
                Some(rb)
            } else {
                None
            };

            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            if status != glow::FRAMEBUFFER_COMPLETE {
                gl.delete_framebuffer(fbo);
                if let Some(rb) = depth {
                    gl.delete_renderbuffer(rb);
                }
                self.delete_texture(color);
                return Err(EmberError::Framebuffer {
                    width: desc.width,
                    height: desc.height,
                    detail: format!("status 0x{status:x}"),
                });
            }

            let framebuffer = self.framebuffers.borrow_mut().insert(FramebufferEntry {
                raw: fbo,
                depth,
                color,
            });
            Ok(FramebufferTarget { framebuffer, texture: color })
        }
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        let entry = self.framebuffers.borrow_mut().remove(framebuffer);
        if let Some(entry) = entry {
            unsafe {
                self.gl.delete_framebuffer(entry.raw);
                if let Some(rb) = entry.depth {
                    self.gl.delete_renderbuffer(rb);
                }
            }
            self.delete_texture(entry.color);
        }
    }

    fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>) {
        let framebuffers = self.framebuffers.borrow();
        let raw = framebuffer.and_then(|f| framebuffers.get(f)).map(|e| e.raw);
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, raw) };
    }

    fn create_mesh(&self, data: &MeshData) -> Result<MeshId> {
        let gl = &self.gl;
        unsafe {
            let vao = gl.create_vertex_array().map_err(EmberError::GpuResource)?;
            gl.bind_vertex_array(Some(vao));

            let mut buffers = Vec::new();
            self.upload_stream(0, 3, &data.vertices, &mut buffers)?;
            self.upload_stream(1, 3, &data.normals, &mut buffers)?;
            self.upload_stream(2, 2, &data.texcoords, &mut buffers)?;

            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_vertex_array(None);

            Ok(self.meshes.borrow_mut().insert(MeshEntry { vao, buffers }))
        }
    }

    fn delete_mesh(&self, mesh: MeshId) {
        if let Some(entry) = self.meshes.borrow_mut().remove(mesh) {
            unsafe {
                self.gl.delete_vertex_array(entry.vao);
                for vbo in entry.buffers {
                    self.gl.delete_buffer(vbo);
                }
            }
        }
    }

    fn draw_mesh(&self, mesh: MeshId, mode: PrimitiveMode, vertex_count: u32) {
        if vertex_count == 0 {
            return;
        }
        let meshes = self.meshes.borrow();
        let Some(entry) = meshes.get(mesh) else {
            return;
        };
        unsafe {
            self.gl.bind_vertex_array(Some(entry.vao));
            self.gl.draw_arrays(primitive(mode), 0, vertex_count as i32);
            self.gl.bind_vertex_array(None);
        }
    }

    fn set_render_state(&self, state: RenderState, enabled: bool) {
        let cap = match state {
            RenderState::Blend => glow::BLEND,
            RenderState::DepthTest => glow::DEPTH_TEST,
        };
        unsafe {
            if enabled {
                self.gl.enable(cap);
            } else {
                self.gl.disable(cap);
            }
        }
    }

    fn set_cull_face(&self, cull: CullFace) {
        unsafe {
            match cull {
                CullFace::Back => {
                    self.gl.enable(glow::CULL_FACE);
                    self.gl.cull_face(glow::BACK);
                }
                CullFace::Front => {
                    self.gl.enable(glow::CULL_FACE);
                    self.gl.cull_face(glow::FRONT);
                }
                CullFace::None => self.gl.disable(glow::CULL_FACE),
            }
        }
    }

    fn set_viewport(&self, width: u32, height: u32) {
        unsafe { self.gl.viewport(0, 0, width as i32, height as i32) };
    }

    fn clear(&self, color: [f32; 4]) {
        unsafe {
            self.gl.clear_color(color[0], color[1], color[2], color[3]);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }
}
