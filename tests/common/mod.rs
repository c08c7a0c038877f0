#![allow(dead_code)] // not every test binary uses every helper

//! Recording GPU stub shared by the integration tests.
//!
//! Allocates real slotmap handles without a GPU and records every call the
//! renderer makes, so tests can assert on draw ordering, uniform uploads
//! and binding discipline.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use ember::errors::Result;
use ember::gpu::{
    CullFace, DeviceRc, FramebufferDesc, FramebufferId, FramebufferTarget, GpuDevice, MeshData,
    MeshId, PrimitiveMode, ProgramId, ProgramSource, RenderState, TextureDesc, TextureId,
    TextureKind, UniformData, UniformLocation,
};

/// One recorded device call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    UseProgram(Option<ProgramId>),
    SetUniform(String, UniformData),
    BindTexture(u32, Option<TextureId>),
    BindFramebuffer(Option<FramebufferId>),
    DrawMesh(MeshId),
    SetViewport(u32, u32),
    Clear,
    SetRenderState(RenderState, bool),
    SetCullFace(CullFace),
}

pub struct RecordingDevice {
    expose_uniforms: bool,
    calls: RefCell<Vec<Call>>,
    programs: RefCell<SlotMap<ProgramId, String>>,
    textures: RefCell<SlotMap<TextureId, ()>>,
    framebuffers: RefCell<SlotMap<FramebufferId, TextureId>>,
    meshes: RefCell<SlotMap<MeshId, ()>>,
    locations: RefCell<Vec<String>>,
    resolved: RefCell<FxHashMap<(ProgramId, String), u32>>,
}

impl RecordingDevice {
    pub fn new() -> Rc<Self> {
        Self::build(true)
    }

    /// A device whose linked programs expose no uniforms at all, for
    /// exercising the no-op binding path.
    pub fn with_no_uniforms() -> Rc<Self> {
        Self::build(false)
    }

    fn build(expose_uniforms: bool) -> Rc<Self> {
        Rc::new(Self {
            expose_uniforms,
            calls: RefCell::new(Vec::new()),
            programs: RefCell::new(SlotMap::with_key()),
            textures: RefCell::new(SlotMap::with_key()),
            framebuffers: RefCell::new(SlotMap::with_key()),
            meshes: RefCell::new(SlotMap::with_key()),
            locations: RefCell::new(Vec::new()),
            resolved: RefCell::new(FxHashMap::default()),
        })
    }

    pub fn handle(self: &Rc<Self>) -> DeviceRc {
        self.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn draw_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::DrawMesh(_)))
            .count()
    }

    /// Every value uploaded to the named uniform, in order.
    pub fn uniform_values(&self, name: &str) -> Vec<UniformData> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::SetUniform(n, v) if n == name => Some(*v),
                _ => None,
            })
            .collect()
    }

    pub fn last_uniform(&self, name: &str) -> Option<UniformData> {
        self.uniform_values(name).pop()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl GpuDevice for RecordingDevice {
    fn create_program(&self, source: &ProgramSource<'_>) -> Result<ProgramId> {
        Ok(self.programs.borrow_mut().insert(source.name.to_owned()))
    }

    fn delete_program(&self, program: ProgramId) {
        self.programs.borrow_mut().remove(program);
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.record(Call::UseProgram(program));
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        if !self.expose_uniforms {
            return None;
        }
        let key = (program, name.to_owned());
        let mut resolved = self.resolved.borrow_mut();
        let index = *resolved.entry(key).or_insert_with(|| {
            let mut locations = self.locations.borrow_mut();
            locations.push(name.to_owned());
            (locations.len() - 1) as u32
        });
        Some(UniformLocation(index))
    }

    fn set_uniform(&self, location: UniformLocation, value: UniformData) {
        let name = self.locations.borrow()[location.0 as usize].clone();
        self.record(Call::SetUniform(name, value));
    }

    fn create_texture(&self, _desc: &TextureDesc<'_>) -> Result<TextureId> {
        Ok(self.textures.borrow_mut().insert(()))
    }

    fn delete_texture(&self, texture: TextureId) {
        self.textures.borrow_mut().remove(texture);
    }

    fn bind_texture(&self, unit: u32, _kind: TextureKind, texture: Option<TextureId>) {
        self.record(Call::BindTexture(unit, texture));
    }

    fn create_framebuffer(&self, _desc: &FramebufferDesc) -> Result<FramebufferTarget> {
        let texture = self.textures.borrow_mut().insert(());
        let framebuffer = self.framebuffers.borrow_mut().insert(texture);
        Ok(FramebufferTarget {
            framebuffer,
            texture,
        })
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        if let Some(texture) = self.framebuffers.borrow_mut().remove(framebuffer) {
            self.textures.borrow_mut().remove(texture);
        }
    }

    fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>) {
        self.record(Call::BindFramebuffer(framebuffer));
    }

    fn create_mesh(&self, _data: &MeshData) -> Result<MeshId> {
        Ok(self.meshes.borrow_mut().insert(()))
    }

    fn delete_mesh(&self, mesh: MeshId) {
        self.meshes.borrow_mut().remove(mesh);
    }

    fn draw_mesh(&self, mesh: MeshId, _mode: PrimitiveMode, _vertex_count: u32) {
        self.record(Call::DrawMesh(mesh));
    }

    fn set_render_state(&self, state: RenderState, enabled: bool) {
        self.record(Call::SetRenderState(state, enabled));
    }

    fn set_cull_face(&self, cull: CullFace) {
        self.record(Call::SetCullFace(cull));
    }

    fn set_viewport(&self, width: u32, height: u32) {
        self.record(Call::SetViewport(width, height));
    }

    fn clear(&self, _color: [f32; 4]) {
        self.record(Call::Clear);
    }
}
