//! Pipeline graph evaluation and assembly tests.

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ember::errors::EmberError;
use ember::gpu::UniformData;
use ember::render::{FrameBuffer, Texture};
use ember::renderer::Renderer;
use ember::renderer::core::RenderCore;
use ember::renderer::pipeline::nodes::{
    BlurRenderer, DefaultRenderer, ImageFilterRenderer, ImageSource, ImageToScreenRenderer,
    SceneToImageRenderer, ShadowMapRenderer,
};
use ember::renderer::pipeline::{
    NodeEdges, NodeRef, NodeState, PassContext, PipelineNode, clear, process,
};
use ember::renderer::settings::RendererOptions;
use ember::renderer::shader::FilterMode;
use ember::scene::Scene;

use common::{Call, RecordingDevice};

struct CountingNode {
    state: NodeState,
    label: String,
    renders: Rc<Cell<u32>>,
    inputs: Vec<NodeRef>,
}

impl CountingNode {
    fn new(label: &str, inputs: Vec<NodeRef>) -> (NodeRef, Rc<Cell<u32>>) {
        let renders = Rc::new(Cell::new(0));
        let node: NodeRef = Rc::new(RefCell::new(Self {
            state: NodeState::default(),
            label: label.to_owned(),
            renders: renders.clone(),
            inputs,
        }));
        (node, renders)
    }
}

impl PipelineNode for CountingNode {
    fn name(&self) -> &str {
        &self.label
    }

    fn state(&self) -> &NodeState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut NodeState {
        &mut self.state
    }

    fn inputs(&self) -> NodeEdges {
        self.inputs.iter().cloned().collect()
    }

    fn render(&mut self, _ctx: &mut PassContext<'_>) {
        self.renders.set(self.renders.get() + 1);
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

fn test_core(device: &Rc<RecordingDevice>) -> RenderCore {
    RenderCore::new(&device.handle(), RendererOptions::default(), 640, 480)
        .expect("core construction on the stub device")
}

#[test]
fn diamond_fan_in_renders_each_node_once() {
    let device = RecordingDevice::new();
    let mut core = test_core(&device);
    let scene = Scene::new();

    let (shared, shared_count) = CountingNode::new("shared", Vec::new());
    let (left, left_count) = CountingNode::new("left", vec![shared.clone()]);
    let (right, right_count) = CountingNode::new("right", vec![shared.clone()]);
    let (root, root_count) = CountingNode::new("root", vec![left, right]);

    let mut ctx = PassContext {
        core: &mut core,
        scene: &scene,
    };
    clear(&root);
    process(&root, &mut ctx);

    assert_eq!(shared_count.get(), 1, "fan-in node must render once");
    assert_eq!(left_count.get(), 1);
    assert_eq!(right_count.get(), 1);
    assert_eq!(root_count.get(), 1);
}

#[test]
fn process_without_clear_is_idempotent() {
    let device = RecordingDevice::new();
    let mut core = test_core(&device);
    let scene = Scene::new();

    let (inner, inner_count) = CountingNode::new("inner", Vec::new());
    let (root, root_count) = CountingNode::new("root", vec![inner]);

    let mut ctx = PassContext {
        core: &mut core,
        scene: &scene,
    };
    clear(&root);
    process(&root, &mut ctx);
    process(&root, &mut ctx);

    assert_eq!(inner_count.get(), 1);
    assert_eq!(root_count.get(), 1);

    // The next frame's clear re-arms the whole graph.
    clear(&root);
    process(&root, &mut ctx);
    assert_eq!(inner_count.get(), 2);
    assert_eq!(root_count.get(), 2);
}

#[test]
fn postprocess_pipeline_assembles_compositor_over_scene_and_bloom() {
    let device = RecordingDevice::new();
    let options = RendererOptions {
        enable_postprocess: true,
        enable_shadow: false,
        ..RendererOptions::default()
    };
    let renderer = Renderer::new(&device.handle(), options, 800, 600).expect("renderer");

    let roots = renderer.pipeline();
    assert_eq!(roots.len(), 1);

    let root = roots[0].borrow();
    let compositor = root
        .as_any()
        .downcast_ref::<ImageToScreenRenderer>()
        .expect("root is the final compositor");

    let scene_node = compositor.input().expect("compositor input wired");
    assert!(
        scene_node
            .borrow()
            .as_any()
            .downcast_ref::<SceneToImageRenderer>()
            .is_some()
    );

    let blur_node = compositor.tex2_input().expect("bloom layer wired");
    let blur_ref = blur_node.borrow();
    let blur = blur_ref
        .as_any()
        .downcast_ref::<BlurRenderer>()
        .expect("second layer is the blur");

    let small_node = blur.input().expect("blur input wired");
    let small_ref = small_node.borrow();
    let small = small_ref
        .as_any()
        .downcast_ref::<ImageFilterRenderer>()
        .expect("blur fed by the downsample filter");
    assert_eq!(small.filter(), FilterMode::LinearInterp);
    assert!(Rc::ptr_eq(small.input().expect("downsample input"), scene_node));
}

#[test]
fn bare_pipeline_is_a_single_direct_pass() {
    let device = RecordingDevice::new();
    let options = RendererOptions {
        enable_postprocess: false,
        enable_shadow: false,
        ..RendererOptions::default()
    };
    let renderer = Renderer::new(&device.handle(), options, 800, 600).expect("renderer");

    let roots = renderer.pipeline();
    assert_eq!(roots.len(), 1);
    assert!(
        roots[0]
            .borrow()
            .as_any()
            .downcast_ref::<DefaultRenderer>()
            .is_some()
    );
}

#[test]
fn shadow_option_wires_a_shadow_pass_into_the_scene_node() {
    let device = RecordingDevice::new();
    let options = RendererOptions {
        enable_shadow: true,
        ..RendererOptions::default()
    };
    let resolution = options.shadow_quality.resolution;
    let renderer = Renderer::new(&device.handle(), options, 800, 600).expect("renderer");

    let root = renderer.pipeline()[0].borrow();
    let compositor = root
        .as_any()
        .downcast_ref::<ImageToScreenRenderer>()
        .expect("root is the final compositor");
    let scene_node = compositor.input().expect("scene node wired");
    let scene_ref = scene_node.borrow();
    let scene = scene_ref
        .as_any()
        .downcast_ref::<SceneToImageRenderer>()
        .expect("scene node");

    let shadow_node = scene.shadow_map_input().expect("shadow pass wired");
    let shadow_ref = shadow_node.borrow();
    let shadow = shadow_ref
        .as_any()
        .downcast_ref::<ShadowMapRenderer>()
        .expect("shadow node");
    assert_eq!(shadow.resolution(), resolution);
}

#[test]
fn compositor_uploads_gamma_and_antialias_uniforms() {
    let device = RecordingDevice::new();
    let mut core = test_core(&device);
    let scene = Scene::new();

    let texture =
        Rc::new(Texture::from_pixels(&device.handle(), 2, 2, &[0u8; 16]).expect("texture"));
    let source: NodeRef = Rc::new(RefCell::new(ImageSource::new(texture)));

    let mut compositor = ImageToScreenRenderer::new(&device.handle(), true).expect("compositor");
    compositor.set_input(&source).expect("wiring");
    compositor.gamma = 2.2;
    compositor.antialias = true;
    let compositor: NodeRef = Rc::new(RefCell::new(compositor));

    device.clear_calls();
    let mut ctx = PassContext {
        core: &mut core,
        scene: &scene,
    };
    clear(&compositor);
    process(&compositor, &mut ctx);

    assert_eq!(
        device.last_uniform("gammaFactor"),
        Some(UniformData::Float(2.2))
    );
    assert_eq!(
        device.last_uniform("enableAntialias"),
        Some(UniformData::Bool(true))
    );
}

#[test]
fn wiring_a_textureless_producer_is_a_contract_violation() {
    let device = RecordingDevice::new();
    let textureless: NodeRef = Rc::new(RefCell::new(DefaultRenderer::new()));

    let mut compositor = ImageToScreenRenderer::new(&device.handle(), true).expect("compositor");
    let err = compositor.set_input(&textureless).unwrap_err();
    assert!(matches!(err, EmberError::PipelineContract(_)));

    let mut blur = BlurRenderer::new(&device.handle(), 8, 8).expect("blur");
    let err = blur.set_input(&textureless).unwrap_err();
    assert!(matches!(err, EmberError::PipelineContract(_)));
}

#[test]
fn nested_framebuffer_scopes_restore_the_previous_target() {
    let device = RecordingDevice::new();
    let mut core = test_core(&device);
    let scene = Scene::new();

    let outer = FrameBuffer::new(&device.handle(), 64, 64, true).expect("outer");
    let inner = FrameBuffer::new(&device.handle(), 32, 32, false).expect("inner");

    device.clear_calls();
    let mut ctx = PassContext {
        core: &mut core,
        scene: &scene,
    };
    let (outer_id, inner_id) = (outer.id(), inner.id());
    ctx.with_framebuffer(outer_id, 64, 64, |ctx| {
        ctx.with_framebuffer(inner_id, 32, 32, |_| {});
    });

    let binds: Vec<Call> = device
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::BindFramebuffer(_)))
        .collect();
    assert_eq!(
        binds,
        vec![
            Call::BindFramebuffer(Some(outer_id)),
            Call::BindFramebuffer(Some(inner_id)),
            Call::BindFramebuffer(Some(outer_id)),
            Call::BindFramebuffer(None),
        ]
    );
}

#[test]
fn full_frame_renders_without_fault_on_the_stub_device() {
    let device = RecordingDevice::new();
    let mut renderer = Renderer::new(&device.handle(), RendererOptions::default(), 320, 240)
        .expect("renderer");
    let scene = Scene::new();

    renderer.render(&scene);
    assert!(renderer.frame_stats().render_passes >= 1);
    assert_eq!(renderer.frame_stats().scene_draws, 1);

    // A second frame re-runs every pass instead of reusing memoized state.
    let passes = renderer.frame_stats().render_passes;
    renderer.render(&scene);
    assert_eq!(renderer.frame_stats().render_passes, passes);
}
