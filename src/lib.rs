#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod errors;
pub mod gpu;
pub mod render;
pub mod renderer;
pub mod scene;

pub use errors::{EmberError, Result};
pub use gpu::{GpuDevice, UniformData};
pub use render::{FrameBuffer, Mesh, Texture};
pub use renderer::Renderer;
pub use renderer::pipeline::{NodeRef, PipelineNode};
pub use renderer::settings::RendererOptions;
pub use renderer::shader::ShaderKind;
pub use scene::{Material, ObjectKind, ObjectRef, Scene, SceneObject};
