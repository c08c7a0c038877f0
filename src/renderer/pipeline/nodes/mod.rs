//! Concrete pipeline node variants.

pub mod blur;
pub mod default;
pub mod image_filter;
pub mod image_source;
pub mod image_to_screen;
pub mod preview;
pub mod scene_to_image;
pub mod shadow_map;

pub use blur::BlurRenderer;
pub use default::DefaultRenderer;
pub use image_filter::ImageFilterRenderer;
pub use image_source::ImageSource;
pub use image_to_screen::ImageToScreenRenderer;
pub use preview::MultipleImagePreviewRenderer;
pub use scene_to_image::SceneToImageRenderer;
pub use shadow_map::ShadowMapRenderer;
