//! Core rendering functionality
//!
//! Device and surface ownership, pipeline creation, and the per-viewport
//! scene pass.

pub mod pipeline_manager;
pub mod render_engine;
pub mod scene_renderer;
pub mod shaders;

pub use pipeline_manager::{DepthConfig, PipelineConfig, PipelineManager, PipelineStats};
pub use render_engine::{Frame, RenderEngine};
pub use scene_renderer::{ScenePassInputs, SceneRenderer, SceneUniform};
