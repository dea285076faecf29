//! GPU resource management
//!
//! Textures and the offscreen render targets viewports draw into.

pub mod render_target;
pub mod texture_resource;

pub use render_target::RenderTarget;
pub use texture_resource::{Attachment, TextureResource};
