//! WGSL sources compiled into the binary

pub const MODEL_SHADER: &str = include_str!("shaders/model.wgsl");
pub const GIZMO_SHADER: &str = include_str!("shaders/gizmo.wgsl");
pub const BLIT_SHADER: &str = include_str!("shaders/blit.wgsl");
