//! # Graphics Module
//!
//! Everything that talks to the GPU, plus the camera and picking math the
//! gizmo shares with it.
//!
//! - **Cameras** ([`camera`]) - Fixed look-at cameras, one per viewport
//! - **Rendering** ([`rendering`]) - Device/surface ownership, pipelines and
//!   the per-viewport scene pass
//! - **Scene** ([`scene`]) - The textured model and its shared transform
//! - **Resources** ([`resources`]) - Textures and offscreen render targets
//! - **Picking** ([`picking`]) - Ray, plane and axis math
//! - **Gizmos** ([`gizmos`]) - The manipulation widget

pub mod camera;
pub mod gizmos;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use rendering::render_engine::RenderEngine;
